use crate::{
    entities::{product, product_review, Product, ProductModel, ProductReview, ProductReviewModel},
    errors::ServiceError,
    events::{Event, EventSender},
    services::products::{Page, ReviewView, MAX_PER_PAGE},
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Customer review intake and moderation. Submissions always land
/// unapproved and stay invisible until moderated.
#[derive(Clone)]
pub struct ReviewService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct SubmitReviewInput {
    #[validate(length(min = 1, max = 100))]
    pub customer_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub comment: String,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct ModerateReviewsInput {
    #[validate(length(min = 1))]
    pub review_ids: Vec<Uuid>,
    pub approved: bool,
}

impl ReviewService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Lists a product's approved reviews, newest first.
    #[instrument(skip(self))]
    pub async fn list_approved(
        &self,
        product_slug: &str,
        page: u64,
        per_page: u64,
    ) -> Result<Page<ReviewView>, ServiceError> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let product = self.get_product(product_slug).await?;

        let paginator = ProductReview::find()
            .filter(product_review::Column::ProductId.eq(product.id))
            .filter(product_review::Column::IsApproved.eq(true))
            .order_by_desc(product_review::Column::CreatedAt)
            .paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let total_pages = paginator.num_pages().await?;
        let reviews = paginator.fetch_page(page - 1).await?;

        Ok(Page {
            items: reviews
                .into_iter()
                .map(|r| ReviewView {
                    id: r.id,
                    customer_name: r.customer_name,
                    rating: r.rating,
                    title: r.title,
                    comment: r.comment,
                    created_at: r.created_at,
                })
                .collect(),
            total,
            page,
            per_page,
            total_pages,
        })
    }

    /// Records a customer review. The approval flag is forced off no matter
    /// what the caller sent; only moderation can flip it.
    #[instrument(skip(self, input))]
    pub async fn submit(
        &self,
        product_slug: &str,
        input: SubmitReviewInput,
    ) -> Result<ProductReviewModel, ServiceError> {
        input.validate()?;
        let product = self.get_product(product_slug).await?;

        let review = product_review::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            customer_name: Set(input.customer_name),
            email: Set(input.email),
            rating: Set(input.rating),
            title: Set(input.title),
            comment: Set(input.comment),
            is_approved: Set(false),
            created_at: Set(Utc::now()),
        };
        let review = review.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ReviewSubmitted {
                product_id: product.id,
                review_id: review.id,
                rating: review.rating,
            })
            .await;

        info!(product_id = %product.id, review_id = %review.id, "Review submitted for moderation");
        Ok(review)
    }

    /// Bulk-approves or bulk-disapproves reviews, returning how many rows
    /// changed. Unknown ids are skipped silently.
    #[instrument(skip(self, input))]
    pub async fn set_approval(&self, input: ModerateReviewsInput) -> Result<u64, ServiceError> {
        input.validate()?;

        let result = ProductReview::update_many()
            .col_expr(product_review::Column::IsApproved, Expr::value(input.approved))
            .filter(product_review::Column::Id.is_in(input.review_ids))
            .exec(&*self.db)
            .await?;

        self.event_sender
            .send_or_log(Event::ReviewsModerated {
                approved: input.approved,
                count: result.rows_affected,
            })
            .await;

        info!(
            approved = input.approved,
            count = result.rows_affected,
            "Moderated reviews"
        );
        Ok(result.rows_affected)
    }

    async fn get_product(&self, slug: &str) -> Result<ProductModel, ServiceError> {
        Product::find()
            .filter(product::Column::Slug.eq(slug))
            .filter(product::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", slug)))
    }
}
