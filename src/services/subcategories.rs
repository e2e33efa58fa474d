use crate::{
    entities::{category, subcategory, Category, Subcategory, SubcategoryModel},
    errors::ServiceError,
    events::{Event, EventSender},
    slug::slugify,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct SubcategoryService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateSubcategoryInput {
    pub category_slug: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl SubcategoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Lists active subcategories ordered by name, optionally restricted to
    /// one active parent category.
    #[instrument(skip(self))]
    pub async fn list_active(
        &self,
        category_slug: Option<&str>,
    ) -> Result<Vec<SubcategoryModel>, ServiceError> {
        let mut query = Subcategory::find()
            .filter(subcategory::Column::IsActive.eq(true))
            .order_by_asc(subcategory::Column::Name);

        if let Some(category_slug) = category_slug {
            let parent = Category::find()
                .filter(category::Column::Slug.eq(category_slug))
                .filter(category::Column::IsActive.eq(true))
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Category {} not found", category_slug))
                })?;
            query = query.filter(subcategory::Column::CategoryId.eq(parent.id));
        }

        Ok(query.all(&*self.db).await?)
    }

    /// Fetches an active subcategory by slug, scoped to an active parent
    /// category. Slugs are only unique per category, so the parent always
    /// participates in the lookup.
    #[instrument(skip(self))]
    pub async fn get_by_slug(
        &self,
        category_slug: &str,
        subcategory_slug: &str,
    ) -> Result<SubcategoryModel, ServiceError> {
        let parent = Category::find()
            .filter(category::Column::Slug.eq(category_slug))
            .filter(category::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category {} not found", category_slug))
            })?;

        Subcategory::find()
            .filter(subcategory::Column::CategoryId.eq(parent.id))
            .filter(subcategory::Column::Slug.eq(subcategory_slug))
            .filter(subcategory::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Subcategory {} not found in category {}",
                    subcategory_slug, category_slug
                ))
            })
    }

    /// Creates a subcategory under an existing category. Name uniqueness is
    /// enforced within the parent; the same name may appear under different
    /// categories.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: CreateSubcategoryInput,
    ) -> Result<SubcategoryModel, ServiceError> {
        input.validate()?;

        let parent = Category::find()
            .filter(category::Column::Slug.eq(input.category_slug.as_str()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category {} not found", input.category_slug))
            })?;

        let slug = slugify(&input.name);
        if slug.is_empty() {
            return Err(ServiceError::ValidationError(
                "Subcategory name must contain at least one alphanumeric character".to_string(),
            ));
        }

        let existing = Subcategory::find()
            .filter(subcategory::Column::CategoryId.eq(parent.id))
            .filter(
                subcategory::Column::Name
                    .eq(input.name.as_str())
                    .or(subcategory::Column::Slug.eq(slug.as_str())),
            )
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "Subcategory {} already exists in category {}",
                input.name, input.category_slug
            )));
        }

        let now = Utc::now();
        let subcategory = subcategory::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(parent.id),
            name: Set(input.name),
            slug: Set(slug),
            description: Set(input.description),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let subcategory = subcategory.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::SubcategoryCreated(subcategory.id))
            .await;

        info!(subcategory_id = %subcategory.id, slug = %subcategory.slug, "Created subcategory");
        Ok(subcategory)
    }
}
