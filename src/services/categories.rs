use crate::{
    entities::{category, subcategory, Category, CategoryModel, Subcategory, SubcategoryModel},
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

/// Read and admin operations on top-level categories.
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Lists active categories ordered by name.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<CategoryModel>, ServiceError> {
        let categories = Category::find()
            .filter(category::Column::IsActive.eq(true))
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(categories)
    }

    /// Fetches an active category by slug.
    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryModel, ServiceError> {
        Category::find()
            .filter(category::Column::Slug.eq(slug))
            .filter(category::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", slug)))
    }

    /// Lists the active subcategories of an active category, ordered by name.
    #[instrument(skip(self))]
    pub async fn list_subcategories(
        &self,
        category_slug: &str,
    ) -> Result<Vec<SubcategoryModel>, ServiceError> {
        let parent = self.get_by_slug(category_slug).await?;

        let subcategories = Subcategory::find()
            .filter(subcategory::Column::CategoryId.eq(parent.id))
            .filter(subcategory::Column::IsActive.eq(true))
            .order_by_asc(subcategory::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(subcategories)
    }

    /// Creates a category. The slug is derived from the name; name and slug
    /// collisions are rejected before the insert so the caller gets a 400
    /// rather than a constraint violation.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateCategoryInput) -> Result<CategoryModel, ServiceError> {
        input.validate()?;

        let slug = slugify(&input.name);
        if slug.is_empty() {
            return Err(ServiceError::ValidationError(
                "Category name must contain at least one alphanumeric character".to_string(),
            ));
        }

        let existing = Category::find()
            .filter(
                category::Column::Name
                    .eq(input.name.as_str())
                    .or(category::Column::Slug.eq(slug.as_str())),
            )
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "Category {} already exists",
                input.name
            )));
        }

        let now = Utc::now();
        let category = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            slug: Set(slug),
            description: Set(input.description),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let category = category.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryCreated(category.id))
            .await;

        info!(category_id = %category.id, slug = %category.slug, "Created category");
        Ok(category)
    }
}
