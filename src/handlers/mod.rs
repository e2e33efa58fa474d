pub mod categories;
pub mod common;
pub mod images;
pub mod products;
pub mod reviews;
pub mod subcategories;

use crate::events::EventSender;
use crate::services::{
    CategoryService, ImageService, ProductCatalogService, ReviewService, SubcategoryService,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Service instances shared across handlers via [`crate::AppState`].
#[derive(Clone)]
pub struct AppServices {
    pub categories: CategoryService,
    pub subcategories: SubcategoryService,
    pub products: ProductCatalogService,
    pub images: ImageService,
    pub reviews: ReviewService,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self {
            categories: CategoryService::new(db.clone(), event_sender.clone()),
            subcategories: SubcategoryService::new(db.clone(), event_sender.clone()),
            products: ProductCatalogService::new(db.clone(), event_sender.clone()),
            images: ImageService::new(db.clone(), event_sender.clone()),
            reviews: ReviewService::new(db, event_sender),
        }
    }
}
