pub mod categories;
pub mod images;
pub mod products;
pub mod reviews;
pub mod subcategories;

pub use categories::CategoryService;
pub use images::ImageService;
pub use products::ProductCatalogService;
pub use reviews::ReviewService;
pub use subcategories::SubcategoryService;
