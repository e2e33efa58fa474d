//! Catalog entities
pub mod category;
pub mod product;
pub mod product_image;
pub mod product_review;
pub mod subcategory;

// Re-export entities
pub use category::{Entity as Category, Model as CategoryModel};
pub use product::{Entity as Product, Finish, Material, Model as ProductModel};
pub use product_image::{Entity as ProductImage, Model as ProductImageModel};
pub use product_review::{Entity as ProductReview, Model as ProductReviewModel};
pub use subcategory::{Entity as Subcategory, Model as SubcategoryModel};
