use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ashwini Catalog API",
        version = "1.0.0",
        description = r#"
Read-mostly product catalog API: hierarchical categories, furniture
products with pricing and inventory, product images and moderated
customer reviews.

Listings paginate with `page` and `per_page` (max 100). Product
listings accept filter, search and ordering query parameters; see the
individual endpoints.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Categories", description = "Category browsing and administration"),
        (name = "Subcategories", description = "Subcategory browsing and administration"),
        (name = "Products", description = "Product listings, search and detail"),
        (name = "Images", description = "Product image management"),
        (name = "Reviews", description = "Customer reviews and moderation"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        crate::health_check,
        crate::handlers::categories::list_categories,
        crate::handlers::categories::get_category,
        crate::handlers::categories::list_subcategories,
        crate::handlers::categories::list_category_products,
        crate::handlers::categories::create_category,
        crate::handlers::subcategories::list_all_subcategories,
        crate::handlers::subcategories::get_subcategory,
        crate::handlers::subcategories::list_subcategory_products,
        crate::handlers::subcategories::create_subcategory,
        crate::handlers::products::list_products,
        crate::handlers::products::list_featured,
        crate::handlers::products::list_bestsellers,
        crate::handlers::products::list_on_sale,
        crate::handlers::products::search_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::images::list_images,
        crate::handlers::images::add_image,
        crate::handlers::images::set_primary_image,
        crate::handlers::reviews::list_reviews,
        crate::handlers::reviews::submit_review,
        crate::handlers::reviews::moderate_reviews,
    ),
    components(
        schemas(
            crate::entities::Material,
            crate::entities::Finish,
            crate::errors::ErrorResponse,
            crate::handlers::categories::CategoryResponse,
            crate::handlers::categories::SubcategoryResponse,
            crate::handlers::products::ProductResponse,
            crate::handlers::reviews::SubmittedReviewResponse,
            crate::handlers::reviews::ModerationResponse,
            crate::services::categories::CreateCategoryInput,
            crate::services::subcategories::CreateSubcategoryInput,
            crate::services::products::CreateProductInput,
            crate::services::products::ProductSummary,
            crate::services::products::ProductDetail,
            crate::services::products::CategoryRef,
            crate::services::products::ImageView,
            crate::services::products::ReviewView,
            crate::services::images::AddImageInput,
            crate::services::reviews::SubmitReviewInput,
            crate::services::reviews::ModerateReviewsInput,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
