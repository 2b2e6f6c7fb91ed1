use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::errors::{ErrorResponse, ServiceError};
use crate::handlers::common::success_response;
use crate::services::orders::ProductResponse;
use crate::AppState;

/// All products with their images.
#[utoipa::path(
    get,
    path = "/products",
    responses((status = 200, description = "Product catalog", body = [ProductResponse])),
    tag = "catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.catalog.list_products().await?;
    Ok(success_response(products))
}

/// One product by id.
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse)
    ),
    tag = "catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.catalog.get_product(id).await?;
    Ok(success_response(product))
}

/// Products filtered by category name.
#[utoipa::path(
    get,
    path = "/products/category/{category}",
    params(("category" = String, Path, description = "Category name")),
    responses((status = 200, description = "Products in the category", body = [ProductResponse])),
    tag = "catalog"
)]
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.catalog.list_by_category(&category).await?;
    Ok(success_response(products))
}

/// Distinct category names.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Category names", body = [String])),
    tag = "catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = state.services.catalog.list_categories().await?;
    Ok(success_response(categories))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/category/{category}", get(list_by_category))
        .route("/products/{id}", get(get_product))
        .route("/categories", get(list_categories))
}
