use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::AuthenticatedCustomer;
use crate::errors::{ErrorResponse, ServiceError};
use crate::handlers::common::success_response;
use crate::services::checkout::{CheckoutRequest, CheckoutResponse};
use crate::services::orders::OrderResponse;
use crate::AppState;

/// Place an order.
///
/// Validates the payload (including payment details for the chosen
/// method), upserts the customer by email, and creates the order with
/// its line items atomically. Returns the persisted order graph, the
/// customer, and a fresh bearer token.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order created", body = CheckoutResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.services.checkout.checkout(request).await?;
    Ok(success_response(response))
}

/// List the authenticated customer's orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Order history", body = [OrderResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.services.orders.list_for_customer(customer.id).await?;
    Ok(success_response(orders))
}

/// Fetch one order; only its owner may read it.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Order belongs to another customer", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .orders
        .get_for_customer(id, customer.id)
        .await?;
    Ok(success_response(order))
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
}
