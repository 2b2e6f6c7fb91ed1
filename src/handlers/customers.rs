use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::auth::AuthenticatedCustomer;
use crate::errors::{ErrorResponse, ServiceError};
use crate::handlers::common::success_response;
use crate::services::customers::{CustomerResponse, LoginRequest, LoginResponse};
use crate::AppState;

/// Log in with email and password.
///
/// Failure is deliberately indistinguishable between an unknown email
/// and a wrong password.
#[utoipa::path(
    post,
    path = "/customer/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 422, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "customers"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.services.customers.login(request).await?;
    Ok(success_response(response))
}

/// Revoke every token held by the authenticated customer.
#[utoipa::path(
    post,
    path = "/customer/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub async fn logout(
    State(state): State<AppState>,
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.customers.logout(customer.id).await?;
    Ok(success_response(
        serde_json::json!({"message": "Logged out successfully"}),
    ))
}

/// Current customer profile.
#[utoipa::path(
    get,
    path = "/customer/me",
    responses(
        (status = 200, description = "Profile", body = CustomerResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub async fn me(
    AuthenticatedCustomer(customer): AuthenticatedCustomer,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(success_response(CustomerResponse::from(customer)))
}

pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/customer/login", post(login))
        .route("/customer/logout", post(logout))
        .route("/customer/me", get(me))
}
