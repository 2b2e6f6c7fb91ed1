use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::{ErrorResponse, FieldErrors};
use crate::handlers;
use crate::handlers::health::{ComponentStatus, HealthResponse};
use crate::services::checkout::{CartItemInput, CheckoutRequest, CheckoutResponse};
use crate::services::customers::{CustomerResponse, LoginRequest, LoginResponse};
use crate::services::orders::{
    OrderItemResponse, OrderResponse, ProductImageResponse, ProductResponse,
};
use crate::services::payments::CardPaymentInput;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::customers::login,
        handlers::customers::logout,
        handlers::customers::me,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::list_by_category,
        handlers::products::list_categories,
        handlers::health::health_check,
    ),
    components(schemas(
        CheckoutRequest,
        CartItemInput,
        CardPaymentInput,
        CheckoutResponse,
        OrderResponse,
        OrderItemResponse,
        ProductResponse,
        ProductImageResponse,
        CustomerResponse,
        LoginRequest,
        LoginResponse,
        ErrorResponse,
        FieldErrors,
        HealthResponse,
        ComponentStatus,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "orders", description = "Checkout and order history"),
        (name = "customers", description = "Customer accounts and sessions"),
        (name = "catalog", description = "Read-only product catalog"),
        (name = "health", description = "Service health"),
    ),
    info(
        title = "Storefront API",
        description = "Order placement backend: catalog reads, payment-validated checkout, customer accounts, and order history."
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .build(),
                ),
            );
        }
    }
}

/// Swagger UI mounted at /docs, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}
