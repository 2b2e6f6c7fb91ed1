use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthService;
use crate::entities::customer::{self, CustomerType};
use crate::entities::order::{self, DeliveryMethod, OrderStatus, PaymentMethod};
use crate::entities::{order_item, Customer, Product};
use crate::errors::{FieldErrors, ServiceError};
use crate::events::{Event, EventSender};
use crate::services::customers::{normalize_email, CustomerResponse};
use crate::services::orders::{load_order_graph, OrderResponse};
use crate::services::payments::{
    payment_snapshot, validate_payment, CardPaymentInput, PaymentDetails,
};

/// One cart line as submitted by the client. The unit price is *not*
/// accepted here; it is always re-read from the product at order time.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct CartItemInput {
    #[serde(default)]
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub selected_size: Option<String>,
    #[serde(default)]
    pub selected_color: Option<String>,
}

/// Checkout submission. Enum-like fields arrive as strings so that an
/// unknown value surfaces as a field-keyed validation error rather than a
/// body-parse failure.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub customer_type: String,
    #[serde(default)]
    pub email: String,
    /// Required for new customers; verified against the stored hash for
    /// existing ones.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub delivery_method: String,
    #[serde(default)]
    pub delivery_price: Option<Decimal>,
    /// Client-computed total, echoed for display parity only. The
    /// persisted total is always recomputed server-side.
    #[serde(default)]
    pub total_with_delivery: Option<Decimal>,
    #[serde(default)]
    pub cart_items: Vec<CartItemInput>,
    #[serde(default)]
    pub payment: Option<CardPaymentInput>,
}

#[derive(Clone, Debug, serde::Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order: OrderResponse,
    pub customer: CustomerResponse,
    /// Freshly minted bearer token for the (possibly new) customer.
    pub token: String,
    pub message: String,
}

/// Validated view of a checkout request, produced before the transaction
/// begins.
#[derive(Debug)]
struct ValidatedCheckout {
    customer_type: CustomerType,
    delivery_method: DeliveryMethod,
    delivery_price: Decimal,
    payment: PaymentDetails,
}

/// Executes checkout as one atomic unit: customer upsert, authoritative
/// total computation, order + line item creation, and token issuance all
/// commit or roll back together.
#[derive(Clone)]
pub struct CheckoutService {
    db: DatabaseConnection,
    auth: AuthService,
    events: EventSender,
}

impl CheckoutService {
    pub fn new(db: DatabaseConnection, auth: AuthService, events: EventSender) -> Self {
        Self { db, auth, events }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutResponse, ServiceError> {
        let validated = validate_request(&request)?;

        let txn = self.db.begin().await?;

        let (customer, customer_was_created) =
            self.upsert_customer(&txn, &request, validated.customer_type).await?;

        let subtotal = compute_subtotal(&txn, &request.cart_items).await?;
        let total_amount = subtotal + validated.delivery_price;

        let address = address_snapshot(&request);
        let now = Utc::now();
        let order = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_number: Set(generate_order_number()),
            customer_id: Set(customer.id),
            status: Set(OrderStatus::Pending),
            payment_method: Set(validated.payment.method()),
            delivery_method: Set(validated.delivery_method),
            delivery_price: Set(validated.delivery_price),
            total_amount: Set(total_amount),
            billing_address: Set(address.clone()),
            shipping_address: Set(address),
            payment_details: Set(payment_snapshot(&validated.payment)),
            order_date: Set(now),
            ..Default::default()
        };
        let order = order.insert(&txn).await?;

        for item in &request.cart_items {
            // product_id presence was checked before the transaction
            let product_id = item.product_id.ok_or_else(|| {
                ServiceError::InternalError("cart item lost its product id".to_string())
            })?;
            let product = Product::find_by_id(product_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::InternalError("cart product vanished mid-transaction".to_string())
                })?;

            let line = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_id: Set(product.id),
                quantity: Set(item.quantity),
                unit_price: Set(product.price),
                selected_size: Set(item.selected_size.clone()),
                selected_color: Set(item.selected_color.clone()),
                created_at: Set(now),
            };
            line.insert(&txn).await?;
        }

        let token = self.auth.issue_token(&txn, customer.id).await?;

        txn.commit().await?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total_amount,
            "order created"
        );
        if customer_was_created {
            self.events.send(Event::CustomerCreated(customer.id)).await;
        } else {
            self.events.send(Event::CustomerUpdated(customer.id)).await;
        }
        self.events.send(Event::OrderCreated(order.id)).await;

        let order = load_order_graph(&self.db, order).await?;
        Ok(CheckoutResponse {
            order,
            customer: customer.into(),
            token,
            message: "Order created successfully".to_string(),
        })
    }

    /// Resolves the customer by email inside the transaction. New
    /// addresses require a password and create a row; known addresses
    /// must present the matching password and get their profile fields
    /// overwritten with the submitted values. The unique index on email
    /// is the backstop against two concurrent first checkouts.
    async fn upsert_customer(
        &self,
        txn: &DatabaseTransaction,
        request: &CheckoutRequest,
        customer_type: CustomerType,
    ) -> Result<(customer::Model, bool), ServiceError> {
        let email = normalize_email(&request.email);
        let existing = Customer::find()
            .filter(customer::Column::Email.eq(email.as_str()))
            .one(txn)
            .await?;

        let password = request.password.as_deref().unwrap_or("").trim();

        match existing {
            Some(model) => {
                if password.is_empty() {
                    return Err(ServiceError::field_error(
                        "password",
                        "The password is required for an existing account",
                    ));
                }
                if !self.auth.verify_password(password, &model.password_hash)? {
                    return Err(ServiceError::field_error(
                        "password",
                        "The provided password is incorrect",
                    ));
                }

                let mut active: customer::ActiveModel = model.into();
                active.first_name = Set(request.first_name.trim().to_string());
                active.last_name = Set(request.last_name.trim().to_string());
                active.phone = Set(request.phone.trim().to_string());
                active.company_name = Set(trimmed_opt(&request.company_name));
                active.tax_id = Set(trimmed_opt(&request.tax_id));
                active.address = Set(request.address.trim().to_string());
                active.city = Set(request.city.trim().to_string());
                active.postal_code = Set(request.postal_code.trim().to_string());
                active.country = Set(request.country.trim().to_string());
                active.customer_type = Set(customer_type);
                active.updated_at = Set(Utc::now());
                Ok((active.update(txn).await?, false))
            }
            None => {
                if password.is_empty() {
                    return Err(ServiceError::field_error(
                        "password",
                        "The password is required",
                    ));
                }
                let now = Utc::now();
                let model = customer::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    email: Set(email),
                    password_hash: Set(self.auth.hash_password(password)?),
                    first_name: Set(request.first_name.trim().to_string()),
                    last_name: Set(request.last_name.trim().to_string()),
                    phone: Set(request.phone.trim().to_string()),
                    company_name: Set(trimmed_opt(&request.company_name)),
                    tax_id: Set(trimmed_opt(&request.tax_id)),
                    address: Set(request.address.trim().to_string()),
                    city: Set(request.city.trim().to_string()),
                    postal_code: Set(request.postal_code.trim().to_string()),
                    country: Set(request.country.trim().to_string()),
                    customer_type: Set(customer_type),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                Ok((model.insert(txn).await?, true))
            }
        }
    }
}

/// Re-fetches every cart product and accumulates authoritative line
/// totals. An unresolvable product id fails the whole operation with a
/// field-keyed validation error.
async fn compute_subtotal<C: ConnectionTrait>(
    conn: &C,
    cart_items: &[CartItemInput],
) -> Result<Decimal, ServiceError> {
    let mut subtotal = Decimal::ZERO;
    for (index, item) in cart_items.iter().enumerate() {
        let product_id = item.product_id.ok_or_else(|| {
            ServiceError::InternalError("cart item lost its product id".to_string())
        })?;
        let product = Product::find_by_id(product_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::field_error(
                    format!("cart_items.{index}.product_id"),
                    "The selected product does not exist",
                )
            })?;
        subtotal += product.price * Decimal::from(item.quantity);
    }
    Ok(subtotal)
}

/// Collects every precondition violation before touching the database.
fn validate_request(request: &CheckoutRequest) -> Result<ValidatedCheckout, ServiceError> {
    let mut errors = FieldErrors::new();

    let customer_type = if request.customer_type.trim().is_empty() {
        errors.add("customer_type", "The customer type is required");
        None
    } else {
        let parsed = CustomerType::parse(request.customer_type.trim());
        if parsed.is_none() {
            errors.add("customer_type", "The customer type must be individual or company");
        }
        parsed
    };

    if request.email.trim().is_empty() {
        errors.add("email", "The email is required");
    } else if !validator::validate_email(request.email.trim()) {
        errors.add("email", "The email must be a valid email address");
    }

    require(&mut errors, "first_name", &request.first_name, "The first name is required");
    require(&mut errors, "last_name", &request.last_name, "The last name is required");
    require(&mut errors, "phone", &request.phone, "The phone number is required");
    require(&mut errors, "address", &request.address, "The address is required");
    require(&mut errors, "city", &request.city, "The city is required");
    require(&mut errors, "postal_code", &request.postal_code, "The postal code is required");
    require(&mut errors, "country", &request.country, "The country is required");

    if customer_type == Some(CustomerType::Company) && trimmed_opt(&request.company_name).is_none()
    {
        errors.add("company_name", "The company name is required for company accounts");
    }

    let payment_method = if request.payment_method.trim().is_empty() {
        errors.add("payment_method", "The payment method is required");
        None
    } else {
        let parsed = PaymentMethod::parse(request.payment_method.trim());
        if parsed.is_none() {
            errors.add("payment_method", "The payment method must be card, transfer or cash");
        }
        parsed
    };

    let delivery_method = if request.delivery_method.trim().is_empty() {
        errors.add("delivery_method", "The delivery method is required");
        None
    } else {
        let parsed = DeliveryMethod::parse(request.delivery_method.trim());
        if parsed.is_none() {
            errors.add(
                "delivery_method",
                "The delivery method must be courier, pickup_point or store_pickup",
            );
        }
        parsed
    };

    let delivery_price = match request.delivery_price {
        None => {
            errors.add("delivery_price", "The delivery price is required");
            None
        }
        Some(price) if price.is_sign_negative() => {
            errors.add("delivery_price", "The delivery price must not be negative");
            None
        }
        Some(price) => Some(price),
    };

    if request.cart_items.is_empty() {
        errors.add("cart_items", "The cart must contain at least one item");
    }
    for (index, item) in request.cart_items.iter().enumerate() {
        if item.product_id.is_none() {
            errors.add(
                format!("cart_items.{index}.product_id"),
                "The product is required",
            );
        }
        if item.quantity < 1 {
            errors.add(
                format!("cart_items.{index}.quantity"),
                "The quantity must be at least 1",
            );
        }
    }

    let payment = payment_method
        .map(|method| PaymentDetails::from_request(method, request.payment.clone()));
    if let Some(details) = &payment {
        errors.merge(validate_payment(details));
    }

    errors.into_result().map_err(ServiceError::Validation)?;

    // all four are Some once errors is empty
    match (customer_type, delivery_method, delivery_price, payment) {
        (Some(customer_type), Some(delivery_method), Some(delivery_price), Some(payment)) => {
            Ok(ValidatedCheckout {
                customer_type,
                delivery_method,
                delivery_price,
                payment,
            })
        }
        _ => Err(ServiceError::InternalError(
            "checkout validation reached an inconsistent state".to_string(),
        )),
    }
}

fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

fn trimmed_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Point-in-time copy of the submitted profile, stored on the order for
/// both billing and shipping.
fn address_snapshot(request: &CheckoutRequest) -> serde_json::Value {
    json!({
        "first_name": request.first_name.trim(),
        "last_name": request.last_name.trim(),
        "phone": request.phone.trim(),
        "company_name": trimmed_opt(&request.company_name),
        "tax_id": trimmed_opt(&request.tax_id),
        "address": request.address.trim(),
        "city": request.city.trim(),
        "postal_code": request.postal_code.trim(),
        "country": request.country.trim(),
    })
}

/// Fixed prefix plus an opaque unique token; reveals nothing about order
/// volume or sequence.
fn generate_order_number() -> String {
    format!("ORD-{}", Uuid::new_v4().simple().to_string().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_request() -> CheckoutRequest {
        CheckoutRequest {
            customer_type: "individual".to_string(),
            email: "jane@example.com".to_string(),
            password: Some("hunter2!".to_string()),
            first_name: "Jane".to_string(),
            last_name: "Shopper".to_string(),
            phone: "+48 123 456 789".to_string(),
            company_name: None,
            tax_id: None,
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            postal_code: "00-001".to_string(),
            country: "PL".to_string(),
            payment_method: "cash".to_string(),
            delivery_method: "courier".to_string(),
            delivery_price: Some(dec!(15.99)),
            total_with_delivery: None,
            cart_items: vec![CartItemInput {
                product_id: Some(Uuid::new_v4()),
                quantity: 2,
                selected_size: None,
                selected_color: None,
            }],
            payment: None,
        }
    }

    fn field_errors(err: ServiceError) -> FieldErrors {
        match err {
            ServiceError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn well_formed_cash_checkout_passes_preconditions() {
        let validated = validate_request(&base_request()).unwrap();
        assert_eq!(validated.delivery_price, dec!(15.99));
        assert!(matches!(validated.payment, PaymentDetails::Cash));
    }

    #[test]
    fn missing_fields_are_all_reported_at_once() {
        let mut request = base_request();
        request.email = String::new();
        request.first_name = "  ".to_string();
        request.payment_method = String::new();
        request.cart_items.clear();

        let errors = field_errors(validate_request(&request).unwrap_err());
        assert!(errors.contains("email"));
        assert!(errors.contains("first_name"));
        assert!(errors.contains("payment_method"));
        assert!(errors.contains("cart_items"));
    }

    #[test]
    fn unknown_enum_values_are_field_errors() {
        let mut request = base_request();
        request.customer_type = "robot".to_string();
        request.payment_method = "bitcoin".to_string();
        request.delivery_method = "teleport".to_string();

        let errors = field_errors(validate_request(&request).unwrap_err());
        assert!(errors.contains("customer_type"));
        assert!(errors.contains("payment_method"));
        assert!(errors.contains("delivery_method"));
    }

    #[test]
    fn negative_delivery_price_is_rejected() {
        let mut request = base_request();
        request.delivery_price = Some(dec!(-1.00));
        let errors = field_errors(validate_request(&request).unwrap_err());
        assert!(errors.contains("delivery_price"));
    }

    #[test]
    fn company_checkout_requires_company_name() {
        let mut request = base_request();
        request.customer_type = "company".to_string();
        let errors = field_errors(validate_request(&request).unwrap_err());
        assert!(errors.contains("company_name"));

        request.company_name = Some("Acme Sp. z o.o.".to_string());
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn card_checkout_validates_payment_fields() {
        let mut request = base_request();
        request.payment_method = "card".to_string();
        request.payment = Some(CardPaymentInput {
            card_number: "4539 1488 0343 6468".to_string(),
            card_name: "Jane Shopper".to_string(),
            expiry_date: "12/99".to_string(),
            cvv: "123".to_string(),
        });
        let errors = field_errors(validate_request(&request).unwrap_err());
        assert!(errors.contains("payment.card_number"));
    }

    #[test]
    fn cart_line_violations_are_keyed_by_index() {
        let mut request = base_request();
        request.cart_items = vec![
            CartItemInput {
                product_id: Some(Uuid::new_v4()),
                quantity: 0,
                selected_size: None,
                selected_color: None,
            },
            CartItemInput {
                product_id: None,
                quantity: 1,
                selected_size: None,
                selected_color: None,
            },
        ];
        let errors = field_errors(validate_request(&request).unwrap_err());
        assert!(errors.contains("cart_items.0.quantity"));
        assert!(errors.contains("cart_items.1.product_id"));
    }

    #[test]
    fn order_numbers_are_prefixed_and_unique() {
        let a = generate_order_number();
        let b = generate_order_number();
        assert!(a.starts_with("ORD-"));
        assert_eq!(a.len(), 4 + 32);
        assert_ne!(a, b);
        assert!(a[4..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn address_snapshot_copies_profile_fields() {
        let snapshot = address_snapshot(&base_request());
        assert_eq!(snapshot["first_name"], "Jane");
        assert_eq!(snapshot["city"], "Springfield");
        assert_eq!(snapshot["company_name"], serde_json::Value::Null);
    }
}
