#![allow(dead_code)]

use std::str::FromStr;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use storefront_api::config::AppConfig;
use storefront_api::entities::product;
use storefront_api::events::{event_channel, process_events};
use storefront_api::migrator::Migrator;
use storefront_api::{app_router, AppState};

use sea_orm_migration::MigratorTrait;

/// In-process application over an in-memory SQLite database.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

impl TestApp {
    pub async fn spawn() -> Self {
        // a single connection, otherwise every pooled connection gets its
        // own empty :memory: database
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1);
        let db = Database::connect(options)
            .await
            .expect("failed to open in-memory database");
        Migrator::up(&db, None)
            .await
            .expect("failed to run migrations");

        let (event_sender, event_receiver) = event_channel(64);
        tokio::spawn(process_events(event_receiver));

        let config = AppConfig::new("sqlite::memory:", "127.0.0.1", 0, "test");
        let state = AppState::new(db.clone(), config, event_sender);

        Self {
            router: app_router(state),
            db,
        }
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` when the body is empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body was not JSON")
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Inserts a product row directly.
    pub async fn seed_product(&self, name: &str, category: &str, price: &str) -> product::Model {
        let now = Utc::now();
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            category: Set(category.to_string()),
            price: Set(Decimal::from_str(price).unwrap()),
            description: Set(format!("{name} description")),
            rating: Set(Decimal::from_str("4.5").unwrap()),
            sizes: Set(json!(["S", "M", "L"])),
            colors: Set(json!(["black", "white"])),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .expect("failed to seed product")
    }
}

/// A complete, valid cash-on-delivery checkout body for one product.
pub fn checkout_payload(email: &str, product_id: Uuid, quantity: i64) -> Value {
    json!({
        "customer_type": "individual",
        "email": email,
        "password": "correct horse battery staple",
        "first_name": "Jane",
        "last_name": "Shopper",
        "phone": "+48 123 456 789",
        "address": "1 Main St",
        "city": "Springfield",
        "postal_code": "00-001",
        "country": "PL",
        "payment_method": "cash",
        "delivery_method": "courier",
        "delivery_price": "15.99",
        "cart_items": [
            {"product_id": product_id, "quantity": quantity}
        ]
    })
}

/// Card payment block that passes validation.
pub fn valid_card_payment() -> Value {
    json!({
        "card_number": "4539 1488 0343 6467",
        "card_name": "Jane Shopper",
        "expiry_date": "12/99",
        "cvv": "123"
    })
}

/// Reads a decimal that may be serialized as a JSON string or number.
pub fn json_decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).unwrap(),
        other => panic!("expected a decimal, got {other:?}"),
    }
}

/// The field-keyed `errors` object of a 422 body.
pub fn error_fields(body: &Value) -> &serde_json::Map<String, Value> {
    body["errors"].as_object().expect("body has no errors object")
}
