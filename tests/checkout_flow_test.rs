mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use uuid::Uuid;

use common::{checkout_payload, error_fields, json_decimal, valid_card_payment, TestApp};
use storefront_api::entities::{Customer, Order, OrderItem};

#[tokio::test]
async fn cash_checkout_computes_total_server_side() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Wool Sweater", "sweaters", "49.99").await;

    let (status, body) = app
        .post("/orders", None, checkout_payload("jane@example.com", product.id, 2))
        .await;

    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["message"], "Order created successfully");
    assert!(!body["token"].as_str().unwrap().is_empty());

    let order = &body["order"];
    // 49.99 * 2 + 15.99
    assert_eq!(json_decimal(&order["total_amount"]), dec!(115.97));
    assert_eq!(json_decimal(&order["delivery_price"]), dec!(15.99));
    assert_eq!(order["status"], "pending");
    assert!(order["order_number"].as_str().unwrap().starts_with("ORD-"));

    assert_eq!(order["payment_details"]["method"], "cash");
    assert!(order["payment_details"]["instructions"].as_str().unwrap().len() > 10);

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(json_decimal(&items[0]["unit_price"]), dec!(49.99));
    assert_eq!(items[0]["product"]["name"], "Wool Sweater");

    assert_eq!(order["billing_address"]["city"], "Springfield");
    assert_eq!(order["shipping_address"]["city"], "Springfield");

    let customer = &body["customer"];
    assert_eq!(customer["email"], "jane@example.com");
    assert!(customer.get("password_hash").is_none());
    assert!(customer.get("password").is_none());
}

#[tokio::test]
async fn card_checkout_persists_only_last_four_digits() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Linen Shirt", "shirts", "29.50").await;

    let mut payload = checkout_payload("card@example.com", product.id, 1);
    payload["payment_method"] = json!("card");
    payload["payment"] = valid_card_payment();

    let (status, body) = app.post("/orders", None, payload).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");

    let details = &body["order"]["payment_details"];
    assert_eq!(details["method"], "card");
    assert_eq!(details["card_last_four"], "6467");
    assert_eq!(details["card_name"], "Jane Shopper");
    assert!(details.get("card_number").is_none());
    assert!(details.get("cvv").is_none());
    assert!(!body.to_string().contains("4539148803436467"));
    assert!(!body.to_string().contains("4539 1488 0343 6467"));
}

#[tokio::test]
async fn invalid_card_number_is_a_field_error() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Linen Shirt", "shirts", "29.50").await;

    let mut payload = checkout_payload("card@example.com", product.id, 1);
    payload["payment_method"] = json!("card");
    payload["payment"] = valid_card_payment();
    // single-digit mutation breaks the Luhn checksum
    payload["payment"]["card_number"] = json!("4539 1488 0343 6468");

    let (status, body) = app.post("/orders", None, payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error_fields(&body).contains_key("payment.card_number"));

    assert_eq!(Order::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(Customer::find().count(&app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn new_customer_requires_a_password() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Socks", "accessories", "5.00").await;

    let mut payload = checkout_payload("nopass@example.com", product.id, 1);
    payload.as_object_mut().unwrap().remove("password");

    let (status, body) = app.post("/orders", None, payload).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error_fields(&body).contains_key("password"));
    assert_eq!(Customer::find().count(&app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_product_rolls_back_everything() {
    let app = TestApp::spawn().await;
    app.seed_product("Real Product", "shirts", "10.00").await;

    let payload = checkout_payload("ghost@example.com", Uuid::new_v4(), 1);
    let (status, body) = app.post("/orders", None, payload).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {body}");
    assert!(error_fields(&body).contains_key("cart_items.0.product_id"));

    // nothing from the aborted transaction may be visible
    assert_eq!(Customer::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(Order::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(OrderItem::find().count(&app.db).await.unwrap(), 0);
}

#[tokio::test]
async fn repeat_checkout_updates_the_profile_in_place() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Scarf", "accessories", "19.99").await;

    let first = checkout_payload("repeat@example.com", product.id, 1);
    let (status, _) = app.post("/orders", None, first).await;
    assert_eq!(status, StatusCode::OK);

    // same address, different casing: still the same account
    let mut second = checkout_payload("Repeat@Example.COM", product.id, 1);
    second["first_name"] = json!("Janet");
    second["city"] = json!("Shelbyville");
    let (status, body) = app.post("/orders", None, second).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");

    assert_eq!(Customer::find().count(&app.db).await.unwrap(), 1);
    assert_eq!(Order::find().count(&app.db).await.unwrap(), 2);
    assert_eq!(body["customer"]["first_name"], "Janet");
    assert_eq!(body["customer"]["city"], "Shelbyville");
}

#[tokio::test]
async fn existing_customer_must_present_the_right_password() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Scarf", "accessories", "19.99").await;

    let first = checkout_payload("owner@example.com", product.id, 1);
    let (status, _) = app.post("/orders", None, first).await;
    assert_eq!(status, StatusCode::OK);

    let mut second = checkout_payload("owner@example.com", product.id, 1);
    second["password"] = json!("not the password");
    let (status, body) = app.post("/orders", None, second).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(error_fields(&body).contains_key("password"));
    assert_eq!(Order::find().count(&app.db).await.unwrap(), 1);
}

#[tokio::test]
async fn client_submitted_total_is_ignored() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Wool Sweater", "sweaters", "49.99").await;

    let mut payload = checkout_payload("thrifty@example.com", product.id, 2);
    payload["total_with_delivery"] = json!("1.00");

    let (status, body) = app.post("/orders", None, payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_decimal(&body["order"]["total_amount"]), dec!(115.97));
}

#[tokio::test]
async fn every_violation_is_reported_at_once() {
    let app = TestApp::spawn().await;

    let (status, body) = app.post("/orders", None, json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let errors = error_fields(&body);
    for field in [
        "customer_type",
        "email",
        "first_name",
        "last_name",
        "payment_method",
        "delivery_method",
        "delivery_price",
        "cart_items",
    ] {
        assert!(errors.contains_key(field), "missing error for {field}");
    }
}

#[tokio::test]
async fn checkout_token_is_usable_immediately() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Hat", "accessories", "12.00").await;

    let (_, body) = app
        .post("/orders", None, checkout_payload("fresh@example.com", product.id, 1))
        .await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = app.get("/customer/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "fresh@example.com");
}
