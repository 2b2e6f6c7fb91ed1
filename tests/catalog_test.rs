mod common;

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{json_decimal, TestApp};

#[tokio::test]
async fn products_are_listed_with_variants() {
    let app = TestApp::spawn().await;
    app.seed_product("Wool Sweater", "sweaters", "49.99").await;
    app.seed_product("Linen Shirt", "shirts", "29.50").await;

    let (status, body) = app.get("/products", None).await;
    assert_eq!(status, StatusCode::OK);

    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 2);
    let shirt = products
        .iter()
        .find(|p| p["name"] == "Linen Shirt")
        .unwrap();
    assert_eq!(json_decimal(&shirt["price"]), dec!(29.50));
    assert_eq!(shirt["sizes"].as_array().unwrap().len(), 3);
    assert_eq!(shirt["colors"][0], "black");
}

#[tokio::test]
async fn product_fetch_by_id_and_missing_id() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Wool Sweater", "sweaters", "49.99").await;

    let (status, body) = app.get(&format!("/products/{}", product.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Wool Sweater");

    let (status, _) = app.get(&format!("/products/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_filter_and_distinct_categories() {
    let app = TestApp::spawn().await;
    app.seed_product("Wool Sweater", "sweaters", "49.99").await;
    app.seed_product("Cotton Sweater", "sweaters", "39.99").await;
    app.seed_product("Linen Shirt", "shirts", "29.50").await;

    let (status, body) = app.get("/products/category/sweaters", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app.get("/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!(["shirts", "sweaters"]));
}

#[tokio::test]
async fn health_reports_database_status() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
    assert_eq!(body["database"], "up");
}
