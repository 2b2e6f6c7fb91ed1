mod common;

use std::time::Duration;

use axum::http::StatusCode;
use uuid::Uuid;

use common::{checkout_payload, TestApp};

async fn place_order(app: &TestApp, email: &str, product_id: Uuid) -> (String, String) {
    let (status, body) = app
        .post("/orders", None, checkout_payload(email, product_id, 1))
        .await;
    assert_eq!(status, StatusCode::OK, "fixture checkout failed: {body}");
    (
        body["token"].as_str().unwrap().to_string(),
        body["order"]["order_number"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn history_lists_own_orders_newest_first() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Scarf", "accessories", "19.99").await;

    let (_, first_number) = place_order(&app, "history@example.com", product.id).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    let (token, second_number) = place_order(&app, "history@example.com", product.id).await;

    let (status, body) = app.get("/orders", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["order_number"], second_number.as_str());
    assert_eq!(orders[1]["order_number"], first_number.as_str());
    // the graph is fully loaded
    assert_eq!(orders[0]["items"][0]["product"]["name"], "Scarf");
}

#[tokio::test]
async fn history_is_scoped_to_the_token_owner() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Scarf", "accessories", "19.99").await;

    place_order(&app, "alice@example.com", product.id).await;
    let (bob_token, _) = place_order(&app, "bob@example.com", product.id).await;

    let (status, body) = app.get("/orders", Some(&bob_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn fetching_anothers_order_is_forbidden() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Scarf", "accessories", "19.99").await;

    let (alice_token, _) = place_order(&app, "alice@example.com", product.id).await;
    let (bob_token, _) = place_order(&app, "bob@example.com", product.id).await;

    let (_, alice_orders) = app.get("/orders", Some(&alice_token)).await;
    let alice_order_id = alice_orders[0]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .get(&format!("/orders/{alice_order_id}"), Some(&bob_token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .get(&format!("/orders/{alice_order_id}"), Some(&alice_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], alice_order_id.as_str());
}

#[tokio::test]
async fn unknown_order_is_not_found() {
    let app = TestApp::spawn().await;
    let product = app.seed_product("Scarf", "accessories", "19.99").await;
    let (token, _) = place_order(&app, "alice@example.com", product.id).await;

    let (status, _) = app
        .get(&format!("/orders/{}", Uuid::new_v4()), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_requires_authentication() {
    let app = TestApp::spawn().await;
    let (status, _) = app.get("/orders", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
