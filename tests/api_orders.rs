mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::Value;
use wisebite::models::user::UserRole;

fn customer_auth(fixtures: &wisebite::test_utils::TestFixtures) -> (header::HeaderName, String) {
    common::bearer_for(fixtures.customer_id, UserRole::Customer)
}

fn vendor_auth(fixtures: &wisebite::test_utils::TestFixtures) -> (header::HeaderName, String) {
    common::bearer_for(fixtures.vendor_id, UserRole::Vendor)
}

async fn create_bag_order<S, B>(
    app: &S,
    fixtures: &wisebite::test_utils::TestFixtures,
    quantity: i32,
) -> Value
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<B>,
        Error = actix_web::Error,
    >,
    B: actix_web::body::MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/v1/orders")
        .insert_header(customer_auth(fixtures))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "items": [
                { "surprise_bag_id": fixtures.surprise_bag_id, "quantity": quantity }
            ]
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    test::read_body_json(resp).await
}

#[actix_rt::test]
async fn order_creation_decrements_bag_stock() {
    let (app, fixtures) = common::setup_api_app().await;

    let order = create_bag_order(&app, &fixtures, 2).await;
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_amount"], 98_000.0);
    assert_eq!(order["items"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/surprise-bags/{}", fixtures.surprise_bag_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let bag: Value = test::read_body_json(resp).await;
    assert_eq!(bag["quantity_available"], 3);
}

#[actix_rt::test]
async fn order_creation_rejects_overdraw_with_detail() {
    let (app, fixtures) = common::setup_api_app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/orders")
        .insert_header(customer_auth(&fixtures))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "items": [
                { "surprise_bag_id": fixtures.surprise_bag_id, "quantity": 10 }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("insufficient quantity"));

    // Stock is untouched after the failure.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/surprise-bags/{}", fixtures.surprise_bag_id))
        .to_request();
    let bag: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(bag["quantity_available"], 5);
}

#[actix_rt::test]
async fn malformed_lines_are_unprocessable() {
    let (app, fixtures) = common::setup_api_app().await;

    // Both references set.
    let req = test::TestRequest::post()
        .uri("/api/v1/orders")
        .insert_header(customer_auth(&fixtures))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "items": [{
                "surprise_bag_id": fixtures.surprise_bag_id,
                "food_item_id": fixtures.food_item_id,
                "quantity": 1
            }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Neither reference set.
    let req = test::TestRequest::post()
        .uri("/api/v1/orders")
        .insert_header(customer_auth(&fixtures))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({ "items": [{ "quantity": 1 }] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn full_lifecycle_confirm_then_pickup_then_review() {
    let (app, fixtures) = common::setup_api_app().await;
    let order = create_bag_order(&app, &fixtures, 2).await;
    let order_id = order["order_id"].as_i64().unwrap();

    // Pickup before confirmation is an invalid state.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/orders/{order_id}/confirm-pickup"))
        .insert_header(vendor_auth(&fixtures))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({ "payment_method": "cash" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/orders/{order_id}/status"))
        .insert_header(vendor_auth(&fixtures))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({ "status": "confirmed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "confirmed");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/orders/{order_id}/confirm-pickup"))
        .insert_header(vendor_auth(&fixtures))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({ "payment_method": "cash" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let transaction: Value = test::read_body_json(resp).await;
    assert_eq!(transaction["status"], "successful");
    assert_eq!(transaction["amount"], 98_000.0);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/orders/{order_id}/review"))
        .insert_header(customer_auth(&fixtures))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({ "rating": 5, "comment": "great" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // One review per order.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/orders/{order_id}/review"))
        .insert_header(customer_auth(&fixtures))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({ "rating": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn review_rating_out_of_range_is_unprocessable() {
    let (app, fixtures) = common::setup_api_app().await;
    let order = create_bag_order(&app, &fixtures, 1).await;
    let order_id = order["order_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/orders/{order_id}/review"))
        .insert_header(customer_auth(&fixtures))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({ "rating": 6 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_rt::test]
async fn cancellation_is_not_idempotent() {
    let (app, fixtures) = common::setup_api_app().await;
    let order = create_bag_order(&app, &fixtures, 3).await;
    let order_id = order["order_id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/orders/{order_id}/cancel"))
        .insert_header(customer_auth(&fixtures))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "cancelled");

    // Stock restored exactly once.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/surprise-bags/{}", fixtures.surprise_bag_id))
        .to_request();
    let bag: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(bag["quantity_available"], 5);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/orders/{order_id}/cancel"))
        .insert_header(customer_auth(&fixtures))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/surprise-bags/{}", fixtures.surprise_bag_id))
        .to_request();
    let bag: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(bag["quantity_available"], 5);
}

#[actix_rt::test]
async fn vendor_order_listing_requires_role_and_ownership() {
    let (app, fixtures) = common::setup_api_app().await;
    create_bag_order(&app, &fixtures, 1).await;

    // Customers cannot use the vendor listing.
    let req = test::TestRequest::get()
        .uri("/api/v1/orders/vendor/me")
        .insert_header(customer_auth(&fixtures))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/v1/orders/vendor/me")
        .insert_header(vendor_auth(&fixtures))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["customer_id"], fixtures.customer_id);

    // Another store's orders are off limits.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/orders/store/{}", fixtures.store_id + 1))
        .insert_header(vendor_auth(&fixtures))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
