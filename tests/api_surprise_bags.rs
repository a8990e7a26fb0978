mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use chrono::{Duration, Utc};
use serde_json::Value;
use wisebite::models::user::UserRole;

#[actix_rt::test]
async fn public_listing_and_detail() {
    let (app, fixtures) = common::setup_api_app().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/surprise-bags")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["surprise_bag_id"], fixtures.surprise_bag_id);
    assert_eq!(body["skip"], 0);
    assert_eq!(body["limit"], 20);

    let req = test::TestRequest::get()
        .uri("/api/v1/surprise-bags/999999")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn creation_validates_pricing_at_the_boundary() {
    let (app, fixtures) = common::setup_api_app().await;
    let auth = common::bearer_for(fixtures.vendor_id, UserRole::Vendor);
    let now = Utc::now();

    let req = test::TestRequest::post()
        .uri("/api/v1/surprise-bags")
        .insert_header(auth.clone())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "name": "Bad Bag",
            "original_value": 100_000.0,
            "discounted_price": 100_000.0,
            "quantity_available": 3,
            "pickup_start_time": now + Duration::hours(1),
            "pickup_end_time": now + Duration::hours(3)
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/api/v1/surprise-bags")
        .insert_header(auth)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "name": "Good Bag",
            "original_value": 100_000.0,
            "discounted_price": 35_000.0,
            "quantity_available": 3,
            "pickup_start_time": now + Duration::hours(1),
            "pickup_end_time": now + Duration::hours(3)
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["store_id"], fixtures.store_id);
}

#[actix_rt::test]
async fn creation_requires_the_vendor_role() {
    let (app, fixtures) = common::setup_api_app().await;
    let auth = common::bearer_for(fixtures.customer_id, UserRole::Customer);
    let now = Utc::now();

    let req = test::TestRequest::post()
        .uri("/api/v1/surprise-bags")
        .insert_header(auth)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "name": "Sneaky Bag",
            "original_value": 10.0,
            "discounted_price": 5.0,
            "quantity_available": 1,
            "pickup_start_time": now,
            "pickup_end_time": now + Duration::hours(1)
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn booking_creates_an_order_and_decrements_stock() {
    let (app, fixtures) = common::setup_api_app().await;
    let auth = common::bearer_for(fixtures.customer_id, UserRole::Customer);

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/surprise-bags/{}/book",
            fixtures.surprise_bag_id
        ))
        .insert_header(auth.clone())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({ "quantity": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = test::read_body_json(resp).await;
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_amount"], 98_000.0);
    let order_id = order["order_id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/surprise-bags/{}", fixtures.surprise_bag_id))
        .to_request();
    let bag: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(bag["quantity_available"], 3);

    // Cancelling the booking restores the stock.
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/surprise-bags/booking/{order_id}/cancel"))
        .insert_header(auth)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/surprise-bags/{}", fixtures.surprise_bag_id))
        .to_request();
    let bag: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(bag["quantity_available"], 5);
}

#[actix_rt::test]
async fn overbooking_reports_insufficient_quantity() {
    let (app, fixtures) = common::setup_api_app().await;
    let auth = common::bearer_for(fixtures.customer_id, UserRole::Customer);

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/surprise-bags/{}/book",
            fixtures.surprise_bag_id
        ))
        .insert_header(auth)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({ "quantity": 10 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("insufficient quantity"));
}

#[actix_rt::test]
async fn booking_rejects_an_expired_window() {
    let (app, fixtures) = common::setup_api_app().await;
    let vendor = common::bearer_for(fixtures.vendor_id, UserRole::Vendor);
    let customer = common::bearer_for(fixtures.customer_id, UserRole::Customer);
    let now = Utc::now();

    // Move the fixture bag's window entirely into the past.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/surprise-bags/{}", fixtures.surprise_bag_id))
        .insert_header(vendor)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "pickup_start_time": now - Duration::hours(5),
            "pickup_end_time": now - Duration::hours(2)
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/surprise-bags/{}/book",
            fixtures.surprise_bag_id
        ))
        .insert_header(customer)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({ "quantity": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("booking window"));
}
