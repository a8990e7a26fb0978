mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::Value;
use wisebite::models::user::UserRole;

#[actix_rt::test]
async fn vendor_creates_item_with_opening_ledger() {
    let (app, fixtures) = common::setup_api_app().await;
    let vendor = common::bearer_for(fixtures.vendor_id, UserRole::Vendor);

    let req = test::TestRequest::post()
        .uri("/api/v1/food-items")
        .insert_header(vendor.clone())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "name": "Pho Bo",
            "standard_price": 55_000.0,
            "total_quantity": 10
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: Value = test::read_body_json(resp).await;
    assert_eq!(item["available_quantity"], 10);
    let item_id = item["food_item_id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/food-items/{item_id}/inventory-history"))
        .insert_header(vendor)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let logs: Value = test::read_body_json(resp).await;
    let logs = logs.as_array().expect("log array");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["change_type"], "initial_stock");
    assert_eq!(logs[0]["quantity_change"], 10);
}

#[actix_rt::test]
async fn surplus_marking_scenario() {
    let (app, fixtures) = common::setup_api_app().await;
    let vendor = common::bearer_for(fixtures.vendor_id, UserRole::Vendor);

    // Fixture item: price 100_000, quantity 10.
    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/food-items/{}/surplus",
            fixtures.food_item_id
        ))
        .insert_header(vendor.clone())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "surplus_quantity": 3,
            "discount_percentage": 0.3
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let item: Value = test::read_body_json(resp).await;
    assert_eq!(item["surplus_price"], 70_000.0);
    assert_eq!(item["available_quantity"], 7);
    assert_eq!(item["is_marked_for_surplus"], true);

    // Exceeding availability is a business-rule violation.
    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/food-items/{}/surplus",
            fixtures.food_item_id
        ))
        .insert_header(vendor)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "surplus_quantity": 50,
            "discount_percentage": 0.3
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn inventory_update_requires_ownership() {
    let (app, fixtures) = common::setup_api_app().await;

    // A second vendor with their own store cannot touch the fixture item.
    let signup = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "full_name": "Other Vendor",
            "phone_number": "0900000200",
            "email": "other-vendor@example.com",
            "password": "another-pass-1",
            "role": "vendor"
        }))
        .to_request();
    let resp = test::call_service(&app, signup).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let other: Value = test::read_body_json(resp).await;
    let other_auth = common::bearer_for(
        other["user_id"].as_i64().unwrap() as i32,
        UserRole::Vendor,
    );

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/food-items/{}/inventory",
            fixtures.food_item_id
        ))
        .insert_header(other_auth)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "new_total_quantity": 0,
            "change_type": "shrinkage"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn public_listing_and_surplus_filter() {
    let (app, fixtures) = common::setup_api_app().await;
    let vendor = common::bearer_for(fixtures.vendor_id, UserRole::Vendor);

    let req = test::TestRequest::get()
        .uri("/api/v1/food-items?surplus_only=true")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 0);

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/food-items/{}/surplus",
            fixtures.food_item_id
        ))
        .insert_header(vendor)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "surplus_quantity": 2,
            "discount_percentage": 0.5
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/food-items?surplus_only=true")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["food_item_id"], fixtures.food_item_id);
}
