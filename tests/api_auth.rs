mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::Value;
use wisebite::test_utils::TEST_PASSWORD;

#[actix_rt::test]
async fn signup_login_round_trip() {
    let (app, _fixtures) = common::setup_api_app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "full_name": "Fresh Customer",
            "phone_number": "0900000100",
            "email": "fresh@example.com",
            "password": "fresh-password-1"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "fresh@example.com");
    assert_eq!(body["role"], "customer");
    assert!(body.get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "email": "fresh@example.com",
            "password": "fresh-password-1"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].is_string());
}

#[actix_rt::test]
async fn login_rejects_wrong_password_and_unknown_user() {
    let (app, _fixtures) = common::setup_api_app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "email": "customer1@example.com",
            "password": "wrong-password"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "email": "nobody@example.com",
            "password": TEST_PASSWORD
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn signup_rejects_short_password_and_duplicates() {
    let (app, _fixtures) = common::setup_api_app().await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "full_name": "Weak",
            "phone_number": "0900000101",
            "email": "weak@example.com",
            "password": "short"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Seeded fixture already owns this email.
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({
            "full_name": "Copycat",
            "phone_number": "0900000102",
            "email": "customer1@example.com",
            "password": "long-enough-pw"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .to_lowercase()
        .contains("already exists"));
}

#[actix_rt::test]
async fn protected_routes_require_a_principal() {
    let (app, _fixtures) = common::setup_api_app().await;

    let req = test::TestRequest::get().uri("/api/v1/users/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn profile_read_and_partial_update() {
    let (app, fixtures) = common::setup_api_app().await;
    let auth = common::bearer_for(
        fixtures.customer_id,
        wisebite::models::user::UserRole::Customer,
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(auth.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "customer1@example.com");

    let req = test::TestRequest::patch()
        .uri("/api/v1/users/me")
        .insert_header(auth)
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_json(&serde_json::json!({ "full_name": "Renamed Customer" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["full_name"], "Renamed Customer");
    assert_eq!(body["email"], "customer1@example.com");
}
