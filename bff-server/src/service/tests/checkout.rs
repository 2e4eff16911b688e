//! Checkout bridging API tests

use actix_web::cookie::Cookie;
use actix_web::{App, test};
use serde_json::{Value, json};

use crate::model::Model;
use crate::service;
use crate::service::tests::spawn_backend;

#[actix_web::test]
async fn unknown_price_id_is_rejected() {
    let (addr, _seen) = spawn_backend();
    let model = Model::test(&format!("http://{addr}/"));
    let service_config = service::configure(model).await.unwrap();
    let app = test::init_service(App::new().configure(service_config)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/intent")
            .set_json(json!({
                "price_id": "price_enterprise",
                "success_url": "https://app.example.com/welcome",
                "cancel_url": "https://app.example.com/pricing",
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Invalid price_id"));
}

#[actix_web::test]
async fn missing_redirect_urls_are_rejected() {
    let (addr, _seen) = spawn_backend();
    let model = Model::test(&format!("http://{addr}/"));
    let service_config = service::configure(model).await.unwrap();
    let app = test::init_service(App::new().configure(service_config)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/intent")
            .set_json(json!({ "price_id": "price_basic_monthly" }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], json!("Missing redirect URLs"));
}

#[actix_web::test]
async fn parked_intent_resumes_after_sign_in_exactly_once() {
    let (addr, _seen) = spawn_backend();
    let model = Model::test(&format!("http://{addr}/"));
    let service_config = service::configure(model).await.unwrap();
    let app = test::init_service(App::new().configure(service_config)).await;

    // Visitor picks a plan before signing in
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/intent")
            .set_json(json!({
                "price_id": "price_pro_yearly",
                "success_url": "https://app.example.com/welcome",
                "cancel_url": "https://app.example.com/pricing",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert!(body["data"]["expires_at"].is_string());

    // Then signs in
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/session")
            .set_json(json!({ "token": "idp-token-123" }))
            .to_request(),
    )
    .await;
    let session = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .unwrap()
        .value()
        .to_owned();

    // And resumes the parked plan selection
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/session")
            .cookie(Cookie::new("session", session.clone()))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["url"], json!("https://pay.example.com/cs_123"));
    assert_eq!(body["received"]["price_id"], json!("price_pro_yearly"));
    // Plan default trial applies when the intent names none
    assert_eq!(body["received"]["trial_days"], json!(14));

    // Consumed means gone; a second attempt starts over
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/session")
            .cookie(Cookie::new("session", session))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], json!("No pending checkout for this client"));
}

#[actix_web::test]
async fn explicit_trial_days_override_the_plan_default() {
    let (addr, _seen) = spawn_backend();
    let model = Model::test(&format!("http://{addr}/"));
    let service_config = service::configure(model).await.unwrap();
    let app = test::init_service(App::new().configure(service_config)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/intent")
            .set_json(json!({
                "price_id": "price_pro_yearly",
                "success_url": "https://app.example.com/welcome",
                "cancel_url": "https://app.example.com/pricing",
                "trial_days": 30,
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/session")
            .set_json(json!({ "token": "idp-token-123" }))
            .to_request(),
    )
    .await;
    let session = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .unwrap()
        .value()
        .to_owned();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/session")
            .cookie(Cookie::new("session", session))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["received"]["trial_days"], json!(30));
}

#[actix_web::test]
async fn resuming_requires_a_session() {
    let (addr, _seen) = spawn_backend();
    let model = Model::test(&format!("http://{addr}/"));
    let service_config = service::configure(model).await.unwrap();
    let app = test::init_service(App::new().configure(service_config)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/session")
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn session_reset_drops_the_parked_intent() {
    let (addr, _seen) = spawn_backend();
    let model = Model::test(&format!("http://{addr}/"));
    let service_config = service::configure(model).await.unwrap();
    let app = test::init_service(App::new().configure(service_config)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/intent")
            .set_json(json!({
                "price_id": "price_basic_monthly",
                "success_url": "https://app.example.com/welcome",
                "cancel_url": "https://app.example.com/pricing",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete().uri("/session").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/session")
            .set_json(json!({ "token": "idp-token-123" }))
            .to_request(),
    )
    .await;
    let session = resp
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .unwrap()
        .value()
        .to_owned();

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/checkout/session")
            .cookie(Cookie::new("session", session))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);
}
