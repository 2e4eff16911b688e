//! Marketing subscription API tests

use actix_web::{App, test};
use assert_json_diff::assert_json_eq;
use serde_json::{Value, json};

use crate::model::Model;
use crate::service;
use crate::service::tests::spawn_backend;

#[actix_web::test]
async fn missing_email_reports_failure_with_status_ok() {
    let (addr, _seen) = spawn_backend();
    let model = Model::test(&format!("http://{addr}/"));
    let service_config = service::configure(model).await.unwrap();
    let app = test::init_service(App::new().configure(service_config)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/marketing/subscribe")
            .set_json(json!({}))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_json_eq!(body, json!({ "success": false, "error": "Email is required" }));
}

#[actix_web::test]
async fn subscribe_forwards_with_the_service_credential() {
    let (addr, seen) = spawn_backend();
    let model = Model::test(&format!("http://{addr}/"));
    let service_config = service::configure(model).await.unwrap();
    let app = test::init_service(App::new().configure(service_config)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/marketing/subscribe")
            .set_json(json!({ "email": "learner@example.com" }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_json_eq!(body, json!({ "success": true }));
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["Bearer test-service-secret"]
    );
}

#[actix_web::test]
async fn backend_failure_still_reports_status_ok() {
    // Nothing listens here; the upstream call fails on the spot
    let model = Model::test("http://127.0.0.1:9/");
    let service_config = service::configure(model).await.unwrap();
    let app = test::init_service(App::new().configure(service_config)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/marketing/subscribe")
            .set_json(json!({ "email": "learner@example.com" }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn unparsable_body_counts_as_missing_email() {
    let (addr, _seen) = spawn_backend();
    let model = Model::test(&format!("http://{addr}/"));
    let service_config = service::configure(model).await.unwrap();
    let app = test::init_service(App::new().configure(service_config)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/marketing/subscribe")
            .insert_header(("content-type", "application/json"))
            .set_payload("not json at all")
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_json_eq!(body, json!({ "success": false, "error": "Email is required" }));
}
