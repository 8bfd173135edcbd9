#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use common::{bearer, InMemoryMessages, TestAppBuilder};
use portfolio_site::entities::message::MessageStatus;

fn sample_form() -> Value {
    json!({
        "name": "Test",
        "email": "test@example.com",
        "subject": "Hi",
        "message": "Hello"
    })
}

#[actix_rt::test]
async fn contact_submission_is_stored_and_mailed() {
    let app = TestAppBuilder::new().build();
    let service = spawn_app!(app.state);

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .insert_header(("User-Agent", "integration-test"))
        .set_json(sample_form())
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["persisted"], true);
    assert_eq!(body["notified"], true);

    let rows = app.messages.rows.lock().clone();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, MessageStatus::New);
    assert_eq!(rows[0].email, "test@example.com");
    assert_eq!(rows[0].user_agent.as_deref(), Some("integration-test"));

    let sent = app.mailer.sent.lock().clone();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, "owner@portfolio.test");
    assert_eq!(sent[1].to, "test@example.com");
}

#[actix_rt::test]
async fn database_outage_still_succeeds_through_mail() {
    let app = TestAppBuilder::new().messages(InMemoryMessages::offline()).build();
    let service = spawn_app!(app.state);

    let req = test::TestRequest::post().uri("/api/contact").set_json(sample_form()).to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["persisted"], false);
    assert_eq!(body["notified"], true);
    assert!(body.get("id").is_none());
}

#[actix_rt::test]
async fn invalid_email_is_a_validation_error() {
    let app = TestAppBuilder::new().build();
    let service = spawn_app!(app.state);

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(json!({ "name": "Test", "email": "nope", "message": "Hello" }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert!(app.messages.rows.lock().is_empty());
    assert!(app.mailer.sent.lock().is_empty());
}

#[actix_rt::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestAppBuilder::new().build();
    let service = spawn_app!(app.state);

    let req = test::TestRequest::post()
        .uri("/api/contact")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{\"name\": ")
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn admin_can_list_and_update_messages() {
    let app = TestAppBuilder::new().build();
    let service = spawn_app!(app.state);

    let req = test::TestRequest::post().uri("/api/contact").set_json(sample_form()).to_request();
    assert!(test::call_service(&service, req).await.status().is_success());

    let req = test::TestRequest::get().uri("/api/messages").insert_header(bearer()).to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["messages"][0]["status"], "new");

    let req = test::TestRequest::put()
        .uri("/api/messages/1/status")
        .insert_header(bearer())
        .set_json(json!({ "status": "replied" }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(app.messages.rows.lock()[0].status, MessageStatus::Replied);

    let req = test::TestRequest::put().uri("/api/messages/99/read").insert_header(bearer()).to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
