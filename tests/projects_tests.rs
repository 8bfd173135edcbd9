#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

use common::{bearer, github_repo, multipart_form, png_bytes, InMemoryProjects, StaticRepos, TestAppBuilder};

const FALLBACK: &[u8] = br#"[
  { "id": 1, "title": "Weather Dashboard", "tags": "javascript,api" },
  { "id": 2, "title": "Portfolio Site",    "tags": "html,css" }
]
"#;

#[actix_rt::test]
async fn listing_comes_from_the_database() {
    let app = TestAppBuilder::new().fallback_projects(FALLBACK).build();
    let service = spawn_app!(app.state);

    let req = test::TestRequest::get().uri("/api/projects").to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Data-Source").unwrap(), "database");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([]));
}

#[actix_rt::test]
async fn database_outage_serves_fallback_verbatim() {
    let app = TestAppBuilder::new()
        .projects(InMemoryProjects::offline())
        .fallback_projects(FALLBACK)
        .build();
    let service = spawn_app!(app.state);

    let req = test::TestRequest::get().uri("/api/projects").to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-Data-Source").unwrap(), "fallback");

    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), FALLBACK);
}

#[actix_rt::test]
async fn outage_without_fallback_is_a_server_error() {
    let app = TestAppBuilder::new().projects(InMemoryProjects::offline()).build();
    let service = spawn_app!(app.state);

    let req = test::TestRequest::get().uri("/api/projects").to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "projects_unavailable");
}

#[actix_rt::test]
async fn json_project_lifecycle() {
    let app = TestAppBuilder::new().build();
    let service = spawn_app!(app.state);

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer())
        .set_json(json!({
            "title": "Task Tracker",
            "description": "Kanban board",
            "live_url": "https://tasks.example.com",
            "tags": "react,node"
        }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["success"], true);
    let id = created["id"].as_i64().unwrap();

    let req = test::TestRequest::get().uri(&format!("/api/projects/{id}")).to_request();
    let project: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(project["title"], "Task Tracker");

    let req = test::TestRequest::put()
        .uri(&format!("/api/projects/{id}"))
        .insert_header(bearer())
        .set_json(json!({ "title": "Task Tracker v2" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(updated["project"]["title"], "Task Tracker v2");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{id}"))
        .insert_header(bearer())
        .to_request();
    assert_eq!(test::call_service(&service, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri(&format!("/api/projects/{id}")).to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "project_not_found");
}

#[actix_rt::test]
async fn missing_title_is_rejected() {
    let app = TestAppBuilder::new().build();
    let service = spawn_app!(app.state);

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer())
        .set_json(json!({ "title": "   " }))
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(app.projects.rows.lock().is_empty());
}

#[actix_rt::test]
async fn multipart_project_stores_sniffed_image() {
    let app = TestAppBuilder::new().build();
    let service = spawn_app!(app.state);

    let png = png_bytes();
    let (content_type, body) = multipart_form(
        &[("title", "Photo Gallery"), ("tags", "css,grid")],
        Some(("projectImage", "cover.jpg", "image/jpeg", &png)),
    );
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let rows = app.projects.rows.lock().clone();
    let image = rows[0].image.clone().unwrap();
    assert!(image.starts_with("/uploads/project-"));
    assert!(image.ends_with(".png"));
    assert_eq!(app.stored_files().len(), 1);
}

#[actix_rt::test]
async fn multipart_project_refuses_non_images() {
    let app = TestAppBuilder::new().build();
    let service = spawn_app!(app.state);

    let (content_type, body) = multipart_form(
        &[("title", "Sneaky")],
        Some(("projectImage", "cover.png", "image/png", b"<script>alert(1)</script>")),
    );
    let req = test::TestRequest::post()
        .uri("/api/projects")
        .insert_header(bearer())
        .insert_header(("Content-Type", content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(app.projects.rows.lock().is_empty());
    assert!(app.stored_files().is_empty());
}

#[actix_rt::test]
async fn synced_projects_are_protected_from_delete() {
    let app = TestAppBuilder::new()
        .github(StaticRepos::new(vec![github_repo(10, false, false), github_repo(11, true, false)]))
        .build();
    let service = spawn_app!(app.state);

    let req = test::TestRequest::post()
        .uri("/api/projects/sync-github")
        .insert_header(bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(body["synced"], 1);

    let rows = app.projects.rows.lock().clone();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_github_sync);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/projects/{}", rows[0].id))
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&service, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}
