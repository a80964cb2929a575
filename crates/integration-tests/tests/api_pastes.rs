use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use integration_tests::{get, TestApp, T0};
use pb_core::traits::PasteStore;
use serde_json::json;

#[tokio::test]
async fn create_returns_id_and_url() {
    let app = TestApp::new();

    let (status, created) = app.create(json!({ "content": "hello" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["id"].as_str().unwrap();
    assert_eq!(id.len(), 8);
    assert_eq!(created["url"], format!("http://paste.test/p/{id}"));
}

#[tokio::test]
async fn ttl_paste_expires_after_deadline() {
    let app = TestApp::new();
    let id = app.create_ok(json!({ "content": "hello", "ttl_seconds": 2 })).await;

    let (status, html) = app.view(&id, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("hello"));

    let (status, text) = app.view(&id, Some(T0 + 3_000)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "Expired");
}

#[tokio::test]
async fn expired_paste_stays_gone_for_earlier_clocks() {
    let app = TestApp::new();
    let id = app.create_ok(json!({ "content": "hello", "ttl_seconds": 2 })).await;

    let (status, _) = app.inspect(&id, Some(T0 + 2_000)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.inspect(&id, Some(T0)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));
    assert_eq!(app.store.get(&id).await.unwrap(), None);
}

#[tokio::test]
async fn just_before_deadline_is_still_live() {
    let app = TestApp::new();
    let id = app.create_ok(json!({ "content": "hello", "ttl_seconds": 2 })).await;

    let (status, body) = app.inspect(&id, Some(T0 + 1_999)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expires_at"], "2023-11-14T22:13:22.000Z");
}

#[tokio::test]
async fn single_view_paste_burns_out() {
    let app = TestApp::new();
    let id = app.create_ok(json!({ "content": "x", "max_views": 1 })).await;

    let (status, _) = app.view(&id, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, text) = app.view(&id, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "View limit exceeded");

    let stored = app.store.get(&id).await.unwrap().expect("record kept");
    assert_eq!(stored.views, 1);
}

#[tokio::test]
async fn html_view_escapes_content() {
    let app = TestApp::new();
    let id = app
        .create_ok(json!({ "content": "<script>alert(1)</script>" }))
        .await;

    let (status, html) = app.view(&id, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("&lt;script&gt;alert(1)"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn api_read_returns_raw_content() {
    let app = TestApp::new();
    let id = app
        .create_ok(json!({ "content": "<b>bold</b> & 'quotes'" }))
        .await;

    let (status, body) = app.inspect(&id, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "content": "<b>bold</b> & 'quotes'",
            "remaining_views": null,
            "expires_at": null,
        })
    );
}

#[tokio::test]
async fn inspect_does_not_spend_views() {
    let app = TestApp::new();
    let id = app.create_ok(json!({ "content": "x", "max_views": 3 })).await;

    for _ in 0..5 {
        let (status, body) = app.inspect(&id, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["remaining_views"], 3);
    }

    app.view(&id, None).await;
    let (_, body) = app.inspect(&id, None).await;
    assert_eq!(body["remaining_views"], 2);
}

#[tokio::test]
async fn remaining_views_bottom_out_at_zero() {
    let app = TestApp::new();
    let id = app.create_ok(json!({ "content": "x", "max_views": 2 })).await;

    app.view(&id, None).await;
    app.view(&id, None).await;
    app.view(&id, None).await;

    let (status, body) = app.inspect(&id, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remaining_views"], 0);
}

#[tokio::test]
async fn validation_failures_name_the_field() {
    let app = TestApp::new();

    for (body, message) in [
        (json!({ "content": "" }), "Invalid content"),
        (json!({ "content": "   " }), "Invalid content"),
        (json!({ "content": "x", "ttl_seconds": -1 }), "Invalid ttl_seconds"),
        (json!({ "content": "x", "ttl_seconds": 1.5 }), "Invalid ttl_seconds"),
        (json!({ "content": "x", "max_views": 0 }), "Invalid max_views"),
        (json!({ "content": "x", "max_views": "2" }), "Invalid max_views"),
    ] {
        let (status, response) = app.create(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": message }));
    }
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/pastes")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid JSON body" }));
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = TestApp::new();

    let (status, body) = app.inspect("missing1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found" }));

    let (status, text) = app.view("missing1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "Not found");
}

#[tokio::test]
async fn override_applies_to_one_request_only() {
    let app = TestApp::new();
    let id = app.create_ok(json!({ "content": "x", "ttl_seconds": 60 })).await;

    let (status, _) = app.inspect(&id, Some(T0 - 10_000)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.inspect(&id, None).await;
    assert_eq!(status, StatusCode::OK);

    let stored = app.store.get(&id).await.unwrap().unwrap();
    assert_eq!(stored.created_at, T0);
    assert_eq!(stored.expires_at, Some(T0 + 60_000));
}

#[tokio::test]
async fn creation_honours_the_override() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/pastes")
        .header("content-type", "application/json")
        .header("x-test-now-ms", "1000")
        .body(Body::from(json!({ "content": "x", "ttl_seconds": 1 }).to_string()))
        .unwrap();

    let (status, created) = app.send_json(request).await;
    assert_eq!(status, StatusCode::CREATED);

    let stored = app
        .store
        .get(created["id"].as_str().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.expires_at, Some(2_000));
}

#[tokio::test]
async fn wall_clock_moves_expire_pastes_too() {
    let app = TestApp::new();
    let id = app.create_ok(json!({ "content": "x", "ttl_seconds": 5 })).await;

    app.clock.advance(5_000);
    let (status, text) = app.view(&id, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(text, "Expired");
}

#[tokio::test]
async fn html_view_has_html_content_type() {
    let app = TestApp::new();
    let id = app.create_ok(json!({ "content": "x" })).await;

    let response = tower::ServiceExt::oneshot(app.router.clone(), get(&format!("/p/{id}"), None))
        .await
        .unwrap();
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
}

#[tokio::test]
async fn oversized_body_is_payload_too_large() {
    let app = TestApp::new();
    let content = "x".repeat(2 * 1024 * 1024);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/pastes")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "content": content }).to_string()))
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({ "error": "Request body too large" }));
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn missing_content_type_is_unsupported_media_type() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/pastes")
        .body(Body::from(json!({ "content": "x" }).to_string()))
        .unwrap();

    let (status, body) = app.send_json(request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body, json!({ "error": "Expected a JSON body" }));
}

#[tokio::test]
async fn preflight_allows_the_time_override_header() {
    let app = TestApp::new();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/pastes")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,x-test-now-ms")
        .body(Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:3000");
    let allowed = headers["access-control-allow-headers"]
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed.contains("content-type"));
    assert!(allowed.contains("x-test-now-ms"));
}
