use std::collections::HashSet;

use anyhow::Result;
use reqwest::{header, Method, StatusCode};
use serde_json::{json, Value};
use tokio::task::JoinSet;
use waitlist::store::sanitize_email;
use wiremock::{
    matchers::{any, header as header_matcher, method, path_regex},
    Mock, ResponseTemplate,
};

use crate::helpers::{TestApp, TEST_BLOB_TOKEN, TEST_BLOB_URL};

#[tokio::test]
async fn submit_email_ok_writes_one_blob_and_returns_url() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/waitlist/\d{13}-a_b_com-[0-9a-f]{32}\.json$"))
        .and(header_matcher(
            "authorization",
            format!("Bearer {TEST_BLOB_TOKEN}").as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": TEST_BLOB_URL,
            "pathname": "waitlist/submission.json",
        })))
        .expect(1)
        .mount(&app.blob_server)
        .await;

    let res = app.post_submit_email(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(
        res.status(),
        StatusCode::OK,
        "Wrong response StatusCode: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    assert_eq!(body, json!({ "message": "Success", "url": TEST_BLOB_URL }));

    Ok(())
}

#[tokio::test]
async fn submit_email_stores_the_normalized_email() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_blob_put(1).await;

    let res = app
        .post_submit_email(&json!({ "email": "  Jane.Doe@Example.com " }))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let requests = app
        .blob_server
        .received_requests()
        .await
        .unwrap_or_default();
    assert_eq!(requests.len(), 1);

    let stored: Value = serde_json::from_slice(&requests[0].body)?;
    assert_eq!(stored["email"], "jane.doe@example.com");
    assert!(stored["timestamp"].is_string());
    assert!(requests[0]
        .url
        .path()
        .contains(&format!("-{}-", sanitize_email("jane.doe@example.com"))));

    Ok(())
}

#[tokio::test]
async fn submit_email_returns_400_for_missing_or_invalid_email() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.blob_server)
        .await;

    let cases = [
        (json!({ "email": "" }), "Empty email"),
        (json!({ "email": "   " }), "Whitespace email"),
        (json!({ "email": "not-an-email" }), "Email without '@'"),
        (json!({ "email": null }), "Null email"),
        (json!({ "email": 42 }), "Non string email"),
        (json!({ "name": "John Doe" }), "Missing email"),
        (json!({}), "Empty json"),
        (json!("a@b.com"), "Bare string body"),
        (json!(["a@b.com"]), "Array body"),
        (json!([]), "Empty array body"),
    ];

    for (body, description) in cases {
        let res = app.post_submit_email(&body).await?;
        assert_eq!(
            400,
            res.status().as_u16(),
            "The API did not return a 400 BAD REQUEST when the payload was: {description}."
        );
        let body: Value = res.json().await?;
        assert_eq!(body["error"], "Valid email is required", "{description}");
        assert_eq!(body["code"], "INVALID_EMAIL", "{description}");
    }

    Ok(())
}

#[tokio::test]
async fn submit_email_returns_400_for_unreadable_body() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.blob_server)
        .await;

    let malformed = app
        .http_client
        .post(app.url("/api/submit-email"))
        .header(header::CONTENT_TYPE, "application/json")
        .body("{ not json")
        .send()
        .await?;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

    let no_content_type = app
        .http_client
        .post(app.url("/api/submit-email"))
        .body(r#"{"email":"a@b.com"}"#)
        .send()
        .await?;
    assert_eq!(no_content_type.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn submit_email_returns_405_for_other_methods() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.blob_server)
        .await;

    for req_method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let res = app
            .http_client
            .request(req_method.clone(), app.url("/api/submit-email"))
            .json(&json!({ "email": "a@b.com" }))
            .send()
            .await?;

        assert_eq!(
            res.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "Expected 405 for {req_method}"
        );
        let body: Value = res.json().await?;
        assert_eq!(body["error"], "Method not allowed");
    }

    Ok(())
}

#[tokio::test]
async fn submit_email_preflight_returns_200_with_cors_headers() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.blob_server)
        .await;

    let res = app
        .http_client
        .request(Method::OPTIONS, app.url("/api/submit-email"))
        .header(header::ORIGIN, "https://landing.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let allow_methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(allow_methods.contains("POST"), "got: {allow_methods}");
    assert!(allow_methods.contains("OPTIONS"), "got: {allow_methods}");
    let allow_headers = headers
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();
    assert!(allow_headers.contains("content-type"), "got: {allow_headers}");
    assert!(res.text().await?.is_empty());

    // A bare `OPTIONS` without any CORS request headers is answered the same way.
    let res = app
        .http_client
        .request(Method::OPTIONS, app.url("/api/submit-email"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn submit_email_responses_carry_cors_headers() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_blob_put(1).await;

    let res = app
        .http_client
        .post(app.url("/api/submit-email"))
        .header(header::ORIGIN, "https://landing.example")
        .json(&json!({ "email": "a@b.com" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let cors_header = |name: header::HeaderName| {
        res.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    assert_eq!(cors_header(header::ACCESS_CONTROL_ALLOW_ORIGIN).as_deref(), Some("*"));
    assert_eq!(
        cors_header(header::ACCESS_CONTROL_ALLOW_METHODS).as_deref(),
        Some("POST, OPTIONS")
    );
    assert_eq!(
        cors_header(header::ACCESS_CONTROL_ALLOW_HEADERS).as_deref(),
        Some("content-type")
    );

    Ok(())
}

#[tokio::test]
async fn submit_email_twice_creates_two_distinct_blobs() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_blob_put(2).await;

    let body = json!({ "email": "repeat@example.com" });
    let first = app.post_submit_email(&body).await?;
    let second = app.post_submit_email(&body).await?;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);

    let paths: HashSet<String> = app.uploaded_paths().await.into_iter().collect();
    assert_eq!(paths.len(), 2, "expected two distinct objects: {paths:?}");

    Ok(())
}

#[tokio::test]
async fn concurrent_identical_submissions_get_their_own_blobs() -> Result<()> {
    const SUBMISSIONS: usize = 20;

    let app = TestApp::spawn().await?;
    app.mock_blob_put(SUBMISSIONS as u64).await;

    let mut requests = JoinSet::new();
    for _ in 0..SUBMISSIONS {
        let client = app.http_client.clone();
        let url = app.url("/api/submit-email");
        requests.spawn(async move {
            client
                .post(url)
                .json(&json!({ "email": "repeat@example.com" }))
                .send()
                .await
        });
    }

    while let Some(res) = requests.join_next().await {
        assert_eq!(res??.status(), StatusCode::OK);
    }

    let paths: HashSet<String> = app.uploaded_paths().await.into_iter().collect();
    assert_eq!(
        paths.len(),
        SUBMISSIONS,
        "every accepted submission needs its own object: {paths:?}"
    );

    Ok(())
}

#[tokio::test]
async fn submit_email_without_token_returns_500_config_error() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.store_config.blob.token = None).await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.blob_server)
        .await;

    let res = app.post_submit_email(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Store is not configured");
    assert_eq!(body["code"], "STORE_NOT_CONFIGURED");

    Ok(())
}

#[tokio::test]
async fn submit_email_validates_before_checking_the_credential() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.store_config.blob.token = None).await?;

    let res = app.post_submit_email(&json!({ "email": "" })).await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn app_refuses_to_start_without_required_credential() {
    let app = TestApp::spawn_with(|config| {
        config.store_config.blob.token = None;
        config.store_config.require_credential = true;
    })
    .await;

    assert!(app.is_err(), "app started without a store credential");
}

#[tokio::test]
async fn submit_email_store_failure_returns_generic_500() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503).set_body_string("bucket quota exceeded on shard 7"))
        .expect(1)
        .mount(&app.blob_server)
        .await;

    let res = app.post_submit_email(&json!({ "email": "a@b.com" })).await?;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = res.text().await?;
    let body: Value = serde_json::from_str(&text)?;
    assert_eq!(body["error"], "Failed to store submission");
    assert_eq!(body["code"], "STORE_FAILURE");
    assert!(!text.contains("quota"), "store detail leaked: {text}");
    assert!(!text.contains(TEST_BLOB_TOKEN), "token leaked: {text}");

    Ok(())
}

#[tokio::test]
async fn error_responses_carry_the_request_id() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.post_submit_email(&json!({ "email": "" })).await?;

    let header_id = res
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    assert!(header_id.is_some(), "missing x-request-id header");

    let body: Value = res.json().await?;
    assert_eq!(body["req_id"].as_str(), header_id.as_deref());

    Ok(())
}
