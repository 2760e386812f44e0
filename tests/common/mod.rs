#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use bookgrid::bootstrap::app::{App, build_app_with};
use bookgrid::bootstrap::app_context::AppServices;
use bookgrid::bootstrap::config::Config;
use bookgrid::infrastructure::memory::MemoryStore;
use bookgrid::infrastructure::storage::port_impl::FsStoragePort;

pub const TRUSTED: &str = "http://app.test:5173";
pub const BOUNDARY: &str = "bookgrid-test-boundary";

pub fn config_with(uploads: &TempDir, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("FRONTEND_URL".to_string(), TRUSTED.to_string()),
        ("JWT_SECRET".to_string(), "integration-test-secret".to_string()),
        (
            "UPLOADS_DIR".to_string(),
            uploads.path().to_string_lossy().into_owned(),
        ),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_lookup(move |k| vars.get(k).cloned()).expect("test config")
}

pub fn config(uploads: &TempDir) -> Config {
    config_with(uploads, &[])
}

/// Application wired to in-memory repositories; the database handle stays
/// lazy and is never contacted.
pub fn memory_app(cfg: Config) -> App {
    let store = MemoryStore::new();
    build_app_with(cfg, move |cfg, ext| {
        AppServices::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store),
            Arc::new(FsStoragePort::new(&cfg.uploads_dir)),
            Arc::new(ext.socket.hub().clone()),
        )
    })
    .expect("memory app builds")
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn multipart_upload(
    token: &str,
    field: &str,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            field, filename, content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload-pdf")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(resp: Response) -> Vec<u8> {
    resp.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(resp: Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("json body")
}

pub async fn register_and_login(router: &Router, email: &str) -> String {
    let resp = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"email": email, "name": "Reader", "password": "correct-horse"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": email, "password": "correct-horse"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with("access_token="));
    assert!(cookie.contains("HttpOnly"));
    let body = body_json(resp).await;
    body["access_token"].as_str().unwrap().to_string()
}

pub async fn upload(router: &Router, token: &str) -> Value {
    let resp = router
        .clone()
        .oneshot(multipart_upload(
            token,
            "pdf",
            "Parish Records.pdf",
            "application/pdf",
            b"%PDF-1.4 fake book",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}
