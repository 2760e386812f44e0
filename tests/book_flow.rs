use axum::http::{StatusCode, header};
use serde_json::json;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use bookgrid::application::ports::realtime_port::SocketEvent;

mod common;
use common::{
    body_bytes, body_json, config, config_with, get, json_request, memory_app, multipart_upload,
    register_and_login, upload,
};

#[tokio::test]
async fn auth_round_trip_and_conflicts() {
    let temp = TempDir::new().unwrap();
    let router = memory_app(config(&temp)).into_router();
    let token = register_and_login(&router, "ann@example.com").await;

    let resp = router
        .clone()
        .oneshot(get("/api/auth/me", Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["email"], "ann@example.com");

    let dup = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({"email": "ANN@example.com", "name": "", "password": "x"}),
        ))
        .await
        .unwrap();
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    let bad = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "ann@example.com", "password": "wrong"}),
        ))
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);

    let out = router
        .oneshot(json_request("POST", "/api/auth/logout", None, json!({})))
        .await
        .unwrap();
    assert_eq!(out.status(), StatusCode::NO_CONTENT);
    assert!(
        out.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .contains("Max-Age=0")
    );
}

#[tokio::test]
async fn profile_update_and_password_change() {
    let temp = TempDir::new().unwrap();
    let router = memory_app(config(&temp)).into_router();
    let token = register_and_login(&router, "bo@example.com").await;

    let resp = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/profile",
            Some(&token),
            json!({"bio": "Archivist"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["name"], "Reader");
    assert_eq!(body["bio"], "Archivist");

    let blank = router
        .clone()
        .oneshot(json_request("PUT", "/api/profile", Some(&token), json!({"name": "  "})))
        .await
        .unwrap();
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);

    let wrong = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/profile/password",
            Some(&token),
            json!({"current_password": "nope", "new_password": "a-long-new-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);

    let ok = router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/profile/password",
            Some(&token),
            json!({"current_password": "correct-horse", "new_password": "a-long-new-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::NO_CONTENT);

    let relogin = router
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "bo@example.com", "password": "a-long-new-password"}),
        ))
        .await
        .unwrap();
    assert_eq!(relogin.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_rejects_non_pdfs_and_missing_fields() {
    let temp = TempDir::new().unwrap();
    let router = memory_app(config(&temp)).into_router();
    let token = register_and_login(&router, "cy@example.com").await;

    let png = router
        .clone()
        .oneshot(multipart_upload(&token, "pdf", "scan.png", "image/png", b"\x89PNG"))
        .await
        .unwrap();
    assert_eq!(png.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let fake = router
        .clone()
        .oneshot(multipart_upload(
            &token,
            "pdf",
            "fake.pdf",
            "application/pdf",
            b"not really a pdf",
        ))
        .await
        .unwrap();
    assert_eq!(fake.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let missing = router
        .oneshot(multipart_upload(&token, "file", "a.pdf", "application/pdf", b"%PDF"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_uploads_are_rejected_with_413() {
    let temp = TempDir::new().unwrap();
    let app = memory_app(config_with(&temp, &[("UPLOAD_MAX_BYTES", "16")]));
    // JSON bodies are capped too, so mint the token directly.
    let token = app.context().tokens().issue(Uuid::new_v4()).unwrap();
    let router = app.into_router();

    let mut pdf = b"%PDF-1.4\n".to_vec();
    pdf.extend_from_slice(&[b'x'; 256]);
    let resp = router
        .oneshot(multipart_upload(&token, "pdf", "big.pdf", "application/pdf", &pdf))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn book_processing_flow_from_upload_to_export() {
    let temp = TempDir::new().unwrap();
    let app = memory_app(config(&temp));
    let hub = app.context().socket().hub().clone();
    let router = app.into_router();
    let token = register_and_login(&router, "dee@example.com").await;

    let uploaded = upload(&router, &token).await;
    let book_id: Uuid = uploaded["book_id"].as_str().unwrap().parse().unwrap();
    assert!(uploaded["filename"].as_str().unwrap().ends_with(".pdf"));
    let mut watcher = hub.subscribe(book_id).await;

    let resp = router
        .clone()
        .oneshot(get("/api/books", Some(&token)))
        .await
        .unwrap();
    let books = body_json(resp).await;
    assert_eq!(books[0]["title"], "Parish Records");
    assert_eq!(books[0]["status"], "uploaded");

    let chunks = [
        json!({"result": {"Events": [{"Date": "1901", "Name": "Ann"}]}, "source_url": "p1.png", "total_chunks": 2}),
        json!({"result": "{\"Events\":[{\"Name\":\"Bo\",\"Place\":\"York\"}]}", "source_url": "p2.png"}),
    ];
    for chunk in chunks {
        let resp = router
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/excel-data/{}/chunks", book_id),
                Some(&token),
                chunk,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert_eq!(
        watcher.recv().await.unwrap(),
        SocketEvent::ProgressUpdate {
            book_id,
            message: "Processing chunk 1/2".into(),
            processed: 1,
            total: 2,
        }
    );
    assert!(matches!(
        watcher.recv().await.unwrap(),
        SocketEvent::ProgressUpdate { processed: 2, .. }
    ));
    assert_eq!(
        watcher.recv().await.unwrap(),
        SocketEvent::Completed { book_id }
    );

    let extra = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/excel-data/{}/chunks", book_id),
            Some(&token),
            json!({"result": {}}),
        ))
        .await
        .unwrap();
    assert_eq!(extra.status(), StatusCode::CONFLICT);

    let resp = router
        .clone()
        .oneshot(get(&format!("/api/excel-data/{}", book_id), Some(&token)))
        .await
        .unwrap();
    let data = body_json(resp).await;
    assert_eq!(data["status"], "completed");
    assert_eq!(data["data"][0]["Source URL"], "p1.png");
    assert_eq!(
        data["data"][1]["Result"],
        "{\"Events\":[{\"Name\":\"Bo\",\"Place\":\"York\"}]}"
    );

    let resp = router
        .clone()
        .oneshot(get(&format!("/api/export-excel?bookId={}", book_id), Some(&token)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("Parish_Records.csv")
    );
    let csv = String::from_utf8(body_bytes(resp).await).unwrap();
    assert_eq!(
        csv,
        "SrNo,Date,Name,Place,SourceURL\n1,1901,Ann,,p1.png\n2,,Bo,York,p2.png\n"
    );
}

#[tokio::test]
async fn other_users_cannot_see_or_touch_a_book() {
    let temp = TempDir::new().unwrap();
    let router = memory_app(config(&temp)).into_router();
    let owner = register_and_login(&router, "eve@example.com").await;
    let other = register_and_login(&router, "fay@example.com").await;
    let uploaded = upload(&router, &owner).await;
    let book_id = uploaded["book_id"].as_str().unwrap().to_string();

    for uri in [
        format!("/api/excel-data/{}", book_id),
        format!("/api/export-excel?bookId={}", book_id),
    ] {
        let resp = router.clone().oneshot(get(&uri, Some(&other))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
    let resp = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/excel-data/{}/chunks", book_id),
            Some(&other),
            json!({"result": {}}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let url = uploaded["url"].as_str().unwrap();
    let resp = router
        .clone()
        .oneshot(get(&format!("{}?token={}", url, other), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn files_can_be_served_listed_and_deleted() {
    let temp = TempDir::new().unwrap();
    let router = memory_app(config(&temp)).into_router();
    let token = register_and_login(&router, "gus@example.com").await;
    let uploaded = upload(&router, &token).await;
    let url = uploaded["url"].as_str().unwrap().to_string();
    let file_id = uploaded["file_id"].as_str().unwrap().to_string();

    let resp = router
        .clone()
        .oneshot(get(&format!("{}?token={}", url, token), None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(resp.headers()["x-content-type-options"], "nosniff");
    assert_eq!(body_bytes(resp).await, b"%PDF-1.4 fake book");

    let traversal = router
        .clone()
        .oneshot(get(&format!("/api/uploads/../secret?token={}", token), None))
        .await
        .unwrap();
    assert_eq!(traversal.status(), StatusCode::NOT_FOUND);

    let resp = router
        .clone()
        .oneshot(get("/api/files", Some(&token)))
        .await
        .unwrap();
    let files = body_json(resp).await;
    assert_eq!(files.as_array().unwrap().len(), 1);
    assert_eq!(files[0]["url"], url.as_str());

    let del = router
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method("DELETE")
                .uri(format!("/api/files/{}", file_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(del.status(), StatusCode::NO_CONTENT);

    let resp = router
        .clone()
        .oneshot(get("/api/books", Some(&token)))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!([]));

    let gone = router
        .oneshot(get(&format!("{}?token={}", url, token), None))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}
