use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::books::upload_book::{UploadBook, is_pdf};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{Bearer, validate_bearer};

pub const PDF_FIELD: &str = "pdf";

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadPdfResponse {
    pub book_id: Uuid,
    pub file_id: Uuid,
    pub filename: String,
    pub url: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadPdfMultipart {
    /// PDF to process
    #[schema(value_type = String, format = Binary)]
    pdf: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/upload-pdf", post(upload_pdf))
        .with_state(ctx)
}

fn looks_like_pdf_part(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    let by_type = content_type
        .map(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    let by_name = file_name
        .map(|n| n.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    by_type || by_name
}

/// POST /api/upload-pdf (multipart/form-data, field `pdf`)
#[utoipa::path(
    post,
    path = "/api/upload-pdf",
    tag = "Books",
    request_body(content = UploadPdfMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Book created", body = UploadPdfResponse),
        (status = 400, description = "Missing pdf field"),
        (status = 413, description = "File too large"),
        (status = 415, description = "Not a PDF")
    )
)]
pub async fn upload_pdf(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadPdfResponse>), StatusCode> {
    let user_id = validate_bearer(&ctx, bearer)?;

    let mut upload: Option<(Vec<u8>, Option<String>, Option<String>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        // Body limit violations surface as multipart errors.
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            StatusCode::PAYLOAD_TOO_LARGE
        } else {
            StatusCode::BAD_REQUEST
        }
    })? {
        if field.name() != Some(PDF_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());
        if !looks_like_pdf_part(file_name.as_deref(), content_type.as_deref()) {
            return Err(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        }
        let data = field.bytes().await.map_err(|e| e.status())?;
        if data.len() > ctx.cfg.upload_max_bytes {
            return Err(StatusCode::PAYLOAD_TOO_LARGE);
        }
        upload = Some((data.to_vec(), file_name, content_type));
    }

    let (bytes, file_name, content_type) = upload.ok_or(StatusCode::BAD_REQUEST)?;
    if !is_pdf(&bytes) {
        return Err(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    let files = ctx.files_repo();
    let books = ctx.book_repo();
    let storage = ctx.storage();
    let realtime = ctx.realtime();
    let uc = UploadBook {
        files: files.as_ref(),
        books: books.as_ref(),
        storage: storage.as_ref(),
        realtime: realtime.as_ref(),
        public_base_url: ctx.cfg.public_base_url.clone(),
    };
    let out = uc
        .execute(user_id, bytes, file_name, content_type)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((
        StatusCode::CREATED,
        Json(UploadPdfResponse {
            book_id: out.book.id,
            file_id: out.file.id,
            filename: out.file.filename,
            url: out.url,
        }),
    ))
}
