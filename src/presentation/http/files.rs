use axum::{
    Json, Router,
    extract::{Path as AxumPath, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::ports::files_repository::FileRow;
use crate::application::use_cases::books::upload_book::upload_url;
use crate::application::use_cases::files::delete_file::DeleteFile;
use crate::application::use_cases::files::list_files::ListFiles;
use crate::application::use_cases::files::read_upload::ReadUpload;
use crate::bootstrap::app_context::AppContext;
use crate::infrastructure::storage::normalize_relative;
use crate::presentation::http::auth::{self, Bearer, validate_bearer};

#[derive(Debug, Serialize, ToSchema)]
pub struct FileResponse {
    pub id: Uuid,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl FileResponse {
    fn from_row(f: FileRow, public_base_url: Option<&str>) -> Self {
        Self {
            url: upload_url(public_base_url, &f.storage_path),
            id: f.id,
            filename: f.filename,
            content_type: f.content_type,
            size: f.size,
            created_at: f.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/uploads/*path", get(serve_upload))
        .route("/files", get(list_files))
        .route("/files/:id", delete(delete_file))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/files", tag = "Files", responses((status = 200, body = [FileResponse])))]
pub async fn list_files(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<Vec<FileResponse>>, StatusCode> {
    let user_id = validate_bearer(&ctx, bearer)?;
    let files = ctx.files_repo();
    let uc = ListFiles {
        files: files.as_ref(),
    };
    let rows = uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let base = ctx.cfg.public_base_url.as_deref();
    Ok(Json(
        rows.into_iter()
            .map(|f| FileResponse::from_row(f, base))
            .collect(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "Files",
    params(("id" = Uuid, Path, description = "File ID")),
    responses((status = 204), (status = 404))
)]
pub async fn delete_file(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    AxumPath(id): AxumPath<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let user_id = validate_bearer(&ctx, bearer)?;
    let files = ctx.files_repo();
    let storage = ctx.storage();
    let uc = DeleteFile {
        files: files.as_ref(),
        storage: storage.as_ref(),
    };
    let deleted = uc.execute(user_id, id).await.map_err(|e| {
        tracing::error!(error = ?e, file_id = %id, "delete_file_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// Serve an uploaded file to its owner. The token may come from the `token`
/// query parameter so plain `<a href>` and `<embed>` links work.
#[utoipa::path(
    get,
    path = "/api/uploads/{path}",
    tag = "Files",
    params(
        ("path" = String, Path, description = "Path under the uploads root"),
        ("token" = Option<String>, Query, description = "Access token")
    ),
    responses((status = 200, description = "OK", body = Vec<u8>, content_type = "application/octet-stream"))
)]
pub async fn serve_upload(
    State(ctx): State<AppContext>,
    AxumPath(path): AxumPath<String>,
    Query(q): Query<TokenQuery>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let token = q
        .token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| auth::token_from_headers(&headers))
        .ok_or(StatusCode::UNAUTHORIZED)?;
    let user_id = auth::validate_token_str(&ctx, &token)?;

    let rel = normalize_relative(&path).map_err(|_| StatusCode::NOT_FOUND)?;
    let rel = rel.to_string_lossy().replace('\\', "/");

    let files = ctx.files_repo();
    let storage = ctx.storage();
    let uc = ReadUpload {
        files: files.as_ref(),
        storage: storage.as_ref(),
    };
    let upload = uc
        .execute(user_id, &rel)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let content_type = upload
        .file
        .content_type
        .clone()
        .unwrap_or_else(|| {
            mime_guess::from_path(&upload.file.storage_path)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        axum::http::header::HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    Ok((headers, upload.bytes).into_response())
}
