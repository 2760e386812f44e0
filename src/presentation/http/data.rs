use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::books::append_chunk::{
    AppendChunk, AppendChunkOutcome, ChunkInput,
};
use crate::application::use_cases::books::export_book::ExportBook;
use crate::application::use_cases::books::get_book_data::GetBookData;
use crate::application::use_cases::books::list_books::ListBooks;
use crate::bootstrap::app_context::AppContext;
use crate::domain::books::{Book, BookChunk};
use crate::presentation::http::auth::{Bearer, validate_bearer};

#[derive(Debug, Serialize, ToSchema)]
pub struct BookResponse {
    pub id: Uuid,
    pub file_id: Uuid,
    pub title: String,
    pub status: String,
    pub processed_chunks: i32,
    pub total_chunks: i32,
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Book> for BookResponse {
    fn from(b: Book) -> Self {
        let message = b.progress().message();
        Self {
            id: b.id,
            file_id: b.file_id,
            title: b.title,
            status: b.status.as_str().to_string(),
            processed_chunks: b.processed_chunks,
            total_chunks: b.total_chunks,
            message,
            created_at: b.created_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AppendChunkRequest {
    #[schema(value_type = Object)]
    pub result: serde_json::Value,
    pub source_url: Option<String>,
    pub total_chunks: Option<i32>,
}

/// Row shape the spreadsheet frontend reads.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChunkRow {
    #[serde(rename = "Result")]
    pub result: String,
    #[serde(rename = "Source URL")]
    pub source_url: Option<String>,
}

impl From<BookChunk> for ChunkRow {
    fn from(c: BookChunk) -> Self {
        let result = match c.result {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Self {
            result,
            source_url: c.source_url,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookDataResponse {
    pub book_id: Uuid,
    pub status: String,
    pub data: Vec<ChunkRow>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(rename = "bookId")]
    pub book_id: Uuid,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/books", get(list_books))
        .route("/excel-data/:book_id", get(get_book_data))
        .route("/excel-data/:book_id/chunks", post(append_chunk))
        .route("/export-excel", get(export_excel))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/books", tag = "Books", responses((status = 200, body = [BookResponse])))]
pub async fn list_books(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<Vec<BookResponse>>, StatusCode> {
    let user_id = validate_bearer(&ctx, bearer)?;
    let books = ctx.book_repo();
    let uc = ListBooks {
        books: books.as_ref(),
    };
    let items = uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(items.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/excel-data/{book_id}/chunks",
    tag = "Books",
    params(("book_id" = Uuid, Path, description = "Book ID")),
    request_body = AppendChunkRequest,
    responses(
        (status = 200, body = BookResponse),
        (status = 404, description = "Unknown book"),
        (status = 409, description = "Book already has all its chunks")
    )
)]
pub async fn append_chunk(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(book_id): Path<Uuid>,
    Json(req): Json<AppendChunkRequest>,
) -> Result<Json<BookResponse>, StatusCode> {
    let user_id = validate_bearer(&ctx, bearer)?;
    let books = ctx.book_repo();
    let realtime = ctx.realtime();
    let uc = AppendChunk {
        books: books.as_ref(),
        realtime: realtime.as_ref(),
    };
    let input = ChunkInput {
        result: req.result,
        source_url: req.source_url,
        total_chunks: req.total_chunks,
    };
    let outcome = uc.execute(user_id, book_id, &input).await.map_err(|e| {
        tracing::error!(error = ?e, %book_id, "append_chunk_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    match outcome {
        AppendChunkOutcome::Appended(book) => Ok(Json(book.into())),
        AppendChunkOutcome::Full => Err(StatusCode::CONFLICT),
        AppendChunkOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        AppendChunkOutcome::Invalid(_) => Err(StatusCode::BAD_REQUEST),
    }
}

#[utoipa::path(
    get,
    path = "/api/excel-data/{book_id}",
    tag = "Books",
    params(("book_id" = Uuid, Path, description = "Book ID")),
    responses((status = 200, body = BookDataResponse), (status = 404))
)]
pub async fn get_book_data(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(book_id): Path<Uuid>,
) -> Result<Json<BookDataResponse>, StatusCode> {
    let user_id = validate_bearer(&ctx, bearer)?;
    let books = ctx.book_repo();
    let uc = GetBookData {
        books: books.as_ref(),
    };
    let (book, chunks) = uc
        .execute(user_id, book_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(BookDataResponse {
        book_id: book.id,
        status: book.status.as_str().to_string(),
        data: chunks.into_iter().map(Into::into).collect(),
    }))
}

fn attachment_name(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "book.csv".to_string()
    } else {
        format!("{}.csv", stem)
    }
}

#[utoipa::path(
    get,
    path = "/api/export-excel",
    tag = "Books",
    params(("bookId" = Uuid, Query, description = "Book ID")),
    responses((status = 200, description = "CSV export", body = String, content_type = "text/csv"), (status = 404))
)]
pub async fn export_excel(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Query(q): Query<ExportQuery>,
) -> Result<Response, StatusCode> {
    let user_id = validate_bearer(&ctx, bearer)?;
    let books = ctx.book_repo();
    let uc = ExportBook {
        books: books.as_ref(),
    };
    let export = uc
        .execute(user_id, q.book_id)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, book_id = %q.book_id, "export_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;
    tracing::debug!(book_id = %q.book_id, rows = export.rows, "book_exported");

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    let disposition = format!("attachment; filename=\"{}\"", attachment_name(&export.title));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
    );
    Ok((headers, export.csv).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chunk_rows_use_frontend_keys() {
        let row: ChunkRow = BookChunk {
            seq: 1,
            result: json!({"Events": []}),
            source_url: Some("p.png".into()),
        }
        .into();
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v, json!({"Result": "{\"Events\":[]}", "Source URL": "p.png"}));
    }

    #[test]
    fn attachment_names_are_header_safe() {
        assert_eq!(attachment_name("Parish Records 1901"), "Parish_Records_1901.csv");
        assert_eq!(attachment_name("\"; evil"), "evil.csv");
        assert_eq!(attachment_name("***"), "book.csv");
    }
}
