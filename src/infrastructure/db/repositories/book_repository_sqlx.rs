use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::book_repository::{AppendOutcome, BookRepository};
use crate::domain::books::{Book, BookChunk, BookStatus};
use crate::infrastructure::db::PgPool;

pub struct SqlxBookRepository {
    pub pool: PgPool,
}

impl SqlxBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOK_COLUMNS: &str = "id, owner_id, file_id, title, total_chunks, processed_chunks, status, created_at, updated_at";

fn map_book(r: &PgRow) -> Book {
    let status: String = r.get("status");
    Book {
        id: r.get("id"),
        owner_id: r.get("owner_id"),
        file_id: r.get("file_id"),
        title: r.get("title"),
        total_chunks: r.get("total_chunks"),
        processed_chunks: r.get("processed_chunks"),
        status: BookStatus::parse(&status).unwrap_or(BookStatus::Failed),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl BookRepository for SqlxBookRepository {
    async fn create_book(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        title: &str,
    ) -> anyhow::Result<Book> {
        let sql = format!(
            "INSERT INTO books (owner_id, file_id, title, status) VALUES ($1, $2, $3, $4)
             RETURNING {BOOK_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(owner_id)
            .bind(file_id)
            .bind(title)
            .bind(BookStatus::Uploaded.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(map_book(&row))
    }

    async fn get_book(&self, book_id: Uuid) -> anyhow::Result<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_book))
    }

    async fn get_owned_book(&self, book_id: Uuid, owner_id: Uuid) -> anyhow::Result<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1 AND owner_id = $2");
        let row = sqlx::query(&sql)
            .bind(book_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_book))
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<Book>> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(map_book).collect())
    }

    async fn append_chunk(
        &self,
        book_id: Uuid,
        result: &serde_json::Value,
        source_url: Option<&str>,
        total_chunks: Option<i32>,
    ) -> anyhow::Result<AppendOutcome> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises concurrent appends for the same book.
        let row = sqlx::query(
            "SELECT total_chunks, processed_chunks FROM books WHERE id = $1 FOR UPDATE",
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(AppendOutcome::NotFound);
        };
        let stored_total: i32 = row.get("total_chunks");
        let processed: i32 = row.get("processed_chunks");
        let next = processed + 1;
        let total = match total_chunks {
            Some(t) if t >= next => t,
            _ => stored_total,
        };
        if total > 0 && next > total {
            return Ok(AppendOutcome::Full);
        }

        sqlx::query(
            "INSERT INTO book_chunks (book_id, seq, result, source_url) VALUES ($1, $2, $3, $4)",
        )
        .bind(book_id)
        .bind(next)
        .bind(sqlx::types::Json(result))
        .bind(source_url)
        .execute(&mut *tx)
        .await?;

        let status = if total > 0 && next >= total {
            BookStatus::Completed
        } else {
            BookStatus::Processing
        };
        let sql = format!(
            "UPDATE books SET processed_chunks = $2, total_chunks = $3, status = $4, updated_at = now()
             WHERE id = $1
             RETURNING {BOOK_COLUMNS}"
        );
        let updated = sqlx::query(&sql)
            .bind(book_id)
            .bind(next)
            .bind(total)
            .bind(status.as_str())
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(AppendOutcome::Appended(map_book(&updated)))
    }

    async fn list_chunks(&self, book_id: Uuid) -> anyhow::Result<Vec<BookChunk>> {
        let rows = sqlx::query(
            "SELECT seq, result, source_url FROM book_chunks WHERE book_id = $1 ORDER BY seq ASC",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| {
                let result: sqlx::types::Json<serde_json::Value> = r.get("result");
                BookChunk {
                    seq: r.get("seq"),
                    result: result.0,
                    source_url: r.try_get("source_url").ok().flatten(),
                }
            })
            .collect())
    }
}
