use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::books::{Book, BookChunk};

#[derive(Debug, Clone)]
pub enum AppendOutcome {
    Appended(Book),
    /// The book already holds `total_chunks` results.
    Full,
    NotFound,
}

#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn create_book(&self, owner_id: Uuid, file_id: Uuid, title: &str)
    -> anyhow::Result<Book>;
    async fn get_book(&self, book_id: Uuid) -> anyhow::Result<Option<Book>>;
    async fn get_owned_book(&self, book_id: Uuid, owner_id: Uuid) -> anyhow::Result<Option<Book>>;
    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<Book>>;
    /// Appends the next chunk in sequence. A `total_chunks` hint replaces the
    /// stored total when it is at least the new processed count.
    async fn append_chunk(
        &self,
        book_id: Uuid,
        result: &serde_json::Value,
        source_url: Option<&str>,
        total_chunks: Option<i32>,
    ) -> anyhow::Result<AppendOutcome>;
    async fn list_chunks(&self, book_id: Uuid) -> anyhow::Result<Vec<BookChunk>>;
}
