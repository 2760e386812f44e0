use uuid::Uuid;

use crate::application::ports::book_repository::{AppendOutcome, BookRepository};
use crate::application::ports::realtime_port::{RealtimePort, SocketEvent};
use crate::domain::books::{Book, BookStatus};

pub struct AppendChunk<'a, B, RT>
where
    B: BookRepository + ?Sized,
    RT: RealtimePort + ?Sized,
{
    pub books: &'a B,
    pub realtime: &'a RT,
}

#[derive(Debug, Clone)]
pub struct ChunkInput {
    pub result: serde_json::Value,
    pub source_url: Option<String>,
    pub total_chunks: Option<i32>,
}

#[derive(Debug)]
pub enum AppendChunkOutcome {
    Appended(Book),
    Full,
    NotFound,
    Invalid(&'static str),
}

/// Events a watcher should see for a book in its current state.
pub fn progress_events(book: &Book) -> Vec<SocketEvent> {
    let progress = book.progress();
    let mut events = vec![SocketEvent::ProgressUpdate {
        book_id: book.id,
        message: progress.message(),
        processed: progress.processed,
        total: progress.total,
    }];
    if progress.is_complete() {
        events.push(SocketEvent::Completed { book_id: book.id });
    }
    events
}

impl<'a, B, RT> AppendChunk<'a, B, RT>
where
    B: BookRepository + ?Sized,
    RT: RealtimePort + ?Sized,
{
    pub async fn execute(
        &self,
        owner_id: Uuid,
        book_id: Uuid,
        input: &ChunkInput,
    ) -> anyhow::Result<AppendChunkOutcome> {
        if input.total_chunks.map(|t| t < 0).unwrap_or(false) {
            return Ok(AppendChunkOutcome::Invalid("total_chunks must not be negative"));
        }
        if self.books.get_owned_book(book_id, owner_id).await?.is_none() {
            return Ok(AppendChunkOutcome::NotFound);
        }
        let outcome = self
            .books
            .append_chunk(
                book_id,
                &input.result,
                input.source_url.as_deref(),
                input.total_chunks,
            )
            .await?;
        let book = match outcome {
            AppendOutcome::Appended(book) => book,
            AppendOutcome::Full => return Ok(AppendChunkOutcome::Full),
            AppendOutcome::NotFound => return Ok(AppendChunkOutcome::NotFound),
        };

        for event in progress_events(&book) {
            self.realtime.publish(book.id, event).await?;
        }
        if book.status == BookStatus::Completed {
            tracing::info!(book_id = %book.id, chunks = book.processed_chunks, "book_completed");
        }
        Ok(AppendChunkOutcome::Appended(book))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::MemoryStore;
    use crate::infrastructure::realtime::SocketHub;
    use serde_json::json;

    fn input(total: Option<i32>) -> ChunkInput {
        ChunkInput {
            result: json!({"Events": []}),
            source_url: None,
            total_chunks: total,
        }
    }

    #[tokio::test]
    async fn emits_progress_then_completion() {
        let store = MemoryStore::new();
        let hub = SocketHub::new();
        let owner = Uuid::new_v4();
        let book = store.create_book(owner, Uuid::new_v4(), "b").await.unwrap();
        let mut rx = hub.subscribe(book.id).await;

        let uc = AppendChunk {
            books: &store,
            realtime: &hub,
        };
        uc.execute(owner, book.id, &input(Some(2))).await.unwrap();
        uc.execute(owner, book.id, &input(None)).await.unwrap();

        let mut seen = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            seen.push(ev);
        }
        assert_eq!(
            seen,
            vec![
                SocketEvent::ProgressUpdate {
                    book_id: book.id,
                    message: "Processing chunk 1/2".into(),
                    processed: 1,
                    total: 2,
                },
                SocketEvent::ProgressUpdate {
                    book_id: book.id,
                    message: "Processing chunk 2/2".into(),
                    processed: 2,
                    total: 2,
                },
                SocketEvent::Completed { book_id: book.id },
            ]
        );

        assert!(matches!(
            uc.execute(owner, book.id, &input(None)).await.unwrap(),
            AppendChunkOutcome::Full
        ));
    }

    #[tokio::test]
    async fn other_owners_and_bad_totals_are_refused() {
        let store = MemoryStore::new();
        let hub = SocketHub::new();
        let owner = Uuid::new_v4();
        let book = store.create_book(owner, Uuid::new_v4(), "b").await.unwrap();
        let uc = AppendChunk {
            books: &store,
            realtime: &hub,
        };
        assert!(matches!(
            uc.execute(Uuid::new_v4(), book.id, &input(None)).await.unwrap(),
            AppendChunkOutcome::NotFound
        ));
        assert!(matches!(
            uc.execute(owner, book.id, &input(Some(-1))).await.unwrap(),
            AppendChunkOutcome::Invalid(_)
        ));
        assert!(store.list_chunks(book.id).await.unwrap().is_empty());
    }
}
