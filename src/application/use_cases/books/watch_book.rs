use uuid::Uuid;

use crate::application::ports::book_repository::BookRepository;
use crate::application::ports::realtime_port::SocketEvent;
use crate::application::use_cases::books::append_chunk::progress_events;

pub struct WatchBook<'a, B: BookRepository + ?Sized> {
    pub books: &'a B,
}

impl<'a, B: BookRepository + ?Sized> WatchBook<'a, B> {
    /// Snapshot sent to a socket right after it joins the book's room.
    /// `None` when the book does not exist.
    pub async fn execute(&self, book_id: Uuid) -> anyhow::Result<Option<Vec<SocketEvent>>> {
        Ok(self
            .books
            .get_book(book_id)
            .await?
            .map(|book| progress_events(&book)))
    }
}
