use uuid::Uuid;

use crate::application::ports::book_repository::BookRepository;
use crate::domain::books::{Book, BookChunk};

pub struct GetBookData<'a, B: BookRepository + ?Sized> {
    pub books: &'a B,
}

impl<'a, B: BookRepository + ?Sized> GetBookData<'a, B> {
    pub async fn execute(
        &self,
        owner_id: Uuid,
        book_id: Uuid,
    ) -> anyhow::Result<Option<(Book, Vec<BookChunk>)>> {
        let Some(book) = self.books.get_owned_book(book_id, owner_id).await? else {
            return Ok(None);
        };
        let chunks = self.books.list_chunks(book_id).await?;
        Ok(Some((book, chunks)))
    }
}
