use uuid::Uuid;

use crate::application::ports::book_repository::BookRepository;
use crate::domain::books::Book;

pub struct ListBooks<'a, B: BookRepository + ?Sized> {
    pub books: &'a B,
}

impl<'a, B: BookRepository + ?Sized> ListBooks<'a, B> {
    pub async fn execute(&self, owner_id: Uuid) -> anyhow::Result<Vec<Book>> {
        self.books.list_for_owner(owner_id).await
    }
}
