use uuid::Uuid;

use crate::application::ports::book_repository::BookRepository;
use crate::domain::books::table::EventTable;

pub struct ExportBook<'a, B: BookRepository + ?Sized> {
    pub books: &'a B,
}

pub struct ExportedBook {
    pub title: String,
    pub csv: Vec<u8>,
    pub rows: usize,
}

impl<'a, B: BookRepository + ?Sized> ExportBook<'a, B> {
    pub async fn execute(&self, owner_id: Uuid, book_id: Uuid) -> anyhow::Result<Option<ExportedBook>> {
        let Some(book) = self.books.get_owned_book(book_id, owner_id).await? else {
            return Ok(None);
        };
        let chunks = self.books.list_chunks(book_id).await?;
        let table = EventTable::from_chunks(&chunks);
        Ok(Some(ExportedBook {
            title: book.title,
            csv: table.to_csv()?,
            rows: table.rows.len(),
        }))
    }
}
