pub mod append_chunk;
pub mod export_book;
pub mod get_book_data;
pub mod list_books;
pub mod upload_book;
pub mod watch_book;
