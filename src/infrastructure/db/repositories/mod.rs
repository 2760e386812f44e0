pub mod book_repository_sqlx;
pub mod files_repository_sqlx;
pub mod user_repository_sqlx;
