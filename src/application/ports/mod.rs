pub mod book_repository;
pub mod files_repository;
pub mod realtime_port;
pub mod storage_port;
pub mod user_repository;
