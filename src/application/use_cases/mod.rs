pub mod auth;
pub mod books;
pub mod files;
pub mod profile;
