pub mod app;
pub mod app_context;
pub mod config;
pub mod error;
pub mod extensions;
