pub mod auth;
pub mod data;
pub mod files;
pub mod health;
pub mod index;
pub mod openapi;
pub mod profile;
pub mod upload;
