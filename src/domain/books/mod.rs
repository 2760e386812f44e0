pub mod book;
pub mod table;

pub use book::*;
