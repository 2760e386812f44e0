pub mod password;
pub mod token;

pub use password::Argon2Hasher;
pub use token::{Claims, TokenCodec, TokenError};
