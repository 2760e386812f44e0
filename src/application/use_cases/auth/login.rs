use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::infrastructure::crypto::Argon2Hasher;

use super::normalize_email;

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    pub hasher: &'a Argon2Hasher,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    /// `None` for unknown email and wrong password alike.
    pub async fn execute(&self, req: &LoginRequest) -> anyhow::Result<Option<UserRow>> {
        let row = match self.repo.find_by_email(&normalize_email(&req.email)).await? {
            Some(r) => r,
            None => return Ok(None),
        };
        let hash = row.password_hash.clone().unwrap_or_default();
        if self.hasher.verify(&req.password, &hash) {
            Ok(Some(UserRow {
                password_hash: None,
                ..row
            }))
        } else {
            Ok(None)
        }
    }
}
