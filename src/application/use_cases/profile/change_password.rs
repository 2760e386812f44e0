use uuid::Uuid;

use crate::application::ports::user_repository::UserRepository;
use crate::infrastructure::crypto::Argon2Hasher;

pub const MIN_PASSWORD_CHARS: usize = 8;

pub struct ChangePassword<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    pub hasher: &'a Argon2Hasher,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ChangePasswordOutcome {
    Changed,
    WrongPassword,
    TooShort,
    NotFound,
}

impl<'a, R: UserRepository + ?Sized> ChangePassword<'a, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> anyhow::Result<ChangePasswordOutcome> {
        if new_password.chars().count() < MIN_PASSWORD_CHARS {
            return Ok(ChangePasswordOutcome::TooShort);
        }
        let Some(user) = self.repo.find_by_id(user_id).await? else {
            return Ok(ChangePasswordOutcome::NotFound);
        };
        let stored = user.password_hash.unwrap_or_default();
        if !self.hasher.verify(current_password, &stored) {
            return Ok(ChangePasswordOutcome::WrongPassword);
        }
        let hash = self.hasher.hash(new_password)?;
        if self.repo.update_password_hash(user_id, &hash).await? {
            Ok(ChangePasswordOutcome::Changed)
        } else {
            Ok(ChangePasswordOutcome::NotFound)
        }
    }
}
