use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::infrastructure::crypto::Argon2Hasher;

use super::normalize_email;

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    pub hasher: &'a Argon2Hasher,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug)]
pub enum RegisterOutcome {
    Created(UserRow),
    EmailTaken,
    Invalid(&'static str),
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, req: &RegisterRequest) -> anyhow::Result<RegisterOutcome> {
        let email = normalize_email(&req.email);
        if email.is_empty() || !email.contains('@') {
            return Ok(RegisterOutcome::Invalid("a valid email is required"));
        }
        if req.password.is_empty() {
            return Ok(RegisterOutcome::Invalid("password is required"));
        }
        let name = match req.name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_string(),
            n => n.to_string(),
        };
        let hash = self.hasher.hash(&req.password)?;
        match self.repo.create_user(&email, &name, &hash).await? {
            Some(user) => Ok(RegisterOutcome::Created(user)),
            None => Ok(RegisterOutcome::EmailTaken),
        }
    }
}
