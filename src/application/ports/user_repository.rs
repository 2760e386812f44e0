use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub password_hash: Option<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns `None` when the email is already taken.
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<UserRow>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>>;
    /// Fields left as `None` keep their stored value.
    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        bio: Option<&str>,
    ) -> anyhow::Result<Option<UserRow>>;
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool>;
}
