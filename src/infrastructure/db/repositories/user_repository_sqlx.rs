use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::infrastructure::db::PgPool;

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_user(r: &PgRow, with_hash: bool) -> UserRow {
    UserRow {
        id: r.get("id"),
        email: r.get("email"),
        name: r.get("name"),
        bio: r.try_get("bio").ok().flatten(),
        password_hash: if with_hash {
            r.try_get("password_hash").ok()
        } else {
            None
        },
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"INSERT INTO users (email, name, password_hash) VALUES ($1, $2, $3)
               ON CONFLICT (email) DO NOTHING
               RETURNING id, email, name, bio"#,
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_user(&r, false)))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"SELECT id, email, name, bio, password_hash FROM users WHERE email = $1"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_user(&r, true)))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(r#"SELECT id, email, name, bio, password_hash FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| map_user(&r, true)))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        bio: Option<&str>,
    ) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"UPDATE users
               SET name = COALESCE($2, name), bio = COALESCE($3, bio), updated_at = now()
               WHERE id = $1
               RETURNING id, email, name, bio"#,
        )
        .bind(id)
        .bind(name)
        .bind(bio)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| map_user(&r, false)))
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let res =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;
        Ok(res.rows_affected() > 0)
    }
}
