use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::files_repository::{FileRow, FilesRepository, NewFile};
use crate::infrastructure::db::PgPool;

pub struct SqlxFilesRepository {
    pub pool: PgPool,
}

impl SqlxFilesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const FILE_COLUMNS: &str =
    "id, owner_id, filename, content_type, size, storage_path, content_hash, created_at";

fn map_file(r: &PgRow) -> FileRow {
    FileRow {
        id: r.get("id"),
        owner_id: r.get("owner_id"),
        filename: r.get("filename"),
        content_type: r.try_get("content_type").ok().flatten(),
        size: r.get("size"),
        storage_path: r.get("storage_path"),
        content_hash: r.get("content_hash"),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl FilesRepository for SqlxFilesRepository {
    async fn insert_file(&self, file: &NewFile<'_>) -> anyhow::Result<FileRow> {
        let sql = format!(
            "INSERT INTO files (owner_id, filename, content_type, size, storage_path, content_hash)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {FILE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(file.owner_id)
            .bind(file.filename)
            .bind(file.content_type)
            .bind(file.size)
            .bind(file.storage_path)
            .bind(file.content_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(map_file(&row))
    }

    async fn get_file(&self, file_id: Uuid) -> anyhow::Result<Option<FileRow>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_file))
    }

    async fn find_by_storage_path(&self, storage_path: &str) -> anyhow::Result<Option<FileRow>> {
        let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE storage_path = $1");
        let row = sqlx::query(&sql)
            .bind(storage_path)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_file))
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<FileRow>> {
        let sql = format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(map_file).collect())
    }

    async fn delete_file(&self, file_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
