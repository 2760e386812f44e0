use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FileRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: i64,
    pub storage_path: String,
    pub content_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFile<'a> {
    pub owner_id: Uuid,
    pub filename: &'a str,
    pub content_type: Option<&'a str>,
    pub size: i64,
    pub storage_path: &'a str,
    pub content_hash: &'a str,
}

#[async_trait]
pub trait FilesRepository: Send + Sync {
    async fn insert_file(&self, file: &NewFile<'_>) -> anyhow::Result<FileRow>;
    async fn get_file(&self, file_id: Uuid) -> anyhow::Result<Option<FileRow>>;
    async fn find_by_storage_path(&self, storage_path: &str) -> anyhow::Result<Option<FileRow>>;
    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<FileRow>>;
    async fn delete_file(&self, file_id: Uuid) -> anyhow::Result<bool>;
}
