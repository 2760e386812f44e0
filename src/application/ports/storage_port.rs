use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub filename: String,
    pub relative_path: String,
    pub size: i64,
    pub content_hash: String,
}

#[async_trait]
pub trait StoragePort: Send + Sync {
    async fn store_upload(
        &self,
        owner_id: Uuid,
        original_filename: Option<&str>,
        bytes: &[u8],
    ) -> anyhow::Result<StoredUpload>;
    /// Maps a path relative to the uploads root onto disk, rejecting traversal.
    async fn resolve_upload_path(&self, rel_path: &str) -> anyhow::Result<PathBuf>;
    async fn read_bytes(&self, rel_path: &str) -> anyhow::Result<Vec<u8>>;
    async fn delete_upload(&self, rel_path: &str) -> anyhow::Result<()>;
}
