use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::application::ports::storage_port::{StoragePort, StoredUpload};
use crate::infrastructure::storage::{
    content_hash, normalize_relative, relative_from_uploads, sanitize_filename,
};

/// Uploads laid out as `<uploads_root>/<owner_id>/<name>_<timestamp>.<ext>`.
pub struct FsStoragePort {
    pub uploads_root: PathBuf,
}

impl FsStoragePort {
    pub fn new(uploads_root: impl Into<PathBuf>) -> Self {
        Self {
            uploads_root: uploads_root.into(),
        }
    }
}

fn split_name(name: &str) -> (String, String) {
    let p = Path::new(name);
    let stem = p
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("file")
        .to_string();
    let ext = p
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string();
    (stem, ext)
}

fn join_name(stem: &str, ext: &str) -> String {
    if ext.is_empty() {
        stem.to_string()
    } else {
        format!("{}.{}", stem, ext)
    }
}

#[async_trait::async_trait]
impl StoragePort for FsStoragePort {
    async fn store_upload(
        &self,
        owner_id: Uuid,
        original_filename: Option<&str>,
        bytes: &[u8],
    ) -> anyhow::Result<StoredUpload> {
        use tokio::fs;
        use tokio::io::AsyncWriteExt;

        let owner_dir = self.uploads_root.join(owner_id.to_string());
        fs::create_dir_all(&owner_dir).await?;

        let safe = sanitize_filename(original_filename.unwrap_or("upload.pdf"));
        let (stem, ext) = split_name(&safe);
        let ts = chrono::Utc::now().format("%Y%m%d-%H%M%S");
        let base_stem = format!("{}_{}", stem, ts);

        // create_new makes the name claim atomic; a taken name moves on to
        // the next suffix.
        let mut counter = 0;
        let (filename, candidate) = loop {
            let filename = if counter == 0 {
                join_name(&base_stem, &ext)
            } else {
                join_name(&format!("{}-{}", base_stem, counter), &ext)
            };
            let candidate = owner_dir.join(&filename);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    break (filename, candidate);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => counter += 1,
                Err(e) => return Err(e.into()),
            }
        };

        let relative = relative_from_uploads(self.uploads_root.as_path(), &candidate);

        Ok(StoredUpload {
            filename,
            relative_path: relative,
            size: bytes.len() as i64,
            content_hash: content_hash(bytes),
        })
    }

    async fn resolve_upload_path(&self, rel_path: &str) -> anyhow::Result<PathBuf> {
        let relative = normalize_relative(rel_path)?;
        let full_path = self.uploads_root.join(relative);
        if !full_path.starts_with(&self.uploads_root) {
            anyhow::bail!("forbidden");
        }
        if !tokio::fs::try_exists(&full_path).await.unwrap_or(false) {
            anyhow::bail!("not_found");
        }
        Ok(full_path)
    }

    async fn read_bytes(&self, rel_path: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.resolve_upload_path(rel_path).await?;
        Ok(tokio::fs::read(path).await?)
    }

    async fn delete_upload(&self, rel_path: &str) -> anyhow::Result<()> {
        match self.resolve_upload_path(rel_path).await {
            Ok(path) => {
                tokio::fs::remove_file(path).await?;
                Ok(())
            }
            // Already gone from disk; metadata cleanup may proceed.
            Err(e) if e.to_string() == "not_found" => Ok(()),
            Err(e) => Err(e),
        }
    }
}
