use uuid::Uuid;

use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::storage_port::StoragePort;

pub struct DeleteFile<'a, F, S>
where
    F: FilesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub files: &'a F,
    pub storage: &'a S,
}

impl<'a, F, S> DeleteFile<'a, F, S>
where
    F: FilesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    /// Returns false when the file is missing or belongs to someone else.
    /// Books built from the file go with it.
    pub async fn execute(&self, owner_id: Uuid, file_id: Uuid) -> anyhow::Result<bool> {
        let Some(file) = self.files.get_file(file_id).await? else {
            return Ok(false);
        };
        if file.owner_id != owner_id {
            return Ok(false);
        }
        if !self.files.delete_file(file_id).await? {
            return Ok(false);
        }
        // The row is gone either way; a stale blob only costs disk.
        if let Err(err) = self.storage.delete_upload(&file.storage_path).await {
            tracing::warn!(error = ?err, file_id = %file_id, "delete_upload_failed");
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::book_repository::BookRepository;
    use crate::application::ports::files_repository::NewFile;
    use crate::infrastructure::memory::MemoryStore;
    use crate::infrastructure::storage::port_impl::FsStoragePort;
    use tempfile::TempDir;

    #[tokio::test]
    async fn removes_row_blob_and_books() {
        let temp = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let storage = FsStoragePort::new(temp.path());
        let owner = Uuid::new_v4();
        let stored = storage
            .store_upload(owner, Some("a.pdf"), b"%PDF")
            .await
            .unwrap();
        let file = store
            .insert_file(&NewFile {
                owner_id: owner,
                filename: &stored.filename,
                content_type: None,
                size: stored.size,
                storage_path: &stored.relative_path,
                content_hash: &stored.content_hash,
            })
            .await
            .unwrap();
        let book = store.create_book(owner, file.id, "a").await.unwrap();

        let uc = DeleteFile {
            files: &store,
            storage: &storage,
        };
        assert!(!uc.execute(Uuid::new_v4(), file.id).await.unwrap());
        assert!(uc.execute(owner, file.id).await.unwrap());
        assert!(store.get_book(book.id).await.unwrap().is_none());
        assert!(storage.read_bytes(&stored.relative_path).await.is_err());
        assert!(!uc.execute(owner, file.id).await.unwrap());
    }
}
