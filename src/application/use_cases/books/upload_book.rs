use uuid::Uuid;

use crate::application::ports::book_repository::BookRepository;
use crate::application::ports::files_repository::{FileRow, FilesRepository, NewFile};
use crate::application::ports::realtime_port::{RealtimePort, SocketEvent};
use crate::application::ports::storage_port::{StoragePort, StoredUpload};
use crate::domain::books::Book;

pub struct UploadBook<'a, F, B, S, RT>
where
    F: FilesRepository + ?Sized,
    B: BookRepository + ?Sized,
    S: StoragePort + ?Sized,
    RT: RealtimePort + ?Sized,
{
    pub files: &'a F,
    pub books: &'a B,
    pub storage: &'a S,
    pub realtime: &'a RT,
    pub public_base_url: Option<String>,
}

pub struct UploadedBook {
    pub book: Book,
    pub file: FileRow,
    pub url: String,
}

pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

pub fn upload_url(public_base_url: Option<&str>, relative: &str) -> String {
    let relative = relative.trim_start_matches('/');
    match public_base_url {
        Some(base) => format!("{}/api/uploads/{}", base.trim_end_matches('/'), relative),
        None => format!("/api/uploads/{}", relative),
    }
}

fn title_from_filename(name: Option<&str>) -> String {
    name.and_then(|n| std::path::Path::new(n).file_stem())
        .and_then(|s| s.to_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

impl<'a, F, B, S, RT> UploadBook<'a, F, B, S, RT>
where
    F: FilesRepository + ?Sized,
    B: BookRepository + ?Sized,
    S: StoragePort + ?Sized,
    RT: RealtimePort + ?Sized,
{
    async fn record(
        &self,
        owner_id: Uuid,
        stored: &StoredUpload,
        orig_filename: Option<&str>,
        content_type: Option<&str>,
    ) -> anyhow::Result<(FileRow, Book)> {
        let file = self
            .files
            .insert_file(&NewFile {
                owner_id,
                filename: &stored.filename,
                content_type: content_type.or(Some("application/pdf")),
                size: stored.size,
                storage_path: &stored.relative_path,
                content_hash: &stored.content_hash,
            })
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, owner_id = %owner_id, "insert_file_failed");
                err
            })?;
        let title = title_from_filename(orig_filename);
        match self.books.create_book(owner_id, file.id, &title).await {
            Ok(book) => Ok((file, book)),
            Err(err) => {
                if let Err(cleanup) = self.files.delete_file(file.id).await {
                    tracing::warn!(error = ?cleanup, file_id = %file.id, "orphan_file_row_cleanup_failed");
                }
                Err(err)
            }
        }
    }

    /// Callers validate that `bytes` is a PDF.
    pub async fn execute(
        &self,
        owner_id: Uuid,
        bytes: Vec<u8>,
        orig_filename: Option<String>,
        content_type: Option<String>,
    ) -> anyhow::Result<UploadedBook> {
        let stored = self
            .storage
            .store_upload(owner_id, orig_filename.as_deref(), &bytes)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, owner_id = %owner_id, "store_upload_failed");
                err
            })?;
        let (file, book) = match self
            .record(owner_id, &stored, orig_filename.as_deref(), content_type.as_deref())
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                // No row points at the blob, so drop it.
                if let Err(cleanup) = self.storage.delete_upload(&stored.relative_path).await {
                    tracing::warn!(error = ?cleanup, path = %stored.relative_path, "orphan_upload_cleanup_failed");
                }
                return Err(err);
            }
        };

        self.realtime
            .publish(
                book.id,
                SocketEvent::UploadStatus {
                    book_id: book.id,
                    message: format!("Uploaded {}", stored.filename),
                },
            )
            .await?;
        tracing::info!(book_id = %book.id, file_id = %file.id, size = stored.size, "book_uploaded");

        let url = upload_url(self.public_base_url.as_deref(), &stored.relative_path);
        Ok(UploadedBook { book, file, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::books::BookStatus;
    use crate::infrastructure::memory::MemoryStore;
    use crate::infrastructure::realtime::SocketHub;
    use crate::infrastructure::storage::port_impl::FsStoragePort;
    use tempfile::TempDir;

    #[test]
    fn pdf_magic_and_urls() {
        assert!(is_pdf(b"%PDF-1.7\n"));
        assert!(!is_pdf(b"PK\x03\x04"));
        assert_eq!(upload_url(None, "/u/a.pdf"), "/api/uploads/u/a.pdf");
        assert_eq!(
            upload_url(Some("https://x.test/"), "u/a.pdf"),
            "https://x.test/api/uploads/u/a.pdf"
        );
    }

    #[tokio::test]
    async fn upload_stores_file_creates_book_and_announces() {
        let temp = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let storage = FsStoragePort::new(temp.path());
        let hub = SocketHub::new();
        let owner = Uuid::new_v4();

        let uc = UploadBook {
            files: &store,
            books: &store,
            storage: &storage,
            realtime: &hub,
            public_base_url: None,
        };
        // Nobody is watching a book that does not exist yet; the announce
        // must still succeed.
        let out = uc
            .execute(owner, b"%PDF-1.4".to_vec(), Some("Parish Records.pdf".into()), None)
            .await
            .unwrap();
        assert_eq!(out.book.title, "Parish Records");
        assert_eq!(out.book.status, BookStatus::Uploaded);
        assert_eq!(out.book.file_id, out.file.id);
        assert_eq!(out.file.content_type.as_deref(), Some("application/pdf"));
        assert!(out.url.starts_with(&format!("/api/uploads/{}/", owner)));
        assert_eq!(
            storage.read_bytes(&out.file.storage_path).await.unwrap(),
            b"%PDF-1.4"
        );
    }

    struct BrokenBooks;

    #[async_trait::async_trait]
    impl BookRepository for BrokenBooks {
        async fn create_book(&self, _: Uuid, _: Uuid, _: &str) -> anyhow::Result<Book> {
            anyhow::bail!("books table unavailable")
        }
        async fn get_book(&self, _: Uuid) -> anyhow::Result<Option<Book>> {
            Ok(None)
        }
        async fn get_owned_book(&self, _: Uuid, _: Uuid) -> anyhow::Result<Option<Book>> {
            Ok(None)
        }
        async fn list_for_owner(&self, _: Uuid) -> anyhow::Result<Vec<Book>> {
            Ok(Vec::new())
        }
        async fn append_chunk(
            &self,
            _: Uuid,
            _: &serde_json::Value,
            _: Option<&str>,
            _: Option<i32>,
        ) -> anyhow::Result<crate::application::ports::book_repository::AppendOutcome> {
            anyhow::bail!("books table unavailable")
        }
        async fn list_chunks(&self, _: Uuid) -> anyhow::Result<Vec<crate::domain::books::BookChunk>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn failed_book_insert_leaves_no_blob_or_file_row() {
        let temp = TempDir::new().unwrap();
        let store = MemoryStore::new();
        let storage = FsStoragePort::new(temp.path());
        let hub = SocketHub::new();
        let owner = Uuid::new_v4();

        let uc = UploadBook {
            files: &store,
            books: &BrokenBooks,
            storage: &storage,
            realtime: &hub,
            public_base_url: None,
        };
        assert!(
            uc.execute(owner, b"%PDF-1.4".to_vec(), Some("a.pdf".into()), None)
                .await
                .is_err()
        );
        let owner_dir = temp.path().join(owner.to_string());
        assert_eq!(std::fs::read_dir(owner_dir).unwrap().count(), 0);
        assert!(
            FilesRepository::list_for_owner(&store, owner)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
