//! Process-local implementations of the repository ports. Same semantics as
//! the sqlx repositories (ownership, cascades, chunk sequencing), no
//! persistence. Used by the test suites and for running without Postgres.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::ports::book_repository::{AppendOutcome, BookRepository};
use crate::application::ports::files_repository::{FileRow, FilesRepository, NewFile};
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::domain::books::{Book, BookChunk, BookStatus};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, UserRow>,
    files: HashMap<Uuid, FileRow>,
    books: HashMap<Uuid, Book>,
    chunks: HashMap<Uuid, Vec<BookChunk>>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn public_user(u: &UserRow) -> UserRow {
    UserRow {
        password_hash: None,
        ..u.clone()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<UserRow>> {
        let mut st = self.state.write().await;
        if st.users.values().any(|u| u.email == email) {
            return Ok(None);
        }
        let row = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            bio: None,
            password_hash: Some(password_hash.to_string()),
        };
        st.users.insert(row.id, row.clone());
        Ok(Some(public_user(&row)))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRow>> {
        let st = self.state.read().await;
        Ok(st.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        bio: Option<&str>,
    ) -> anyhow::Result<Option<UserRow>> {
        let mut st = self.state.write().await;
        let Some(u) = st.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(n) = name {
            u.name = n.to_string();
        }
        if let Some(b) = bio {
            u.bio = Some(b.to_string());
        }
        Ok(Some(public_user(u)))
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let mut st = self.state.write().await;
        match st.users.get_mut(&id) {
            Some(u) => {
                u.password_hash = Some(password_hash.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl FilesRepository for MemoryStore {
    async fn insert_file(&self, file: &NewFile<'_>) -> anyhow::Result<FileRow> {
        let mut st = self.state.write().await;
        if st.files.values().any(|f| f.storage_path == file.storage_path) {
            anyhow::bail!("duplicate storage path {}", file.storage_path);
        }
        let row = FileRow {
            id: Uuid::new_v4(),
            owner_id: file.owner_id,
            filename: file.filename.to_string(),
            content_type: file.content_type.map(|s| s.to_string()),
            size: file.size,
            storage_path: file.storage_path.to_string(),
            content_hash: file.content_hash.to_string(),
            created_at: Utc::now(),
        };
        st.files.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_file(&self, file_id: Uuid) -> anyhow::Result<Option<FileRow>> {
        Ok(self.state.read().await.files.get(&file_id).cloned())
    }

    async fn find_by_storage_path(&self, storage_path: &str) -> anyhow::Result<Option<FileRow>> {
        let st = self.state.read().await;
        Ok(st
            .files
            .values()
            .find(|f| f.storage_path == storage_path)
            .cloned())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<FileRow>> {
        let st = self.state.read().await;
        let mut out: Vec<FileRow> = st
            .files
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn delete_file(&self, file_id: Uuid) -> anyhow::Result<bool> {
        let mut st = self.state.write().await;
        if st.files.remove(&file_id).is_none() {
            return Ok(false);
        }
        let orphaned: Vec<Uuid> = st
            .books
            .values()
            .filter(|b| b.file_id == file_id)
            .map(|b| b.id)
            .collect();
        for id in orphaned {
            st.books.remove(&id);
            st.chunks.remove(&id);
        }
        Ok(true)
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn create_book(
        &self,
        owner_id: Uuid,
        file_id: Uuid,
        title: &str,
    ) -> anyhow::Result<Book> {
        let now = Utc::now();
        let book = Book {
            id: Uuid::new_v4(),
            owner_id,
            file_id,
            title: title.to_string(),
            total_chunks: 0,
            processed_chunks: 0,
            status: BookStatus::Uploaded,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get_book(&self, book_id: Uuid) -> anyhow::Result<Option<Book>> {
        Ok(self.state.read().await.books.get(&book_id).cloned())
    }

    async fn get_owned_book(&self, book_id: Uuid, owner_id: Uuid) -> anyhow::Result<Option<Book>> {
        let st = self.state.read().await;
        Ok(st
            .books
            .get(&book_id)
            .filter(|b| b.owner_id == owner_id)
            .cloned())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<Book>> {
        let st = self.state.read().await;
        let mut out: Vec<Book> = st
            .books
            .values()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn append_chunk(
        &self,
        book_id: Uuid,
        result: &serde_json::Value,
        source_url: Option<&str>,
        total_chunks: Option<i32>,
    ) -> anyhow::Result<AppendOutcome> {
        let mut guard = self.state.write().await;
        let st = &mut *guard;
        let Some(book) = st.books.get_mut(&book_id) else {
            return Ok(AppendOutcome::NotFound);
        };
        let next = book.processed_chunks + 1;
        let total = match total_chunks {
            Some(t) if t >= next => t,
            _ => book.total_chunks,
        };
        if total > 0 && next > total {
            return Ok(AppendOutcome::Full);
        }
        st.chunks.entry(book_id).or_default().push(BookChunk {
            seq: next,
            result: result.clone(),
            source_url: source_url.map(|s| s.to_string()),
        });
        book.processed_chunks = next;
        book.total_chunks = total;
        book.status = if total > 0 && next >= total {
            BookStatus::Completed
        } else {
            BookStatus::Processing
        };
        book.updated_at = Utc::now();
        Ok(AppendOutcome::Appended(book.clone()))
    }

    async fn list_chunks(&self, book_id: Uuid) -> anyhow::Result<Vec<BookChunk>> {
        let st = self.state.read().await;
        Ok(st.chunks.get(&book_id).cloned().unwrap_or_default())
    }
}
