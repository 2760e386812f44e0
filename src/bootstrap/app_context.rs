use std::sync::Arc;

use crate::application::ports::book_repository::BookRepository;
use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::realtime_port::RealtimePort;
use crate::application::ports::storage_port::StoragePort;
use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::config::Config;
use crate::bootstrap::extensions::Extensions;
use crate::infrastructure::crypto::{Argon2Hasher, TokenCodec};
use crate::infrastructure::db::Database;
use crate::infrastructure::db::repositories::book_repository_sqlx::SqlxBookRepository;
use crate::infrastructure::db::repositories::files_repository_sqlx::SqlxFilesRepository;
use crate::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository;
use crate::infrastructure::realtime::SocketLayer;
use crate::infrastructure::storage::port_impl::FsStoragePort;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    extensions: Extensions,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    user_repo: Arc<dyn UserRepository>,
    book_repo: Arc<dyn BookRepository>,
    files_repo: Arc<dyn FilesRepository>,
    storage: Arc<dyn StoragePort>,
    realtime: Arc<dyn RealtimePort>,
}

impl AppServices {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        book_repo: Arc<dyn BookRepository>,
        files_repo: Arc<dyn FilesRepository>,
        storage: Arc<dyn StoragePort>,
        realtime: Arc<dyn RealtimePort>,
    ) -> Self {
        Self {
            user_repo,
            book_repo,
            files_repo,
            storage,
            realtime,
        }
    }

    /// Postgres repositories over the shared pool, filesystem uploads and the
    /// socket hub as the realtime sink.
    pub fn sqlx(cfg: &Config, ext: &Extensions) -> Self {
        let pool = ext.db.pool().clone();
        Self::new(
            Arc::new(SqlxUserRepository::new(pool.clone())),
            Arc::new(SqlxBookRepository::new(pool.clone())),
            Arc::new(SqlxFilesRepository::new(pool)),
            Arc::new(FsStoragePort::new(&cfg.uploads_dir)),
            Arc::new(ext.socket.hub().clone()),
        )
    }
}

impl AppContext {
    pub fn new(cfg: Config, extensions: Extensions, services: AppServices) -> Self {
        Self {
            cfg,
            extensions,
            services: Arc::new(services),
        }
    }

    pub fn user_repo(&self) -> Arc<dyn UserRepository> {
        self.services.user_repo.clone()
    }

    pub fn book_repo(&self) -> Arc<dyn BookRepository> {
        self.services.book_repo.clone()
    }

    pub fn files_repo(&self) -> Arc<dyn FilesRepository> {
        self.services.files_repo.clone()
    }

    pub fn storage(&self) -> Arc<dyn StoragePort> {
        self.services.storage.clone()
    }

    pub fn realtime(&self) -> Arc<dyn RealtimePort> {
        self.services.realtime.clone()
    }

    pub fn db(&self) -> &Database {
        &self.extensions.db
    }

    pub fn hasher(&self) -> &Argon2Hasher {
        &self.extensions.hasher
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.extensions.tokens
    }

    pub fn socket(&self) -> &SocketLayer {
        &self.extensions.socket
    }
}
