use crate::bootstrap::config::Config;
use crate::bootstrap::error::BootstrapError;
use crate::infrastructure::crypto::{Argon2Hasher, TokenCodec};
use crate::infrastructure::db::Database;
use crate::infrastructure::realtime::SocketLayer;

/// The four shared helpers every route group depends on. Built once per
/// application and handed to the router through `AppContext`.
#[derive(Clone)]
pub struct Extensions {
    pub db: Database,
    pub hasher: Argon2Hasher,
    pub tokens: TokenCodec,
    pub socket: SocketLayer,
}

impl Extensions {
    pub fn init(cfg: &Config) -> Result<Self, BootstrapError> {
        let db = Database::connect_lazy(&cfg.database_url, cfg.database_max_connections)?;
        let hasher = Argon2Hasher::new();
        let tokens = TokenCodec::new(&cfg.jwt_secret, cfg.jwt_expires_secs)?;
        let socket = SocketLayer::new(cfg.socket_allowed_origins.clone());

        std::fs::create_dir_all(&cfg.uploads_dir).map_err(|source| BootstrapError::Storage {
            path: cfg.uploads_dir.clone(),
            source,
        })?;

        Ok(Self {
            db,
            hasher,
            tokens,
            socket,
        })
    }
}
