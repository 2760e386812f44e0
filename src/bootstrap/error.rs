use crate::infrastructure::crypto::TokenError;

/// Anything that stops an application from being assembled. Callers decide
/// whether it is fatal; `main` treats every variant as such.
#[derive(thiserror::Error, Debug)]
pub enum BootstrapError {
    #[error("invalid configuration: {0}")]
    Config(#[source] anyhow::Error),
    #[error("database client setup failed")]
    Database(#[from] sqlx::Error),
    #[error("token codec setup failed")]
    Token(#[from] TokenError),
    #[error("upload storage at {path} is unusable")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("trusted origin {0:?} is not a valid header value")]
    Cors(String),
    #[error("route group {0:?} registered twice")]
    DuplicateRouteGroup(&'static str),
}
