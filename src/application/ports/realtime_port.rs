use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Server-to-client socket frame: `{"event": "...", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SocketEvent {
    Connected {
        sid: Uuid,
    },
    ProgressUpdate {
        book_id: Uuid,
        message: String,
        processed: i32,
        total: i32,
    },
    UploadStatus {
        book_id: Uuid,
        message: String,
    },
    Completed {
        book_id: Uuid,
    },
    Error {
        message: String,
    },
}

/// Client-to-server socket frame.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[async_trait]
pub trait RealtimePort: Send + Sync {
    /// Fans the event out to every connection watching `book_id`.
    /// Having no watchers is not an error.
    async fn publish(&self, book_id: Uuid, event: SocketEvent) -> anyhow::Result<()>;
}
