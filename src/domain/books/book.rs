use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Uploaded => "uploaded",
            BookStatus::Processing => "processing",
            BookStatus::Completed => "completed",
            BookStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uploaded" => Some(BookStatus::Uploaded),
            "processing" => Some(BookStatus::Processing),
            "completed" => Some(BookStatus::Completed),
            "failed" => Some(BookStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Book {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub file_id: Uuid,
    pub title: String,
    pub total_chunks: i32,
    pub processed_chunks: i32,
    pub status: BookStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Book {
    pub fn progress(&self) -> Progress {
        Progress {
            processed: self.processed_chunks,
            total: self.total_chunks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: i32,
    pub total: i32,
}

impl Progress {
    /// A book with an unknown total (0) is never complete.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.processed >= self.total
    }

    /// Frontends match on this exact phrasing to drive their progress bars.
    pub fn message(&self) -> String {
        format!("Processing chunk {}/{}", self.processed, self.total)
    }
}

#[derive(Debug, Clone)]
pub struct BookChunk {
    pub seq: i32,
    pub result: serde_json::Value,
    pub source_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_round_trip() {
        for s in [
            BookStatus::Uploaded,
            BookStatus::Processing,
            BookStatus::Completed,
            BookStatus::Failed,
        ] {
            assert_eq!(BookStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(BookStatus::parse("archived"), None);
    }

    #[test]
    fn progress_message_and_completion() {
        let p = Progress {
            processed: 3,
            total: 10,
        };
        assert_eq!(p.message(), "Processing chunk 3/10");
        assert!(!p.is_complete());
        assert!(Progress { processed: 10, total: 10 }.is_complete());
        assert!(!Progress { processed: 0, total: 0 }.is_complete());
    }
}
