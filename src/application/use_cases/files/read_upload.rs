use uuid::Uuid;

use crate::application::ports::files_repository::{FileRow, FilesRepository};
use crate::application::ports::storage_port::StoragePort;

pub struct ReadUpload<'a, F, S>
where
    F: FilesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub files: &'a F,
    pub storage: &'a S,
}

pub struct UploadBytes {
    pub file: FileRow,
    pub bytes: Vec<u8>,
}

impl<'a, F, S> ReadUpload<'a, F, S>
where
    F: FilesRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    /// Looks the upload up by its path under the uploads root. Only the
    /// owner gets the bytes.
    pub async fn execute(
        &self,
        viewer_id: Uuid,
        rel_path: &str,
    ) -> anyhow::Result<Option<UploadBytes>> {
        let rel_path = rel_path.trim_start_matches('/');
        let Some(file) = self.files.find_by_storage_path(rel_path).await? else {
            return Ok(None);
        };
        if file.owner_id != viewer_id {
            return Ok(None);
        }
        let bytes = match self.storage.read_bytes(&file.storage_path).await {
            Ok(b) => b,
            Err(err) => {
                tracing::warn!(error = ?err, file_id = %file.id, "upload_missing_on_disk");
                return Ok(None);
            }
        };
        Ok(Some(UploadBytes { file, bytes }))
    }
}
