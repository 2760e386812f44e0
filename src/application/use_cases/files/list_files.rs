use uuid::Uuid;

use crate::application::ports::files_repository::{FileRow, FilesRepository};

pub struct ListFiles<'a, F: FilesRepository + ?Sized> {
    pub files: &'a F,
}

impl<'a, F: FilesRepository + ?Sized> ListFiles<'a, F> {
    pub async fn execute(&self, owner_id: Uuid) -> anyhow::Result<Vec<FileRow>> {
        self.files.list_for_owner(owner_id).await
    }
}
