pub mod delete_file;
pub mod list_files;
pub mod read_upload;
