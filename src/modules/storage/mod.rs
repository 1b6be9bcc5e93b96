//! Storage module for claim attachments
//!
//! Uploaded files are staged on the local filesystem under the configured
//! upload directory before the claim transaction runs, and served back from
//! `/uploads/{storage_name}`.

mod local_storage;

pub use local_storage::{AttachmentStorage, StagedFile, StorageError};
