//! Collection of files uploaded in one short time window.
//!
//! Telegram delivers a multi-file upload as separate document messages that
//! share a `media_group_id`. The batch tracks the last seen group so the
//! "add more files?" prompt is asked once per group, not once per file.

use std::path::PathBuf;

/// One downloaded resume file waiting for processing.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct Batch {
    files: Vec<StagedFile>,
    last_media_group: Option<String>,
}

impl Batch {
    /// Adds a staged file and reports whether the "add more?" prompt should
    /// be shown: always for single uploads, once per media group otherwise.
    pub fn add(&mut self, file: StagedFile, media_group_id: Option<&str>) -> bool {
        self.files.push(file);
        match media_group_id {
            None => {
                self.last_media_group = None;
                true
            }
            Some(group) => {
                let first_of_group = self.last_media_group.as_deref() != Some(group);
                self.last_media_group = Some(group.to_string());
                first_of_group
            }
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Consumes the batch, yielding files in upload order.
    pub fn into_files(self) -> Vec<StagedFile> {
        self.files
    }
}
