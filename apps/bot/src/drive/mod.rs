//! The cloud-drive file store: one folder per candidate, public read links.

mod client;

pub use client::{DriveClient, DriveError, UploadedFile};
