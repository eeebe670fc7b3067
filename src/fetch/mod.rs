// src/fetch/mod.rs

/// Downloading dataset archives to disk.
pub mod download;

pub use download::{download_file, download_file_with, filename_from_content_disposition};
