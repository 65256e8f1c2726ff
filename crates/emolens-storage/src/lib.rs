//! Object storage client for uploaded videos.
//!
//! This crate provides:
//! - Upload of a local file under a `{folder}/{file}` key
//! - Public or presigned object URLs
//! - Connectivity checks for readiness probes

pub mod client;
pub mod error;

pub use client::{BlobClient, StorageConfig, UploadedObject, UrlMode};
pub use error::{StorageError, StorageResult};
