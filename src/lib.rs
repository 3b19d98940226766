//! HTTP gateway storing files and their commerce metadata in a Google Drive
//! folder.
//!
//! Metadata is packed into Drive's `description` field as JSON by
//! [`services::metadata_codec`] and unpacked again when the folder is listed.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
