//! Data models for the Drive gateway.
//!
//! `metadata` holds the commerce record stored alongside each file, and
//! `item` holds the Drive file records and the shapes returned to callers.

pub mod item;
pub mod metadata;
