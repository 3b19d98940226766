pub mod drive;
pub mod gateway_service;
pub mod metadata_codec;
