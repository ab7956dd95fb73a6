//! Store-backed caches for media assets and metadata records.

pub mod asset;
pub mod metadata;

pub use asset::AssetCache;
pub use metadata::MetadataCache;
