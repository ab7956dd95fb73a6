//! Mirrors TikTok videos into an object store.
//!
//! A video reference is resolved to its metadata record; on first sight the
//! clip, covers and avatars are copied into the store and every URL in the
//! record is rewritten to point at the copies.

pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod locks;
pub mod metrics;
pub mod model;
pub mod origin;
pub mod resolver;
pub mod server;
pub mod store;
