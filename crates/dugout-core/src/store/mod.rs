//! Local entity store for offline league data.
//!
//! This module provides the `LocalStore`, which keeps every league
//! collection as a JSON blob under its own namespaced key in a `Storage`
//! medium. It seeds defaults on first run, serves typed reads, and applies
//! the append/upsert mutations the UI issues.
//!
//! Reads never fail: a missing or undecodable collection resolves to the
//! caller's fallback, and a list with some unreadable records yields the
//! rest. The generic `set_collection` logs and drops persistence errors; the
//! `try_*` accessors expose the underlying outcome.
//!
//! Mutations read the stored records as raw JSON and write every one of
//! them back, so records this crate cannot type are never lost. A mutation
//! refuses to run when the stored value is not the container it expects.

pub mod keys;
pub mod local;
pub mod seed;

pub use keys::CollectionKey;
pub use local::LocalStore;

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to decode collection {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode collection {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Collection {key} does not hold a {expected}; refusing to overwrite it")]
    WrongShape { key: String, expected: &'static str },

    #[error("Invalid record: {0}")]
    Invalid(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}
