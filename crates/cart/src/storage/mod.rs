//! Key-value storage backends for cart snapshots.
//!
//! The cart only needs two operations from its storage: read the bytes under
//! a key, and replace them. Backends decide where those bytes live.
//!
//! - [`MemoryStore`] - In-process map, lost when the process exits
//! - [`FileStore`] - One file per key in a directory

use std::future::Future;

use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Backend cannot serve requests right now.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous key-value store holding serialized cart snapshots.
///
/// Implementations must be shareable across tasks: the cart reads through
/// the store on hydrate and a background task writes through it afterwards.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored under the key.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, StorageError>> + Send;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<(), StorageError>> + Send;
}
