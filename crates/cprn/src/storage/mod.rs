//! Key-value storage for road networks.
//!
//! A [`StorageBackend`] only needs what
//! [`RoadNetwork::save_to`](crate::RoadNetwork::save_to) and
//! [`RoadNetwork::load_from`](crate::RoadNetwork::load_from) use: point
//! reads, ordered prefix scans and atomic batches.
//! - [`MemoryBackend`]: In-memory storage for tests and scratch networks
//! - [`RocksDBBackend`]: Persistent storage (feature `rocksdb-backend`)

mod memory;
#[cfg(feature = "rocksdb-backend")]
mod rocksdb_backend;

pub use memory::MemoryBackend;
#[cfg(feature = "rocksdb-backend")]
pub use rocksdb_backend::RocksDBBackend;

use crate::error::Result;

/// Key-value pair returned by prefix scans.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Storage a network snapshot can be written to and read from.
///
/// Implementations must apply batches atomically and return prefix scans in
/// ascending key order.
pub trait StorageBackend: Send + Sync {
    /// Retrieve a value by key. Returns `Ok(None)` if the key doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::Storage`](crate::CprnError::Storage) if the read fails.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// All key-value pairs whose key starts with `prefix`, in key order.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>>;

    /// Apply all operations or none.
    fn write_batch(&mut self, operations: Vec<BatchOperation>) -> Result<()>;

    /// Flush any buffered writes to disk.
    fn flush(&mut self) -> Result<()>;
}

/// One write of an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair
    Put {
        /// Key to write
        key: Vec<u8>,
        /// Value to write
        value: Vec<u8>,
    },
    /// Delete a key
    Delete {
        /// Key to delete
        key: Vec<u8>,
    },
}

impl BatchOperation {
    /// Shorthand for [`BatchOperation::Put`].
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }
}
