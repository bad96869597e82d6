//! RocksDB storage backend for persisted networks.

use super::{BatchOperation, KeyValue, StorageBackend};
use crate::error::{CprnError, Result};
use log::debug;
use rocksdb::{Options, WriteBatch, DB};
use std::path::Path;

/// RocksDB-backed persistent storage.
pub struct RocksDBBackend {
    db: DB,
}

impl RocksDBBackend {
    /// Open or create a RocksDB database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::Storage`] if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)
            .map_err(|e| CprnError::storage(format!("Failed to open RocksDB at {path:?}"), Some(e)))?;
        debug!("Opened network store at {path:?}");
        Ok(Self { db })
    }
}

impl StorageBackend for RocksDBBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.db
            .get(key)
            .map_err(|e| CprnError::storage("Failed to get value", Some(e)))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>> {
        let mut results = Vec::new();
        for item in self.db.prefix_iterator(prefix) {
            let (key, value) =
                item.map_err(|e| CprnError::storage("Failed to iterate over prefix", Some(e)))?;
            // the prefix iterator can run past the prefix without a prefix extractor
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }
        Ok(results)
    }

    fn write_batch(&mut self, operations: Vec<BatchOperation>) -> Result<()> {
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => batch.put(&key, &value),
                BatchOperation::Delete { key } => batch.delete(&key),
            }
        }
        self.db
            .write(batch)
            .map_err(|e| CprnError::storage("Failed to write batch", Some(e)))
    }

    fn flush(&mut self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| CprnError::storage("Failed to flush database", Some(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_batch_and_scan() {
        let temp_dir = TempDir::new().unwrap();
        let mut backend = RocksDBBackend::open(temp_dir.path()).unwrap();
        backend
            .write_batch(vec![
                BatchOperation::put("vertex:000000000001", "b"),
                BatchOperation::put("vertex:000000000000", "a"),
                BatchOperation::put("edge:000000000000", "e"),
            ])
            .unwrap();

        let vertices = backend.scan_prefix(b"vertex:").unwrap();
        let values: Vec<&[u8]> = vertices.iter().map(|(_, v)| v.as_slice()).collect();
        assert_eq!(values, [b"a".as_slice(), b"b".as_slice()]);
        assert_eq!(backend.get(b"edge:000000000000").unwrap(), Some(b"e".to_vec()));
    }

    #[test]
    fn test_persistence_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().to_path_buf();
        {
            let mut backend = RocksDBBackend::open(&path).unwrap();
            backend.write_batch(vec![BatchOperation::put("persistent", "data")]).unwrap();
            backend.flush().unwrap();
        }
        let backend = RocksDBBackend::open(&path).unwrap();
        assert_eq!(backend.get(b"persistent").unwrap(), Some(b"data".to_vec()));
    }
}
