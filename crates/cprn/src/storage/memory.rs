//! In-memory storage backend.

use super::{BatchOperation, KeyValue, StorageBackend};
use crate::error::{CprnError, Result};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard};

type Store = BTreeMap<Vec<u8>, Vec<u8>>;

/// In-memory storage backend using a BTreeMap.
///
/// All data is lost when the backend is dropped.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<Store>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of key-value pairs stored.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Check if the backend is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>> {
        self.data.read().map_err(|_| poisoned())
    }
}

fn poisoned() -> CprnError {
    CprnError::storage("memory backend lock poisoned", None::<std::io::Error>)
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>> {
        let data = self.read()?;
        Ok(data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn write_batch(&mut self, operations: Vec<BatchOperation>) -> Result<()> {
        let data = self.data.get_mut().map_err(|_| poisoned())?;
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_backend_is_empty() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty().unwrap());
        assert_eq!(backend.len().unwrap(), 0);
        assert!(backend.get(b"vertex:1").unwrap().is_none());
    }

    #[test]
    fn test_scan_prefix_is_ordered() {
        let mut backend = MemoryBackend::new();
        backend
            .write_batch(vec![
                BatchOperation::put("vertex:0000000002", "b"),
                BatchOperation::put("vertex:0000000001", "a"),
                BatchOperation::put("edge:0000000001", "e"),
            ])
            .unwrap();

        let results = backend.scan_prefix(b"vertex:").unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].1, b"a");
        assert_eq!(results[1].1, b"b");
    }

    #[test]
    fn test_write_batch_mixed_operations() {
        let mut backend = MemoryBackend::new();
        backend.write_batch(vec![BatchOperation::put("key1", "value1")]).unwrap();

        backend
            .write_batch(vec![
                BatchOperation::Delete { key: b"key1".to_vec() },
                BatchOperation::put("key2", "value2"),
            ])
            .unwrap();

        assert!(backend.get(b"key1").unwrap().is_none());
        assert_eq!(backend.get(b"key2").unwrap(), Some(b"value2".to_vec()));
        assert_eq!(backend.len().unwrap(), 1);
    }
}
