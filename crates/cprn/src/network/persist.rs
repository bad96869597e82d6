//! Persisting a [`RoadNetwork`] through a [`StorageBackend`].
//!
//! Vertices live under `vertex:` and edges under `edge:`, each keyed by a
//! zero-padded insertion sequence number so a prefix scan returns them in
//! insertion order and adjacency order survives the round trip.

use super::roadnet::{NetworkSnapshot, RoadNetwork};
use super::types::{Edge, Vertex};
use crate::error::{CprnError, Result};
use crate::storage::{BatchOperation, StorageBackend};
use log::{debug, info};
use serde::de::DeserializeOwned;

const VERTEX_PREFIX: &str = "vertex:";
const EDGE_PREFIX: &str = "edge:";

impl RoadNetwork {
    /// Replace the backend's network content with this network, in one batch.
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::Serialization`] or [`CprnError::Storage`] on failure.
    pub fn save_to(&self, backend: &mut dyn StorageBackend) -> Result<()> {
        let mut operations = Vec::with_capacity(self.vertex_count() + self.edge_count());

        for prefix in [VERTEX_PREFIX, EDGE_PREFIX] {
            for (key, _) in backend.scan_prefix(prefix.as_bytes())? {
                operations.push(BatchOperation::Delete { key });
            }
        }

        for (seq, vertex) in self.vertices().enumerate() {
            let value = serde_json::to_vec(vertex)
                .map_err(|e| CprnError::serialization("Failed to serialize vertex", Some(e)))?;
            operations.push(BatchOperation::Put {
                key: sequence_key(VERTEX_PREFIX, seq),
                value,
            });
        }

        for (seq, edge) in self.edges().enumerate() {
            let value = serde_json::to_vec(edge)
                .map_err(|e| CprnError::serialization("Failed to serialize edge", Some(e)))?;
            operations.push(BatchOperation::Put {
                key: sequence_key(EDGE_PREFIX, seq),
                value,
            });
        }

        debug!("Writing network batch of {} operations", operations.len());
        backend.write_batch(operations)?;
        backend.flush()?;
        info!(
            "Saved network: {} vertices, {} edges",
            self.vertex_count(),
            self.edge_count()
        );
        Ok(())
    }

    /// Load a network previously written with [`save_to`](Self::save_to).
    ///
    /// # Errors
    ///
    /// Returns [`CprnError::Serialization`] for undecodable values and the
    /// errors of [`RoadNetwork::from_snapshot`] for inconsistent content.
    pub fn load_from(backend: &dyn StorageBackend) -> Result<Self> {
        let vertices: Vec<Vertex> = decode_all(backend, VERTEX_PREFIX, "vertex")?;
        let edges: Vec<Edge> = decode_all(backend, EDGE_PREFIX, "edge")?;
        info!("Loading network: {} vertices, {} edges", vertices.len(), edges.len());
        RoadNetwork::from_snapshot(NetworkSnapshot { vertices, edges })
    }
}

fn sequence_key(prefix: &str, seq: usize) -> Vec<u8> {
    format!("{prefix}{seq:012}").into_bytes()
}

fn decode_all<T: DeserializeOwned>(backend: &dyn StorageBackend, prefix: &str, what: &str) -> Result<Vec<T>> {
    backend
        .scan_prefix(prefix.as_bytes())?
        .into_iter()
        .map(|(_, value)| {
            serde_json::from_slice(&value)
                .map_err(|e| CprnError::serialization(format!("Failed to deserialize {what}"), Some(e)))
        })
        .collect()
}
