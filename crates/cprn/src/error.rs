//! Error types for cprn operations.
//!
//! All fallible operations return [`Result<T>`] with context-rich error messages.

use thiserror::Error;

/// Result type alias for cprn operations.
pub type Result<T> = std::result::Result<T, CprnError>;

/// Boxed error source carried by wrapping variants.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Comprehensive error type for network, search and codec operations.
///
/// Errors fail fast: a search either returns its complete record sequence or
/// one of these, never a silently truncated result.
#[derive(Error, Debug)]
pub enum CprnError {
    /// Malformed argument (unknown direction, bad precision, bad option)
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument
        message: String,
    },

    /// Vertex not found in the network
    #[error("Vertex not found: {vertex_id}")]
    VertexNotFound {
        /// ID of the missing vertex
        vertex_id: String,
    },

    /// Directed edge not found in the network
    #[error("Edge not found: {source_id} -> {target_id}")]
    EdgeNotFound {
        /// Source vertex of the missing edge
        source_id: String,
        /// Target vertex of the missing edge
        target_id: String,
    },

    /// A neighbor reference points at a vertex or edge that does not exist
    #[error("Graph integrity error: {message}")]
    GraphIntegrity {
        /// Description of the dangling reference
        message: String,
    },

    /// The edge-avoidance predicate failed
    #[error("Edge predicate failed: {message}")]
    Predicate {
        /// Error details
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// The search was cancelled through its cancel token
    #[error("Search cancelled after {records} record(s)")]
    Cancelled {
        /// Number of records found before cancellation
        records: usize,
    },

    /// Invalid operation (e.g., adding a duplicate vertex)
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of what went wrong
        message: String,
    },

    /// Storage backend error (RocksDB, file I/O, etc.)
    #[error("Storage error: {message}")]
    Storage {
        /// Detailed error message
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error details
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Archive content does not match the hash carried in its filename
    #[error("Signature mismatch: filename carries {expected}, content hashes to {actual}")]
    SignatureMismatch {
        /// Hash parsed from the filename
        expected: String,
        /// Hash computed from the file content
        actual: String,
    },

    /// Edge query expression could not be parsed
    #[error("Query parse error at offset {offset}: {message}")]
    QueryParse {
        /// Error details
        message: String,
        /// Byte offset into the query text
        offset: usize,
    },

    /// Geohash could not be encoded or decoded
    #[error("Geohash error: {message}")]
    Geohash {
        /// Error details
        message: String,
    },
}

impl CprnError {
    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a storage error from a message and optional source.
    pub fn storage<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            message: message.into(),
            source: source.map(|e| Box::new(e) as BoxedSource),
        }
    }

    /// Create a serialization error from a message and optional source.
    pub fn serialization<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Serialization {
            message: message.into(),
            source: source.map(|e| Box::new(e) as BoxedSource),
        }
    }

    /// Create a predicate error from a message and optional source.
    pub fn predicate<E>(message: impl Into<String>, source: Option<E>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Predicate {
            message: message.into(),
            source: source.map(|e| Box::new(e) as BoxedSource),
        }
    }
}
