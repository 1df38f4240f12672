//! Error types for scene preparation.

use thiserror::Error;

/// Main error type for BVH construction, encoding and scene assembly.
#[derive(Error, Debug)]
pub enum Error {
    /// A fixed-capacity buffer cannot hold the data
    #[error("{what} needs {required} scalars but buffer capacity is {capacity}")]
    CapacityExceeded {
        what: &'static str,
        required: usize,
        capacity: usize,
    },

    /// Index too large to store exactly in an `f32` scalar
    #[error("{what} {index} is not exactly representable as f32 (limit {limit})")]
    InexactIndex {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    /// Polygon that is neither a triangle nor a quad
    #[error("Unsupported face arity {arity} in shape {shape:?}")]
    UnsupportedFaceArity { arity: usize, shape: String },

    /// Shape references a material that was never defined
    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    /// Scene description is inconsistent (bad indices, bad counts)
    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    /// Flat buffer does not follow the expected record layout
    #[error("Malformed buffer: {0}")]
    MalformedBuffer(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a capacity error.
    pub fn capacity(what: &'static str, required: usize, capacity: usize) -> Self {
        Self::CapacityExceeded {
            what,
            required,
            capacity,
        }
    }

    /// Create an invalid scene error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidScene(msg.into())
    }

    /// Create a malformed buffer error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedBuffer(msg.into())
    }
}

/// Result type alias for scene preparation.
pub type Result<T> = std::result::Result<T, Error>;
