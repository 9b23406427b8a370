/// Error type for storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure in a file-backed store.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key is not usable by this backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}
