#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown preference key: {0}")]
    UnknownPreferenceKey(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}
