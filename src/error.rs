use thiserror::Error;

/// Errors surfaced by model operations.
#[derive(Debug, Error)]
pub enum SpellError {
    #[error("prefix length must be greater than 0")]
    InvalidPrefixLength,

    /// Segmentation needs at least one dictionary word to bound part lengths.
    #[error("longest word in dictionary has zero length")]
    EmptyDictionary,

    /// Segmentation normalizes unigram probabilities by the cumulative
    /// frequency, which must be non-zero.
    #[error("cumulative frequency is zero")]
    ZeroCumulativeFrequency,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
