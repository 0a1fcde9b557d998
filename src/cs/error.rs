use thiserror::Error;

/// Errors raised while configuring the hash tables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The probing mode string is neither `"linear"` nor `"double"`.
    #[error("invalid probing mode: {0:?} (expected \"linear\" or \"double\")")]
    InvalidProbingMode(String),

    /// The load factor threshold must lie strictly between 0 and 1.
    #[error("load factor threshold must be in (0, 1), got {0}")]
    InvalidLoadFactor(f64),

    /// Every slot was probed without finding room for a new key.
    #[error("hash table is full: probed all {capacity} slots without finding a free one")]
    TableFull { capacity: usize },
}

/// Result type for hash table configuration.
pub type Result<T> = std::result::Result<T, Error>;
