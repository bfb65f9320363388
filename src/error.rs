use thiserror::Error;

/// Failures raised by normalization, the verse store and verse key parsing.
#[derive(Error, Debug)]
pub enum VerseError {
    #[error("malformed verse key {key:?}: expected <book>-<chapter>-<verse>")]
    MalformedKey { key: String },

    #[error("malformed document at {position}: {reason}")]
    MalformedDocument { position: String, reason: String },

    #[error("verse {key} not found")]
    VerseNotFound { key: String },

    #[error("store integrity violated: 2 or more rows match verse {key}")]
    StoreIntegrity { key: String },

    #[error("invalid table name {name:?}: expected letters, digits and underscores, not metadata or sqlite_*")]
    InvalidTableName { name: String },

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type VerseResult<T> = std::result::Result<T, VerseError>;
