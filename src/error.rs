//! Error types for the account feed processor.

use thiserror::Error;

/// Result type alias for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;

/// Result type alias for account store primitives
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading or applying a feed.
///
/// Every variant is fatal to the run: non-fatal outcomes (duplicates,
/// missing targets) never surface as errors.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Feed row that cannot become a record
    #[error("Invalid feed record at row {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    /// Chunk size or other setting out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Operation tag outside the supported set
    #[error("Unknown operation '{tag}' for account {account_id}")]
    UnknownOperation { account_id: String, tag: String },

    /// Record without an account to apply it to
    #[error("Record '{tag}' has an empty account id")]
    EmptyAccountId { tag: String },

    /// Failure reported by the account store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Missing input file argument
    #[error(
        "Missing input file argument. Usage: account-feed <feed.csv> [--chunk-size N] [--db PATH] [--strict-inserts]"
    )]
    MissingArgument,
}

/// Errors raised by an [`AccountStore`](crate::store::AccountStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite driver error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Insert collided with an existing account (strict insert mode only)
    #[error("Duplicate key for account {account_id}")]
    DuplicateKey { account_id: String },

    /// Row would violate a column constraint
    #[error("Constraint violation for account {account_id}: {message}")]
    Constraint { account_id: String, message: String },

    /// Store cannot serve requests
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Unversioned database holds an `accounts` table of another shape
    #[error("Existing accounts table has unexpected columns: {columns:?}")]
    IncompatibleSchema { columns: Vec<String> },

    /// Database was written by a newer schema
    #[error("Database schema version {found} is newer than supported {supported}")]
    UnsupportedSchemaVersion { found: u32, supported: u32 },
}
