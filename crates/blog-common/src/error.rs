//! Error types shared by the blog crates.
//!
//! These errors represent failures in the embedded SQLite store that any
//! server built on `blog-common` has to deal with. Application-specific errors
//! should be defined in each server crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("store error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid recipe id: {0}")]
    InvalidId(String),

    #[error("store task failed: {0}")]
    Task(String),
}
