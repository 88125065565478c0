//! Error types for kdbx-hashline

pub use crate::binary::errors::HeaderError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
/// Wrapper error type for this library
pub enum Error {
    /// Failed to open a database file
    #[error("Could not open {}: {source}", .path.display())]
    Open {
        /// Path that could not be opened
        path: PathBuf,
        /// Underlying IO failure
        source: std::io::Error,
    },
    /// Failed decoding the database header
    #[error("Could not read database header: {0}")]
    Header(#[from] HeaderError),
}
