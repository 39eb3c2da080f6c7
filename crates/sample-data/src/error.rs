//! Error types for the sample-data crate.

use thiserror::Error;

/// Errors raised while loading the embedded sample records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleDataError {
    /// The embedded JSON fixture is malformed.
    #[error("invalid sample customer JSON: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },
}
