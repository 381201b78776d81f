//! Error types for the ReportFrame domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! The embedding path never surfaces these to the end user: address and
//! parameter faults are recovered by the composer, which logs them and falls
//! back. Strict composition returns them to operator tooling.

use thiserror::Error;

/// The top-level error type for ReportFrame operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Address composition ---
    #[error("Address error: {0}")]
    Address(#[from] AddressError),

    // --- Custom report parameters ---
    #[error("Report parameter error: {0}")]
    Parameters(#[from] ParameterError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// A configured report address that cannot be composed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Invalid base URL '{address}': {reason}")]
    InvalidBase { address: String, reason: String },

    #[error("Report path is not valid UTF-8 after decoding: {0}")]
    UndecodablePath(String),
}

/// Custom report parameter text that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("Malformed parameter JSON: {0}")]
    Malformed(String),

    #[error("Report parameters must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}
