//! Error types for checkperms.
//!
//! Almost everything that goes wrong during a run is a per-path finding,
//! not an error: a failed `lstat` or `chmod` is reported and the run
//! continues. `AuditError` covers the few conditions that abort the whole
//! run, chief among them malformed input.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// An embedded NUL in a pathname means the input stream is corrupted
    /// or adversarial; no further lines are processed.
    #[error("<stdin>: NUL character in input.")]
    NulInInput,

    #[error("failed to read input")]
    Input(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nul_display() {
        assert_eq!(
            AuditError::NulInInput.to_string(),
            "<stdin>: NUL character in input."
        );
    }

    #[test]
    fn test_input_error_preserves_source() {
        use std::error::Error as _;

        let err = AuditError::Input(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "broken pipe",
        ));
        assert_eq!(err.to_string(), "failed to read input");
        assert!(err.source().is_some());
    }
}
