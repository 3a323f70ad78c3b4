//! Error types for Nyaya Sathi Core
//!
//! We use `thiserror` for the error enum; every variant carries a message
//! that is safe to show to the end user.

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A report was submitted with at least one blank field
    #[error("Please fill in all fields before generating the FIR.")]
    IncompleteReport,

    /// A field name did not match any report field
    #[error("Unknown report field: {0}")]
    UnknownField(String),

    /// A reply source could not produce a reply
    #[error("{0}")]
    Bridge(String),
}

impl CoreError {
    /// Build a bridge error from anything displayable
    pub fn bridge(msg: impl std::fmt::Display) -> Self {
        CoreError::Bridge(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_report_names_no_field() {
        let msg = CoreError::IncompleteReport.to_string();
        assert!(!msg.contains("fullName"));
        assert!(msg.contains("all fields"));
    }

    #[test]
    fn test_bridge_error_is_verbatim() {
        let err = CoreError::bridge("⚠️ Backend error:\nboom");
        assert_eq!(err.to_string(), "⚠️ Backend error:\nboom");
    }
}
