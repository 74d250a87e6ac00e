//! Network-specific error types.

use hf_core::{ElementId, HfError};
use thiserror::Error;

/// Structural failures of network operations.
///
/// None of these leave the topology partially modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Element '{name}' not found")]
    NotFound { name: String },

    #[error("Element {id} does not exist in this network")]
    UnknownId { id: ElementId },

    #[error("Cannot delete '{name}': {connected} outputs are connected")]
    AmbiguousBranches { name: String, connected: usize },

    #[error("Network capacity of {limit} elements reached")]
    CapacityExceeded { limit: usize },

    #[error("Output {index} out of range for '{name}' ({len} outputs)")]
    OutputOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },
}

pub type NetworkResult<T> = Result<T, NetworkError>;

impl From<NetworkError> for HfError {
    fn from(err: NetworkError) -> Self {
        HfError::Invariant {
            what: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = NetworkError::AmbiguousBranches {
            name: "T1".into(),
            connected: 2,
        };
        assert_eq!(err.to_string(), "Cannot delete 'T1': 2 outputs are connected");
    }

    #[test]
    fn error_conversion() {
        let err: HfError = NetworkError::NotFound { name: "x".into() }.into();
        assert!(matches!(err, HfError::Invariant { .. }));
    }
}
