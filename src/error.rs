//! Diagnostic error types for the echograph engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so callers know exactly what went wrong
//! and how to fix it. Recoverable conditions (strategy fallbacks, degraded
//! extraction, scorer non-convergence) are handled locally and never surface here.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the echograph engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum EchoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Partition(#[from] PartitionError),
}

// ---------------------------------------------------------------------------
// Network errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum NetworkError {
    #[error("source name must not be empty")]
    #[diagnostic(
        code(echo::network::empty_name),
        help("Every source is identified by its display name. Pass a non-empty name.")
    )]
    EmptyName,

    #[error("citation {role} name must not be empty")]
    #[diagnostic(
        code(echo::network::empty_endpoint),
        help(
            "Citations with a missing endpoint are rejected before any state \
             is mutated. Fill in both endpoint names, or drop the record."
        )
    )]
    EmptyEndpoint { role: &'static str },
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RegistryError {
    #[error("failed to read registry file: {source}")]
    #[diagnostic(
        code(echo::registry::io),
        help("Check that the registry file exists and is readable.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse registry file: {message}")]
    #[diagnostic(
        code(echo::registry::parse),
        help(
            "The registry is a TOML file with `[[source]]` tables carrying \
             `name`, `domain`, and an optional `bias` key."
        )
    )]
    Parse { message: String },
}

// ---------------------------------------------------------------------------
// Partition errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum PartitionError {
    #[error("graph has no edges to partition")]
    #[diagnostic(
        code(echo::partition::no_edges),
        help(
            "The modularity objective is undefined on an edgeless graph. \
             The chamber detector falls back to bias-label grouping in this case."
        )
    )]
    NoEdges,
}

/// Convenience alias for functions returning echograph results.
pub type EchoResult<T> = std::result::Result<T, EchoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_converts_to_echo_error() {
        let err = NetworkError::EmptyName;
        let echo: EchoError = err.into();
        assert!(matches!(echo, EchoError::Network(NetworkError::EmptyName)));
    }

    #[test]
    fn partition_error_converts_to_echo_error() {
        let err = PartitionError::NoEdges;
        let echo: EchoError = err.into();
        assert!(matches!(echo, EchoError::Partition(PartitionError::NoEdges)));
    }

    #[test]
    fn error_display_names_the_endpoint_role() {
        let err = NetworkError::EmptyEndpoint { role: "target" };
        let msg = format!("{err}");
        assert!(msg.contains("target"));
    }
}
