//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent structural violations raised at the call site.
///
/// Lookups that simply miss (delete, remove, get) return `Option` instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("duplicate {kind}: {key}")]
    DuplicateKey { kind: &'static str, key: String },

    #[error("missing reference: node '{0}' does not exist")]
    MissingReference(String),

    #[error("self-loop rejected on node '{0}'")]
    SelfLoop(String),

    #[error("{what} exceeded its limit of {limit}")]
    CapacityExceeded { what: &'static str, limit: usize },

    #[error("negative weight {weight} on edge {source_name} -> {target_name}")]
    NegativeWeight {
        source_name: String,
        target_name: String,
        weight: f64,
    },
}

impl DomainError {
    pub(crate) fn duplicate_node(name: &str) -> Self {
        Self::DuplicateKey {
            kind: "node",
            key: name.to_string(),
        }
    }

    pub(crate) fn duplicate_edge(source: &str, target: &str) -> Self {
        Self::DuplicateKey {
            kind: "edge",
            key: format!("{source} -> {target}"),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
