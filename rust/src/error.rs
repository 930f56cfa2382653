//! Error handling and result types for the tree family.
//!
//! Absence of a key is an ordinary outcome and is reported through `Option`
//! by the core operations. The error type below covers the remaining cases:
//! the `try_*` helpers that turn absence into an error, degree validation at
//! construction time, and invariant checking.

use thiserror::Error;

/// Error type for tree operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Key not found in the tree.
    #[error("Key not found in tree")]
    KeyNotFound,
    /// Minimum degree below what a multiway tree can support.
    #[error("Invalid minimum degree: {degree} (minimum required: {min})")]
    InvalidDegree { degree: usize, min: usize },
    /// A structural invariant does not hold.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl TreeError {
    /// Create an InvalidDegree error
    pub fn invalid_degree(degree: usize, min: usize) -> Self {
        Self::InvalidDegree { degree, min }
    }

    /// Create an InvariantViolation with context
    pub fn invariant(context: &str, details: &str) -> Self {
        Self::InvariantViolation(format!("{}: {}", context, details))
    }

    /// Check if this error is a degree error
    pub fn is_degree_error(&self) -> bool {
        matches!(self, Self::InvalidDegree { .. })
    }

    /// Check if this error reports a broken invariant
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

/// Public result type for tree operations that may fail
pub type TreeResult<T> = Result<T, TreeError>;

/// Result type for key lookup operations
pub type KeyResult<T> = Result<T, TreeError>;

/// Result type for tree construction
pub type InitResult<T> = Result<T, TreeError>;

/// Result extension trait for attaching context to errors.
pub trait TreeResultExt<T> {
    /// Prefix invariant violations with additional context
    fn with_context(self, context: &str) -> TreeResult<T>;

    /// Log error and continue with default value
    fn or_default_with_log(self) -> T
    where
        T: Default;
}

impl<T> TreeResultExt<T> for Result<T, TreeError> {
    fn with_context(self, context: &str) -> TreeResult<T> {
        self.map_err(|e| match e {
            TreeError::InvariantViolation(msg) => TreeError::invariant(context, &msg),
            other => other,
        })
    }

    fn or_default_with_log(self) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(e) => {
                log::warn!("tree operation failed, using default: {}", e);
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(TreeError::KeyNotFound.to_string(), "Key not found in tree");
        assert_eq!(
            TreeError::invalid_degree(1, 2).to_string(),
            "Invalid minimum degree: 1 (minimum required: 2)"
        );
        assert_eq!(
            TreeError::invariant("AVL", "node 3 unbalanced").to_string(),
            "Invariant violation: AVL: node 3 unbalanced"
        );
    }

    #[test]
    fn test_with_context_only_touches_invariants() {
        let err: TreeResult<()> = Err(TreeError::invariant("leaf", "unsorted"));
        assert_eq!(
            err.with_context("B+ tree"),
            Err(TreeError::InvariantViolation(
                "B+ tree: leaf: unsorted".to_string()
            ))
        );

        let missing: TreeResult<()> = Err(TreeError::KeyNotFound);
        assert_eq!(missing.with_context("B+ tree"), Err(TreeError::KeyNotFound));
    }

    #[test]
    fn test_or_default_with_log() {
        let failed: TreeResult<usize> = Err(TreeError::KeyNotFound);
        assert_eq!(failed.or_default_with_log(), 0);
        let ok: TreeResult<usize> = Ok(7);
        assert_eq!(ok.or_default_with_log(), 7);
    }

    #[test]
    fn test_predicates() {
        assert!(TreeError::invalid_degree(0, 2).is_degree_error());
        assert!(!TreeError::KeyNotFound.is_degree_error());
        assert!(TreeError::invariant("a", "b").is_invariant_violation());
    }
}
