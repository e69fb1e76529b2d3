// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Domain errors for book operations.

use async_graphql::{Error, ErrorExtensions};
use thiserror::Error as ThisError;

use crate::books::store::StoreError;

/// A single input field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

/// Errors produced by the book service.
#[derive(Debug, ThisError)]
pub enum BookError {
    /// The referenced book does not exist.
    #[error("Book with ID {0} not found")]
    NotFound(i64),

    /// Input failed validation; nothing was written.
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// The store failed; surfaced as an internal error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ErrorExtensions for BookError {
    fn extend(&self) -> Error {
        Error::new(self.to_string()).extend_with(|_, ext| match self {
            BookError::NotFound(_) => ext.set("code", "NOT_FOUND"),
            BookError::Validation(violations) => {
                ext.set("code", "BAD_USER_INPUT");
                for violation in violations {
                    ext.set(violation.field, violation.message);
                }
            }
            BookError::Store(_) => ext.set("code", "INTERNAL_SERVER_ERROR"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_id() {
        assert_eq!(
            BookError::NotFound(42).to_string(),
            "Book with ID 42 not found"
        );
    }

    #[test]
    fn validation_message_joins_violations() {
        let err = BookError::Validation(vec![
            FieldViolation {
                field: "name",
                message: "Book name must not be empty",
            },
            FieldViolation {
                field: "description",
                message: "Book description must not be empty",
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: Book name must not be empty; Book description must not be empty"
        );
    }

    #[test]
    fn extend_attaches_extensions() {
        let err = BookError::NotFound(7).extend();
        assert_eq!(err.message, "Book with ID 7 not found");
        assert!(err.extensions.is_some());
    }
}
