// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Book entity and GraphQL input types.

use async_graphql::{InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BookError, FieldViolation};

/// A catalog entry.
///
/// Invariants: `name` is non-empty and `created_at <= updated_at` for every
/// persisted book. `id` is assigned by the store on insert and never reused
/// after deletion.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject, PartialEq, Eq)]
pub struct Book {
    /// Unique identifier for the book
    pub id: i64,
    /// Name/title of the book
    pub name: String,
    /// Description of the book
    pub description: String,
    /// Timestamp when the book was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the book was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new book.
#[derive(Debug, Clone, InputObject)]
pub struct CreateBookInput {
    /// Name/title of the book
    pub name: String,
    /// Description of the book
    pub description: String,
}

impl CreateBookInput {
    /// Both fields must be non-empty; whitespace-only counts as empty.
    /// A violation aborts the request before anything reaches the store.
    pub fn validate(&self) -> Result<(), BookError> {
        let mut violations = Vec::new();
        if self.name.trim().is_empty() {
            violations.push(FieldViolation {
                field: "name",
                message: "Book name must not be empty",
            });
        }
        if self.description.trim().is_empty() {
            violations.push(FieldViolation {
                field: "description",
                message: "Book description must not be empty",
            });
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(BookError::Validation(violations))
        }
    }
}

/// Input for updating an existing book.
///
/// Only present fields are applied; absent fields keep their current
/// values. A present name must be non-empty; a present description may be
/// any string.
#[derive(Debug, Clone, InputObject)]
pub struct UpdateBookInput {
    /// ID of the book to update
    pub id: i64,
    /// Updated name/title of the book
    pub name: Option<String>,
    /// Updated description of the book
    pub description: Option<String>,
}

impl UpdateBookInput {
    pub fn validate(&self) -> Result<(), BookError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(BookError::Validation(vec![FieldViolation {
                    field: "name",
                    message: "Book name must not be empty",
                }]));
            }
        }
        Ok(())
    }
}
