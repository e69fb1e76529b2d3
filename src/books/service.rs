// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CRUD state transitions for the book catalog.

use std::sync::Arc;

use chrono::Utc;

use super::model::{Book, CreateBookInput, UpdateBookInput};
use super::store::{BookStore, NewBook};
use crate::error::BookError;

/// Book service: existence enforcement, partial-merge updates, deletion
/// confirmation. Holds the store behind the narrow [`BookStore`] seam.
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// All books, newest first (`created_at` descending, id descending on
    /// ties so the order stays deterministic). An empty catalog is a valid
    /// result.
    pub async fn list_all(&self) -> Result<Vec<Book>, BookError> {
        let mut books = self.store.find_all().await?;
        books.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(books)
    }

    /// Find a single book by id.
    pub async fn get_by_id(&self, id: i64) -> Result<Book, BookError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(BookError::NotFound(id))
    }

    /// Create a new book. Validation runs before anything touches the
    /// store; `created_at` and `updated_at` start out equal.
    pub async fn create(&self, input: CreateBookInput) -> Result<Book, BookError> {
        input.validate()?;

        let now = Utc::now();
        let book = self
            .store
            .insert(NewBook {
                name: input.name,
                description: input.description,
                created_at: now,
                updated_at: now,
            })
            .await?;

        tracing::debug!(book_id = book.id, "created book");
        Ok(book)
    }

    /// Update an existing book, applying only the fields present in the
    /// input and refreshing `updated_at`.
    ///
    /// Read-modify-write with no conflict detection: a concurrent delete
    /// between the existence check and the save surfaces as `NotFound` on
    /// the next read, and concurrent updates are last-writer-wins.
    pub async fn update(&self, input: UpdateBookInput) -> Result<Book, BookError> {
        input.validate()?;

        let mut book = self.get_by_id(input.id).await?;
        if let Some(name) = input.name {
            book.name = name;
        }
        if let Some(description) = input.description {
            book.description = description;
        }
        book.updated_at = Utc::now();

        self.store.save(&book).await?;
        tracing::debug!(book_id = book.id, "updated book");
        Ok(book)
    }

    /// Delete a book. The existence check runs first; a nonexistent id
    /// never reaches the store's delete call.
    pub async fn delete(&self, id: i64) -> Result<bool, BookError> {
        self.get_by_id(id).await?;
        self.store.delete_by_id(id).await?;
        tracing::debug!(book_id = id, "deleted book");
        Ok(true)
    }
}
