// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! GraphQL schema: query/mutation roots and the authentication guard.
//!
//! The roots carry no business logic; each operation checks the guard,
//! reads the verified caller from the request context, and dispatches to
//! the book service. The schema is composed from concrete instances at
//! startup; there is no runtime wiring beyond `build_schema`.

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Guard, Object, Result, Schema};

use crate::auth::{AuthError, AuthenticatedUser};
use crate::books::{Book, BookService, CreateBookInput, UpdateBookInput};

/// Outcome of the per-request authorization pass.
///
/// The HTTP layer verifies the bearer token once per request and injects
/// this into the GraphQL request data; resolvers and the guard read it
/// from context.
pub enum AuthState {
    /// The caller presented a valid token.
    Verified(AuthenticatedUser),
    /// Verification failed; the precise reason is preserved.
    Rejected(AuthError),
}

/// Guard applied to every operation: only verified callers get through,
/// and rejected requests never reach the book service.
pub struct AuthGuard;

impl Guard for AuthGuard {
    async fn check(&self, ctx: &Context<'_>) -> Result<()> {
        match ctx.data_opt::<AuthState>() {
            Some(AuthState::Verified(_)) => Ok(()),
            Some(AuthState::Rejected(err)) => Err(err.extend()),
            None => Err(AuthError::MissingAuthHeader.extend()),
        }
    }
}

/// The verified caller for this request. Guarded resolvers can rely on
/// presence; anything else is an authorization bug, reported as such.
fn current_user<'a>(ctx: &'a Context<'_>) -> Result<&'a AuthenticatedUser> {
    match ctx.data_opt::<AuthState>() {
        Some(AuthState::Verified(user)) => Ok(user),
        _ => Err(AuthError::MissingAuthHeader.extend()),
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Get all books
    #[graphql(guard = "AuthGuard")]
    async fn books(&self, ctx: &Context<'_>) -> Result<Vec<Book>> {
        let user = current_user(ctx)?;
        tracing::debug!(user_id = %user.user_id, "listing books");
        let service = ctx.data::<BookService>()?;
        service.list_all().await.map_err(|e| e.extend())
    }

    /// Get a single book by ID
    #[graphql(guard = "AuthGuard")]
    async fn book(&self, ctx: &Context<'_>, id: i64) -> Result<Book> {
        let user = current_user(ctx)?;
        tracing::debug!(user_id = %user.user_id, book_id = id, "fetching book");
        let service = ctx.data::<BookService>()?;
        service.get_by_id(id).await.map_err(|e| e.extend())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a new book
    #[graphql(guard = "AuthGuard")]
    async fn create_book(
        &self,
        ctx: &Context<'_>,
        create_book_input: CreateBookInput,
    ) -> Result<Book> {
        let user = current_user(ctx)?;
        tracing::debug!(user_id = %user.user_id, "creating book");
        let service = ctx.data::<BookService>()?;
        service.create(create_book_input).await.map_err(|e| e.extend())
    }

    /// Update an existing book
    #[graphql(guard = "AuthGuard")]
    async fn update_book(
        &self,
        ctx: &Context<'_>,
        update_book_input: UpdateBookInput,
    ) -> Result<Book> {
        let user = current_user(ctx)?;
        tracing::debug!(user_id = %user.user_id, book_id = update_book_input.id, "updating book");
        let service = ctx.data::<BookService>()?;
        service.update(update_book_input).await.map_err(|e| e.extend())
    }

    /// Delete a book; returns true on successful deletion
    #[graphql(guard = "AuthGuard")]
    async fn delete_book(&self, ctx: &Context<'_>, id: i64) -> Result<bool> {
        let user = current_user(ctx)?;
        tracing::debug!(user_id = %user.user_id, book_id = id, "deleting book");
        let service = ctx.data::<BookService>()?;
        service.delete(id).await.map_err(|e| e.extend())
    }
}

/// The executable schema for the book catalog.
pub type BooksSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema around a concrete book service.
pub fn build_schema(service: BookService) -> BooksSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(service)
        .finish()
}
