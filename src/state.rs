// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{IdentityVerifier, JwksManager};
use crate::graphql::BooksSchema;

/// Shared application state handed to the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    /// Executable GraphQL schema (carries the book service).
    pub schema: BooksSchema,
    /// Bearer-token verifier invoked once per request.
    pub verifier: Arc<dyn IdentityVerifier>,
    /// JWKS manager, exposed for health reporting.
    pub jwks: Option<JwksManager>,
}

impl AppState {
    pub fn new(schema: BooksSchema, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            schema,
            verifier,
            jwks: None,
        }
    }

    pub fn with_jwks(mut self, jwks: JwksManager) -> Self {
        self.jwks = Some(jwks);
        self
    }
}
