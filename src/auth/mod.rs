// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! This module provides Auth0 JWT authentication for the Bookshelf GraphQL API.
//!
//! ## Auth Flow
//!
//! 1. Client obtains an access token from Auth0
//! 2. Client sends `Authorization: Bearer <access token>`
//! 3. Server:
//!    - Fetches the Auth0 JWKS via HTTPS (cached, fetch rate-limited)
//!    - Verifies the RS256 signature, expiry, issuer, audience
//!    - Extracts:
//!      - `sub` → canonical `user_id`
//!      - `email` and `permissions` claims
//!
//! ## Security
//!
//! - Every GraphQL operation requires authentication
//! - JWT verification uses HTTPS-only JWKS fetching
//! - JWKS is cached with TTL; endpoint fetches are capped per minute
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod jwks;
pub mod verifier;

pub use claims::{AccessClaims, AuthenticatedUser};
pub use error::AuthError;
pub use jwks::JwksManager;
pub use verifier::{extract_bearer_token, Auth0Verifier, IdentityVerifier};
