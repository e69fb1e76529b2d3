// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated caller representation.

use serde::Deserialize;

/// Claims read from a verified Auth0 access token.
///
/// Standard claims (`exp`, `iss`, `aud`) are enforced by the `jsonwebtoken`
/// validation step and are not re-read here; only the fields that feed the
/// caller identity are deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    /// Subject - the canonical Auth0 user identifier.
    pub sub: String,

    /// Email claim, present when the token was issued with the email scope.
    #[serde(default)]
    pub email: Option<String>,

    /// Permissions granted to the token (Auth0 RBAC). Absent claim means none.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Authenticated caller extracted from a verified JWT.
///
/// This is the primary type used throughout the application to represent
/// who is making the current request. It lives for one request and is
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Canonical user ID (Auth0 `sub` claim)
    pub user_id: String,

    /// Email address, when the token carries one
    pub email: Option<String>,

    /// Permissions granted to the token
    pub permissions: Vec<String>,
}

impl AuthenticatedUser {
    /// Create from verified access-token claims.
    pub fn from_claims(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            permissions: claims.permissions,
        }
    }

    /// Check whether the token carries the given permission.
    ///
    /// All book operations currently require authentication only; this is
    /// the hook for finer-grained checks if operations ever diverge.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}
