// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use async_graphql::{Error, ErrorExtensions};
use thiserror::Error as ThisError;

/// Authentication error type.
///
/// Every variant collapses to an unauthenticated GraphQL error at the
/// transport boundary; `error_code` preserves the precise reason for
/// clients and logs.
#[derive(Debug, ThisError)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingAuthHeader,
    /// Invalid authorization header format
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Token is malformed
    #[error("Token is malformed")]
    MalformedToken,
    /// Token signature is invalid
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,
    /// Token is not yet valid
    #[error("Token is not yet valid")]
    TokenNotYetValid,
    /// Token issuer is invalid
    #[error("Token issuer is invalid")]
    InvalidIssuer,
    /// Token audience is invalid
    #[error("Token audience is invalid")]
    InvalidAudience,
    /// JWKS fetch failed
    #[error("Failed to fetch JWKS: {0}")]
    JwksFetch(String),
    /// JWKS endpoint fetch budget exhausted
    #[error("JWKS fetch budget exhausted")]
    JwksRateLimited,
    /// No matching key in JWKS
    #[error("No matching key found in JWKS")]
    NoMatchingKey,
    /// A JWKS key could not be used for verification
    #[error("Unusable signing key in JWKS: {0}")]
    KeyRejected(String),
}

impl AuthError {
    /// Get the stable error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::InvalidAudience => "invalid_audience",
            AuthError::JwksFetch(_) => "jwks_fetch_error",
            AuthError::JwksRateLimited => "jwks_rate_limited",
            AuthError::NoMatchingKey => "no_matching_key",
            AuthError::KeyRejected(_) => "key_rejected",
        }
    }
}

impl ErrorExtensions for AuthError {
    fn extend(&self) -> Error {
        Error::new(self.to_string()).extend_with(|_, ext| {
            ext.set("code", "UNAUTHENTICATED");
            ext.set("reason", self.error_code());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(AuthError::MissingAuthHeader.error_code(), "missing_auth_header");
        assert_eq!(AuthError::TokenExpired.error_code(), "token_expired");
        assert_eq!(
            AuthError::JwksFetch("timeout".into()).error_code(),
            "jwks_fetch_error"
        );
        assert_eq!(AuthError::JwksRateLimited.error_code(), "jwks_rate_limited");
    }

    #[test]
    fn extend_carries_message_and_extensions() {
        let err = AuthError::InvalidSignature.extend();
        assert_eq!(err.message, "Token signature is invalid");
        assert!(err.extensions.is_some());
    }
}
