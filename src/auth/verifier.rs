// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token extraction and JWT verification.
//!
//! `extract_bearer_token` pulls the raw token out of request headers;
//! [`IdentityVerifier`] is the seam the request authorizer calls through,
//! with [`Auth0Verifier`] as the production implementation. Alternative
//! identity providers plug in by implementing the trait.

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};

use super::claims::{AccessClaims, AuthenticatedUser};
use super::error::AuthError;
use super::jwks::JwksManager;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Extract the bearer token from the `Authorization` header.
///
/// The scheme match is case-insensitive per RFC 7235. Fails with
/// `MissingAuthHeader` when the header is absent and `InvalidAuthHeader`
/// when it is not a well-formed `Bearer <token>` value.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Verifies a bearer token and resolves the caller it belongs to.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` and produce the authenticated caller, or the precise
    /// reason the token was rejected.
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// Production verifier for Auth0-issued RS256 access tokens.
pub struct Auth0Verifier {
    jwks: JwksManager,
    issuer: String,
    audience: String,
}

impl Auth0Verifier {
    /// Create a verifier from an already-configured JWKS manager.
    pub fn new(jwks: JwksManager, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            jwks,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Create a verifier for an Auth0 tenant domain.
    ///
    /// Derives the JWKS URL (`https://{domain}/.well-known/jwks.json`) and
    /// the expected issuer (`https://{domain}/`) the way Auth0 publishes them.
    pub fn for_domain(domain: &str, audience: impl Into<String>) -> Self {
        Self::new(
            JwksManager::new(format!("https://{domain}/.well-known/jwks.json")),
            format!("https://{domain}/"),
            audience,
        )
    }

    /// The JWKS manager backing this verifier.
    pub fn jwks(&self) -> &JwksManager {
        &self.jwks
    }
}

#[async_trait]
impl IdentityVerifier for Auth0Verifier {
    async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        // Decode the header to learn which published key signed the token.
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let decoding_key = self.jwks.get_decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data =
            decode::<AccessClaims>(token, &decoding_key, &validation).map_err(map_jwt_error)?;

        Ok(AuthenticatedUser::from_claims(token_data.claims))
    }
}

/// Map `jsonwebtoken` failures onto the auth taxonomy.
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::InvalidAudience,
        jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        _ => AuthError::MalformedToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extract_requires_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            extract_bearer_token(&headers),
            Err(AuthError::MissingAuthHeader)
        ));
    }

    #[test]
    fn extract_accepts_bearer_scheme_case_insensitively() {
        assert_eq!(
            extract_bearer_token(&headers_with("Bearer abc.def.ghi")).unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(
            extract_bearer_token(&headers_with("bearer abc.def.ghi")).unwrap(),
            "abc.def.ghi"
        );
    }

    #[test]
    fn extract_rejects_other_schemes_and_empty_tokens() {
        assert!(matches!(
            extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            extract_bearer_token(&headers_with("Bearer ")),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            extract_bearer_token(&headers_with("token-without-scheme")),
            Err(AuthError::InvalidAuthHeader)
        ));
    }

    #[tokio::test]
    async fn verify_rejects_garbage_tokens_before_any_key_fetch() {
        let verifier = Auth0Verifier::for_domain("tenant.auth0.com", "https://books.example.com");
        let result = verifier.verify("not-a-jwt").await;
        assert!(matches!(result, Err(AuthError::MalformedToken)));
    }

    #[test]
    fn for_domain_derives_auth0_endpoints() {
        let verifier = Auth0Verifier::for_domain("tenant.auth0.com", "https://books.example.com");
        assert_eq!(
            verifier.jwks().jwks_url(),
            "https://tenant.auth0.com/.well-known/jwks.json"
        );
        assert_eq!(verifier.issuer, "https://tenant.auth0.com/");
        assert_eq!(verifier.audience, "https://books.example.com");
    }

    #[test]
    fn jwt_error_kinds_map_onto_taxonomy() {
        use jsonwebtoken::errors::ErrorKind;
        assert!(matches!(
            map_jwt_error(ErrorKind::ExpiredSignature.into()),
            AuthError::TokenExpired
        ));
        assert!(matches!(
            map_jwt_error(ErrorKind::InvalidSignature.into()),
            AuthError::InvalidSignature
        ));
        assert!(matches!(
            map_jwt_error(ErrorKind::InvalidIssuer.into()),
            AuthError::InvalidIssuer
        ));
        assert!(matches!(
            map_jwt_error(ErrorKind::InvalidAudience.into()),
            AuthError::InvalidAudience
        ));
        assert!(matches!(
            map_jwt_error(ErrorKind::InvalidToken.into()),
            AuthError::MalformedToken
        ));
    }
}
