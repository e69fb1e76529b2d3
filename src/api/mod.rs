// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP surface: the GraphQL endpoint, the GraphiQL IDE, and health.
//!
//! The `/graphql` handler is the request authorizer: it runs bearer-token
//! extraction and verification once per request and injects the outcome
//! into the GraphQL request data, where the per-operation guard enforces
//! it before any resolver runs.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{extract_bearer_token, IdentityVerifier};
use crate::graphql::AuthState;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the identity verification pass for one request.
///
/// Downstream, the guard turns a `Rejected` outcome into an
/// unauthenticated error before any service call happens.
async fn authorize(headers: &HeaderMap, verifier: &dyn IdentityVerifier) -> AuthState {
    let token = match extract_bearer_token(headers) {
        Ok(token) => token,
        Err(err) => return AuthState::Rejected(err),
    };
    match verifier.verify(token).await {
        Ok(user) => AuthState::Verified(user),
        Err(err) => AuthState::Rejected(err),
    }
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let auth = authorize(&headers, state.verifier.as_ref()).await;
    if let AuthState::Rejected(ref err) = auth {
        tracing::debug!(reason = err.error_code(), "request failed authentication");
    }
    state.schema.execute(req.into_inner().data(auth)).await.into()
}

async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Health check response for liveness probes.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: String,
    /// JWKS cache state ("ok" when keys are cached, "cold" before the
    /// first successful fetch). Absent when no JWKS manager is wired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks: Option<String>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let jwks = match &state.jwks {
        Some(manager) => {
            let status = if manager.is_cached().await { "ok" } else { "cold" };
            Some(status.to_string())
        }
        None => None,
    };
    Json(HealthResponse {
        status: "ok".to_string(),
        jwks,
    })
}
