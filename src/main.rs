// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, path::Path, sync::Arc};

use tracing::info;
use tracing_subscriber::EnvFilter;

use bookshelf_server::api::router;
use bookshelf_server::auth::{Auth0Verifier, JwksManager};
use bookshelf_server::books::{BookService, RedbBookStore};
use bookshelf_server::config::{
    AUTH0_AUDIENCE_ENV, AUTH0_DOMAIN_ENV, DATABASE_PATH_ENV, DEFAULT_DATABASE_PATH, DEFAULT_HOST,
    DEFAULT_PORT, HOST_ENV, LOG_FORMAT_ENV, PORT_ENV,
};
use bookshelf_server::graphql::build_schema;
use bookshelf_server::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    // Identity provider configuration (both are required; tokens cannot be
    // verified without them)
    let auth0_domain = env::var(AUTH0_DOMAIN_ENV).expect("AUTH0_DOMAIN must be set");
    let audience = env::var(AUTH0_AUDIENCE_ENV).expect("AUTH0_AUDIENCE must be set");

    // Open the embedded book database
    let database_path =
        env::var(DATABASE_PATH_ENV).unwrap_or_else(|_| DEFAULT_DATABASE_PATH.to_string());
    let store =
        RedbBookStore::open(Path::new(&database_path)).expect("Failed to open book database");

    // Compose the schema and the verifier explicitly; the JWKS manager is
    // shared with the health endpoint.
    let schema = build_schema(BookService::new(Arc::new(store)));
    let jwks = JwksManager::new(format!("https://{auth0_domain}/.well-known/jwks.json"));
    let verifier = Auth0Verifier::new(jwks.clone(), format!("https://{auth0_domain}/"), audience);
    let state = AppState::new(schema, Arc::new(verifier)).with_jwks(jwks);

    let app = router(state);

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| DEFAULT_PORT.to_string())
        .parse()
        .unwrap_or(DEFAULT_PORT);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    info!(%addr, database = %database_path, "bookshelf server listening (GraphiQL at /graphql)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    info!("shutdown signal received");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    match env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
