// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH0_DOMAIN` | Auth0 tenant domain (e.g. `tenant.auth0.com`) | Required |
//! | `AUTH0_AUDIENCE` | Expected JWT audience (the API identifier) | Required |
//! | `DATABASE_PATH` | Path of the embedded book database | `books.redb` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `4000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the Auth0 tenant domain.
///
/// The JWKS URL (`https://{domain}/.well-known/jwks.json`) and the expected
/// issuer (`https://{domain}/`) are derived from it.
pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";

/// Environment variable name for the expected JWT audience claim.
pub const AUTH0_AUDIENCE_ENV: &str = "AUTH0_AUDIENCE";

/// Environment variable name for the embedded database path.
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the logging format selector.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default embedded database path, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "books.redb";

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 4000;
