// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token-based authentication for the admin API.
//!
//! ## Auth Flow
//!
//! 1. `POST /login` checks username and password and issues an HS256 token
//!    carrying `{id, username, exp}`
//! 2. The frontend sends the token back in the `token` header
//! 3. The gate middleware:
//!    - Lets allow-listed paths through untouched
//!    - Verifies signature and expiry (no leeway)
//!    - Attaches the [`Principal`] to the request extensions
//!
//! Tokens are stateless and expire 12 hours after issuance. There is no
//! revocation list.

pub mod error;
pub mod gate;
pub mod principal;
pub mod token;

pub use error::AuthError;
pub use gate::{auth_gate, AuthGate, TOKEN_HEADER};
pub use principal::Principal;
pub use token::{Claims, TokenConfig, TokenError, TokenIssuer, TokenVerifier};
