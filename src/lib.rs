// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tlias - Training Institution Administration Service
//!
//! Backend for the admin console of a training institution: departments,
//! employees with their work history, classes and students, plus dashboard
//! reports and an audit trail of every mutating call.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers, router and OpenAPI docs (Axum)
//! - `auth` - Token issuing/verification and the request gate
//! - `service` - Business rules and transaction boundaries
//! - `storage` - Embedded database (redb) and uploaded files
//! - `error` - Normalization of every failure into a response

pub mod api;
pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod extractors;
pub mod models;
pub mod service;
pub mod state;
pub mod storage;
