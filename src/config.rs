// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into an immutable [`AppConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the database, media and static files | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TOKEN_SIGNING_KEY` | HS256 secret for login tokens | `aGV4aXh1ZXl1YW4=` |
//! | `CORS_ALLOWED_ORIGINS` | Comma-separated origins, empty means permissive | Vite dev server |
//! | `MAX_UPLOAD_BYTES` | Request body limit | `10485760` |
//! | `SEED_ADMIN_USERNAME` | Create this employee at startup if missing | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::TokenConfig;

pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TOKEN_SIGNING_KEY_ENV: &str = "TOKEN_SIGNING_KEY";
pub const CORS_ALLOWED_ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";
pub const MAX_UPLOAD_BYTES_ENV: &str = "MAX_UPLOAD_BYTES";
pub const SEED_ADMIN_USERNAME_ENV: &str = "SEED_ADMIN_USERNAME";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Signing key shared with the legacy deployment so issued tokens stay valid.
pub const DEFAULT_SIGNING_KEY: &str = "aGV4aXh1ZXl1YW4=";

/// Tokens live for 12 hours from issuance.
pub const TOKEN_TTL: Duration = Duration::from_secs(12 * 60 * 60);

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Path substrings that bypass the auth gate.
pub const DEFAULT_ALLOW_LIST: &[&str] = &["/login", "/media/", "/static/"];

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Format named by `LOG_FORMAT`, read before the subscriber exists.
    pub fn from_env() -> Self {
        env::var(LOG_FORMAT_ENV)
            .map(|value| Self::parse(&value))
            .unwrap_or(LogFormat::Pretty)
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Process-wide configuration, immutable after startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub token: TokenConfig,
    pub allow_list: Vec<String>,
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub seed_admin_username: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::with_data_dir(DEFAULT_DATA_DIR)
    }
}

impl AppConfig {
    /// Defaults rooted at `data_dir` (used by tests and as the env baseline).
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: data_dir.into(),
            token: TokenConfig::new(DEFAULT_SIGNING_KEY, TOKEN_TTL),
            allow_list: DEFAULT_ALLOW_LIST.iter().map(|s| s.to_string()).collect(),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            seed_admin_username: None,
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let mut config = Self::with_data_dir(data_dir);

        if let Ok(host) = env::var(HOST_ENV) {
            config.host = host;
        }

        if let Ok(port) = env::var(PORT_ENV) {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(value = %port, "Invalid PORT, using default"),
            }
        }

        if let Ok(key) = env::var(TOKEN_SIGNING_KEY_ENV) {
            if key.is_empty() {
                tracing::warn!("Empty TOKEN_SIGNING_KEY, using default");
            } else {
                config.token = TokenConfig::new(key, TOKEN_TTL);
            }
        }

        if let Ok(origins) = env::var(CORS_ALLOWED_ORIGINS_ENV) {
            config.cors_origins = split_list(&origins);
        }

        if let Ok(limit) = env::var(MAX_UPLOAD_BYTES_ENV) {
            match limit.parse() {
                Ok(limit) => config.max_upload_bytes = limit,
                Err(_) => tracing::warn!(value = %limit, "Invalid MAX_UPLOAD_BYTES, using default"),
            }
        }

        config.seed_admin_username = env::var(SEED_ADMIN_USERNAME_ENV)
            .ok()
            .filter(|name| !name.trim().is_empty());

        config
    }

    /// Location of the embedded database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("tlias.redb")
    }

    /// Directory uploaded files are written to and served from under `/media`.
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join("media")
    }

    /// Directory served under `/static`.
    pub fn static_dir(&self) -> PathBuf {
        self.data_dir.join("static")
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
