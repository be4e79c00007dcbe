// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthGate, TokenIssuer, TokenVerifier};
use crate::config::AppConfig;
use crate::storage::{Store, StoreResult, UploadStorage};

/// Shared, immutable handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<Store>,
    pub uploads: Arc<UploadStorage>,
    pub issuer: Arc<TokenIssuer>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Store) -> Self {
        Self {
            uploads: Arc::new(UploadStorage::new(config.media_dir())),
            issuer: Arc::new(TokenIssuer::new(&config.token)),
            verifier: Arc::new(TokenVerifier::new(&config.token)),
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }

    /// Open the database named by `config` and build the state around it.
    pub fn open(config: AppConfig) -> StoreResult<Self> {
        let store = Store::open(&config.database_path())?;
        Ok(Self::new(config, store))
    }

    pub fn auth_gate(&self) -> AuthGate {
        AuthGate::new(self.verifier.clone(), self.config.allow_list.clone())
    }
}
