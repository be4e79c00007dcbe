// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Employee log: one line per "add employee" attempt.
//!
//! Each line is written in its own transaction so it survives a rolled-back
//! save.

use crate::models::EmpLog;
use crate::storage::{self, Store, StoreResult};

use super::now;

pub struct EmpLogService<'a> {
    store: &'a Store,
}

impl<'a> EmpLogService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn record(&self, info: impl Into<String>) -> StoreResult<EmpLog> {
        let info = info.into();
        self.store.write(|txn| -> StoreResult<_> {
            let log = EmpLog {
                id: storage::next_id::<EmpLog>(txn)?,
                operate_time: now(),
                info,
            };
            storage::put(txn, &log)?;
            Ok(log)
        })
    }
}
