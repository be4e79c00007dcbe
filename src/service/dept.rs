// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Department management.

use std::cmp::Reverse;

use crate::models::{Dept, DeptPayload, Emp};
use crate::storage::{self, Store, DEPT_NAME};

use super::{not_found, now, ServiceError, ServiceResult};

pub const DEPT_HAS_EMPLOYEES_MSG: &str = "部门下有员工，不能删除";

pub struct DeptService<'a> {
    store: &'a Store,
}

impl<'a> DeptService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// All departments, most recently updated first.
    pub fn list(&self) -> ServiceResult<Vec<Dept>> {
        let mut depts = self.store.all::<Dept>()?;
        depts.sort_by_key(|d| Reverse((d.update_time, d.id)));
        Ok(depts)
    }

    pub fn get(&self, id: u64) -> ServiceResult<Dept> {
        self.store.get(id)?.ok_or_else(|| not_found("dept", id))
    }

    pub fn add(&self, payload: DeptPayload) -> ServiceResult<Dept> {
        self.store.write(|txn| -> ServiceResult<_> {
            let id = storage::next_id::<Dept>(txn)?;
            storage::claim_unique(txn, DEPT_NAME, &payload.name, id)?;

            let now = now();
            let dept = Dept {
                id,
                name: payload.name,
                create_time: now,
                update_time: now,
            };
            storage::put(txn, &dept)?;
            Ok(dept)
        })
    }

    /// Rename a department; `payload.id` selects it.
    pub fn update(&self, payload: DeptPayload) -> ServiceResult<Dept> {
        let id = payload.id.unwrap_or_default();
        self.store.write(|txn| -> ServiceResult<_> {
            let mut dept: Dept = storage::fetch(txn, id)?.ok_or_else(|| not_found("dept", id))?;
            storage::rebind_unique(txn, DEPT_NAME, &dept.name, &payload.name, id)?;

            dept.name = payload.name;
            dept.update_time = now();
            storage::put(txn, &dept)?;
            Ok(dept)
        })
    }

    /// Delete a department that no employee belongs to.
    pub fn delete(&self, id: u64) -> ServiceResult<()> {
        self.store.write(|txn| -> ServiceResult<_> {
            let members = storage::load_all::<Emp>(txn)?
                .into_iter()
                .filter(|e| e.dept_id == Some(id))
                .count();
            if members > 0 {
                return Err(ServiceError::business(DEPT_HAS_EMPLOYEES_MSG));
            }

            if let Some(dept) = storage::remove::<Dept>(txn, id)? {
                storage::release_unique(txn, DEPT_NAME, &dept.name, id)?;
            }
            Ok(())
        })
    }
}
