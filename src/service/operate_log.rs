// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Operation log for mutating API calls.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::models::{Emp, OperateLog, OperateLogRow, PageResult, Paging};
use crate::storage::{self, Store, StoreResult};

use super::{now, ServiceResult};

/// Longest params/return text kept, in characters.
pub const MAX_LOGGED_CHARS: usize = 2000;

/// Cap `text` at [`MAX_LOGGED_CHARS`], marking the cut with `...`.
pub fn truncate_logged(text: &str) -> String {
    if text.chars().count() <= MAX_LOGGED_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_LOGGED_CHARS - 3).collect();
    cut.push_str("...");
    cut
}

/// One mutating call waiting to be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub operate_emp_id: Option<u64>,
    pub class_name: String,
    pub method_name: String,
    pub method_params: String,
    pub return_value: String,
    pub cost_time: i64,
}

impl OperationRecord {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            operate_emp_id: None,
            class_name: class_name.into(),
            method_name: method_name.into(),
            method_params: String::new(),
            return_value: String::new(),
            cost_time: 0,
        }
    }

    pub fn by(mut self, emp_id: Option<u64>) -> Self {
        self.operate_emp_id = emp_id;
        self
    }

    pub fn with_params(mut self, params: &str) -> Self {
        self.method_params = truncate_logged(params);
        self
    }

    pub fn with_return(mut self, value: &str) -> Self {
        self.return_value = truncate_logged(value);
        self
    }

    pub fn with_cost_ms(mut self, ms: i64) -> Self {
        self.cost_time = ms;
        self
    }
}

pub struct OperateLogService<'a> {
    store: &'a Store,
}

impl<'a> OperateLogService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Persist a record in its own transaction.
    pub fn record(&self, record: OperationRecord) -> StoreResult<OperateLog> {
        self.store.write(|txn| -> StoreResult<_> {
            let log = OperateLog {
                id: storage::next_id::<OperateLog>(txn)?,
                operate_emp_id: record.operate_emp_id,
                operate_time: now(),
                class_name: record.class_name,
                method_name: record.method_name,
                method_params: record.method_params,
                return_value: record.return_value,
                cost_time: record.cost_time,
            };
            storage::put(txn, &log)?;
            Ok(log)
        })
    }

    /// Newest entries first, each with the operator's name.
    pub fn page(&self, paging: Paging) -> ServiceResult<PageResult<OperateLogRow>> {
        let mut logs = self.store.all::<OperateLog>()?;
        logs.sort_by_key(|l| Reverse((l.operate_time, l.id)));
        let page = paging.apply(logs);

        let names: HashMap<u64, String> = self
            .store
            .all::<Emp>()?
            .into_iter()
            .map(|e| (e.id, e.name))
            .collect();

        let rows = page
            .rows
            .into_iter()
            .map(|log| OperateLogRow {
                operate_emp_name: log.operate_emp_id.and_then(|id| names.get(&id).cloned()),
                log,
            })
            .collect();
        Ok(PageResult {
            total: page.total,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmpPayload;
    use crate::service::test_support::temp_store;
    use crate::service::EmpService;

    #[test]
    fn truncation_keeps_short_text() {
        assert_eq!(truncate_logged("{\"id\":1}"), "{\"id\":1}");
        let exact = "字".repeat(MAX_LOGGED_CHARS);
        assert_eq!(truncate_logged(&exact), exact);
    }

    #[test]
    fn truncation_cuts_long_text_on_char_boundary() {
        let long = "字".repeat(MAX_LOGGED_CHARS + 1);
        let cut = truncate_logged(&long);
        assert_eq!(cut.chars().count(), MAX_LOGGED_CHARS);
        assert!(cut.ends_with("字..."));
    }

    #[test]
    fn page_is_newest_first_with_operator_name() {
        let (_dir, store) = temp_store();
        let emp = EmpService::new(&store)
            .save(EmpPayload {
                username: "songjiang".into(),
                name: "宋江".into(),
                gender: 1,
                phone: "13300000001".into(),
                ..Default::default()
            })
            .unwrap();

        let service = OperateLogService::new(&store);
        service
            .record(OperationRecord::new("dept", "POST").by(Some(emp.id)).with_cost_ms(3))
            .unwrap();
        service
            .record(OperationRecord::new("dept", "DELETE").by(Some(999)).with_params("{\"id\":\"1\"}"))
            .unwrap();
        service.record(OperationRecord::new("emp", "PUT")).unwrap();

        let page = service.page(Paging::new(Some(1), Some(2))).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.rows[0].log.method_name, "PUT");
        assert_eq!(page.rows[0].operate_emp_name, None);
        assert_eq!(page.rows[1].log.method_params, "{\"id\":\"1\"}");
        assert_eq!(page.rows[1].operate_emp_name, None);

        let last = service.page(Paging::new(Some(2), Some(2))).unwrap();
        assert_eq!(last.rows[0].operate_emp_name.as_deref(), Some("宋江"));
        assert_eq!(last.rows[0].log.cost_time, 3);
    }
}
