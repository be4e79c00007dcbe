// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Domain Services
//!
//! One service per resource. Services enforce business rules, own the
//! transaction boundaries and return entities; they never see HTTP types.
//!
//! Rule violations surface as [`ServiceError::Business`] carrying the message
//! shown to the user. Store faults propagate unchanged so the API layer can
//! tell duplicate keys apart from everything else.

use chrono::{Local, NaiveDateTime, Timelike};

use crate::auth::TokenError;
use crate::storage::StoreError;

pub mod clazz;
pub mod dept;
pub mod emp;
pub mod emp_log;
pub mod operate_log;
pub mod report;
pub mod student;

pub use clazz::ClazzService;
pub use dept::DeptService;
pub use emp::EmpService;
pub use emp_log::EmpLogService;
pub use operate_log::{OperateLogService, OperationRecord};
pub use report::ReportService;
pub use student::StudentService;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Declared rule violation with a user-facing message.
    #[error("{0}")]
    Business(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ServiceError {
    pub fn business(message: impl Into<String>) -> Self {
        ServiceError::Business(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Local wall-clock time at second precision, as stored and rendered.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Case-insensitive substring match used by the name filters.
pub(crate) fn name_matches(name: &str, filter: Option<&str>) -> bool {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(filter) => name.to_lowercase().contains(&filter.to_lowercase()),
        None => true,
    }
}

pub(crate) fn not_found(kind: &str, id: u64) -> ServiceError {
    ServiceError::Store(StoreError::NotFound(format!("{kind} {id}")))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_filter_is_case_insensitive_and_ignores_blank() {
        assert!(name_matches("Java 就业班", Some("java")));
        assert!(name_matches("Java 就业班", Some("  ")));
        assert!(name_matches("Java 就业班", None));
        assert!(!name_matches("Java 就业班", Some("前端")));
    }

    #[test]
    fn now_has_no_subsecond_part() {
        assert_eq!(now().nanosecond(), 0);
    }
}
