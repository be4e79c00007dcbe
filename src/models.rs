// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Entities persisted in the store, request payloads, query parameters and
//! the response rows built from them. JSON uses camelCase field names.
//!
//! ## Date and Time Format
//!
//! Timestamps are local time rendered as `YYYY-MM-DD HH:MM:SS`; dates are
//! `YYYY-MM-DD`. Optional inputs accept `null`, an empty string, a number or
//! a numeric string, matching what the admin frontend sends.
//!
//! ## Model Categories
//!
//! - **Entities**: departments, employees, work history, classes, students, logs
//! - **Payloads**: create/update bodies and login credentials
//! - **Queries**: page filters for the list endpoints
//! - **Views**: page rows enriched with related names, report series

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

// =============================================================================
// Serde helpers
// =============================================================================

/// `YYYY-MM-DD HH:MM:SS` encoding for [`NaiveDateTime`].
pub mod datetime_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Forgiving decoding for optional form values.
///
/// `null`, a missing field and `""` all become `None`. Strings are parsed
/// with [`FromStr`](std::str::FromStr); any other JSON value is decoded as-is.
pub mod lenient {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::de::{DeserializeOwned, Error};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn opt<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + DeserializeOwned,
        T::Err: Display,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => s.trim().parse().map(Some).map_err(D::Error::custom),
            other => T::deserialize(other).map(Some).map_err(D::Error::custom),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

// =============================================================================
// Entities
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dept {
    pub id: u64,
    pub name: String,
    #[serde(with = "datetime_format")]
    #[schema(value_type = String, example = "2026-01-01 09:00:00")]
    pub create_time: NaiveDateTime,
    #[serde(with = "datetime_format")]
    #[schema(value_type = String, example = "2026-01-01 09:00:00")]
    pub update_time: NaiveDateTime,
}

/// Employee record. The password hash is kept in a separate table and never
/// leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Emp {
    pub id: u64,
    pub username: String,
    pub name: String,
    /// 1 male, 2 female.
    pub gender: u8,
    pub phone: String,
    pub job: Option<u8>,
    pub salary: Option<u32>,
    pub image: Option<String>,
    pub entry_date: Option<NaiveDate>,
    pub dept_id: Option<u64>,
    #[serde(with = "datetime_format")]
    #[schema(value_type = String)]
    pub create_time: NaiveDateTime,
    #[serde(with = "datetime_format")]
    #[schema(value_type = String)]
    pub update_time: NaiveDateTime,
}

/// One entry of an employee's work history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmpExpr {
    pub id: u64,
    pub emp_id: u64,
    pub begin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub company: Option<String>,
    pub job: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmpLog {
    pub id: u64,
    #[serde(with = "datetime_format")]
    #[schema(value_type = String)]
    pub operate_time: NaiveDateTime,
    pub info: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Clazz {
    pub id: u64,
    pub name: String,
    pub room: Option<String>,
    pub begin_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub master_id: Option<u64>,
    pub subject: Option<u8>,
    #[serde(with = "datetime_format")]
    #[schema(value_type = String)]
    pub create_time: NaiveDateTime,
    #[serde(with = "datetime_format")]
    #[schema(value_type = String)]
    pub update_time: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u64,
    pub name: String,
    pub no: String,
    pub gender: Option<u8>,
    pub phone: Option<String>,
    pub id_card: Option<String>,
    pub is_college: Option<u8>,
    pub address: Option<String>,
    pub degree: Option<u8>,
    pub graduation_date: Option<NaiveDate>,
    pub clazz_id: Option<u64>,
    pub violation_count: i32,
    pub violation_score: i32,
    #[serde(with = "datetime_format")]
    #[schema(value_type = String)]
    pub create_time: NaiveDateTime,
    #[serde(with = "datetime_format")]
    #[schema(value_type = String)]
    pub update_time: NaiveDateTime,
}

/// Audit record of one mutating API call.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperateLog {
    pub id: u64,
    pub operate_emp_id: Option<u64>,
    #[serde(with = "datetime_format")]
    #[schema(value_type = String)]
    pub operate_time: NaiveDateTime,
    pub class_name: String,
    pub method_name: String,
    pub method_params: String,
    pub return_value: String,
    pub cost_time: i64,
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct LoginInfo {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeptPayload {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub id: Option<u64>,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmpExprPayload {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub begin: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub job: Option<String>,
}

impl EmpExprPayload {
    /// Rows without a company name are form placeholders and are dropped.
    pub fn is_filled(&self) -> bool {
        !is_blank(&self.company)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmpPayload {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub id: Option<u64>,
    pub username: String,
    pub name: String,
    pub gender: u8,
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub job: Option<u8>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub salary: Option<u32>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub entry_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub dept_id: Option<u64>,
    #[serde(default)]
    pub expr_list: Vec<EmpExprPayload>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClazzPayload {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub room: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub begin_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub master_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub subject: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub id: Option<u64>,
    pub name: String,
    pub no: String,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub gender: Option<u8>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub id_card: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub is_college: Option<u8>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub degree: Option<u8>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub graduation_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub clazz_id: Option<u64>,
}

// =============================================================================
// Queries
// =============================================================================

/// Resolved paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: u64,
    pub page_size: u64,
}

impl Paging {
    /// Missing or zero values fall back to page 1 of 10.
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            page_size: page_size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Slice one page out of an already ordered list.
    pub fn apply<T>(&self, items: Vec<T>) -> PageResult<T> {
        let total = items.len() as u64;
        let skip = (self.page - 1).saturating_mul(self.page_size);
        let rows = items
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(self.page_size).unwrap_or(usize::MAX))
            .collect();
        PageResult { total, rows }
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EmpQuery {
    /// Substring of the employee name.
    #[serde(default, deserialize_with = "lenient::opt")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub gender: Option<u8>,
    /// Earliest entry date, inclusive. Used only together with `end`.
    #[serde(default, deserialize_with = "lenient::opt")]
    pub begin: Option<NaiveDate>,
    /// Latest entry date, inclusive. Used only together with `begin`.
    #[serde(default, deserialize_with = "lenient::opt")]
    pub end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClazzQuery {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub name: Option<String>,
    /// Earliest end date, inclusive. Used only together with `end`.
    #[serde(default, deserialize_with = "lenient::opt")]
    pub begin: Option<NaiveDate>,
    /// Latest end date, inclusive. Used only together with `begin`.
    #[serde(default, deserialize_with = "lenient::opt")]
    pub end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StudentQuery {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub degree: Option<u8>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub clazz_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub page_size: Option<u64>,
}

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct PageResult<T> {
    pub total: u64,
    pub rows: Vec<T>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmpRow {
    #[serde(flatten)]
    pub emp: Emp,
    pub dept_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmpDetail {
    #[serde(flatten)]
    pub emp: Emp,
    pub expr_list: Vec<EmpExpr>,
}

/// Lifecycle of a class relative to today.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
pub enum ClazzStatus {
    #[serde(rename = "未开班")]
    NotStarted,
    #[serde(rename = "已开班")]
    InProgress,
    #[serde(rename = "已结课")]
    Finished,
}

impl ClazzStatus {
    pub fn of(clazz: &Clazz, today: NaiveDate) -> Self {
        match (clazz.begin_date, clazz.end_date) {
            (Some(begin), _) if today < begin => ClazzStatus::NotStarted,
            (_, Some(end)) if today > end => ClazzStatus::Finished,
            _ => ClazzStatus::InProgress,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClazzRow {
    #[serde(flatten)]
    pub clazz: Clazz,
    pub master_name: Option<String>,
    pub status: ClazzStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    #[serde(flatten)]
    pub student: Student,
    pub clazz_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperateLogRow {
    #[serde(flatten)]
    pub log: OperateLog,
    pub operate_emp_name: Option<String>,
}

/// One slice of a pie chart.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct NameValue {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub job_list: Vec<String>,
    pub data_list: Vec<u64>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClazzCountReport {
    pub clazz_list: Vec<String>,
    pub data_list: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, datetime_format::FORMAT).unwrap()
    }

    #[test]
    fn entity_serializes_camel_case_with_local_time_format() {
        let dept = Dept {
            id: 1,
            name: "学工部".into(),
            create_time: at("2026-03-01 08:30:00"),
            update_time: at("2026-03-02 17:05:09"),
        };
        let value = serde_json::to_value(&dept).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "name": "学工部",
                "createTime": "2026-03-01 08:30:00",
                "updateTime": "2026-03-02 17:05:09"
            })
        );
        let back: Dept = serde_json::from_value(value).unwrap();
        assert_eq!(back, dept);
    }

    #[test]
    fn payload_accepts_blank_and_string_numbers() {
        let payload: EmpPayload = serde_json::from_value(json!({
            "username": "linchong",
            "name": "林冲",
            "gender": 1,
            "phone": "13300000001",
            "job": "2",
            "salary": "",
            "image": null,
            "entryDate": "2024-05-06",
            "deptId": 3,
            "exprList": [{ "company": "", "job": "x" }, { "company": "梁山", "begin": "" }]
        }))
        .unwrap();

        assert_eq!(payload.job, Some(2));
        assert_eq!(payload.salary, None);
        assert_eq!(payload.image, None);
        assert_eq!(payload.entry_date, NaiveDate::from_ymd_opt(2024, 5, 6));
        assert_eq!(payload.dept_id, Some(3));
        assert_eq!(payload.id, None);
        let filled: Vec<_> = payload.expr_list.iter().filter(|e| e.is_filled()).collect();
        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0].begin, None);
    }

    #[test]
    fn lenient_rejects_garbage_numbers() {
        let result: Result<DeptPayload, _> = serde_json::from_value(json!({ "id": "abc", "name": "x" }));
        assert!(result.is_err());
    }

    #[test]
    fn paging_defaults_and_slicing() {
        let paging = Paging::new(None, Some(0));
        assert_eq!(paging, Paging { page: 1, page_size: 10 });

        let page = Paging::new(Some(2), Some(3)).apply((1..=8).collect());
        assert_eq!(page.total, 8);
        assert_eq!(page.rows, vec![4, 5, 6]);

        let past_end = Paging::new(Some(9), Some(3)).apply((1..=8).collect::<Vec<i32>>());
        assert_eq!(past_end.total, 8);
        assert!(past_end.rows.is_empty());
    }

    #[test]
    fn clazz_status_follows_dates() {
        let mut clazz = Clazz {
            id: 1,
            name: "Java 就业 100 期".into(),
            room: None,
            begin_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 1),
            master_id: None,
            subject: Some(1),
            create_time: at("2026-01-01 00:00:00"),
            update_time: at("2026-01-01 00:00:00"),
        };
        let day = |m, d| NaiveDate::from_ymd_opt(2026, m, d).unwrap();
        assert_eq!(ClazzStatus::of(&clazz, day(2, 28)), ClazzStatus::NotStarted);
        assert_eq!(ClazzStatus::of(&clazz, day(3, 1)), ClazzStatus::InProgress);
        assert_eq!(ClazzStatus::of(&clazz, day(9, 1)), ClazzStatus::InProgress);
        assert_eq!(ClazzStatus::of(&clazz, day(9, 2)), ClazzStatus::Finished);

        clazz.begin_date = None;
        clazz.end_date = None;
        assert_eq!(ClazzStatus::of(&clazz, day(9, 2)), ClazzStatus::InProgress);
        assert_eq!(serde_json::to_value(ClazzStatus::Finished).unwrap(), json!("已结课"));
    }

    #[test]
    fn page_rows_flatten_entity_fields() {
        let row = StudentRow {
            student: Student {
                id: 5,
                name: "段誉".into(),
                no: "2026000001".into(),
                gender: Some(1),
                phone: None,
                id_card: None,
                is_college: Some(1),
                address: None,
                degree: Some(4),
                graduation_date: None,
                clazz_id: Some(2),
                violation_count: 0,
                violation_score: 0,
                create_time: at("2026-01-01 00:00:00"),
                update_time: at("2026-01-01 00:00:00"),
            },
            clazz_name: Some("前端 01 期".into()),
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["clazzName"], "前端 01 期");
        assert_eq!(value["clazzId"], 2);
        assert_eq!(value["violationCount"], 0);
    }
}
