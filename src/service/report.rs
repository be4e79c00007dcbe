// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chart data for the dashboard.

use std::collections::{BTreeMap, HashMap};

use crate::models::{Clazz, ClazzCountReport, Emp, JobReport, NameValue, Student};
use crate::storage::Store;

use super::ServiceResult;

const OTHER_LABEL: &str = "其他";

pub fn gender_label(gender: u8) -> &'static str {
    if gender == 1 {
        "男"
    } else {
        "女"
    }
}

pub fn job_label(job: u8) -> &'static str {
    match job {
        1 => "班主任",
        2 => "讲师",
        3 => "学工主管",
        4 => "教研主管",
        5 => "咨询师",
        _ => OTHER_LABEL,
    }
}

pub fn degree_label(degree: u8) -> &'static str {
    match degree {
        1 => "初中",
        2 => "高中",
        3 => "大专",
        4 => "本科",
        5 => "硕士",
        6 => "博士",
        _ => OTHER_LABEL,
    }
}

/// Count occurrences of each key, ordered by key.
fn tally<K: Ord>(keys: impl IntoIterator<Item = K>) -> BTreeMap<K, u64> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

pub struct ReportService<'a> {
    store: &'a Store,
}

impl<'a> ReportService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn emp_gender(&self) -> ServiceResult<Vec<NameValue>> {
        let emps = self.store.all::<Emp>()?;
        Ok(tally(emps.iter().map(|e| e.gender))
            .into_iter()
            .map(|(gender, value)| NameValue {
                name: gender_label(gender).to_string(),
                value,
            })
            .collect())
    }

    /// Headcount per job; employees without a job are left out.
    pub fn emp_job(&self) -> ServiceResult<JobReport> {
        let emps = self.store.all::<Emp>()?;
        let mut report = JobReport::default();
        for (job, count) in tally(emps.iter().filter_map(|e| e.job)) {
            report.job_list.push(job_label(job).to_string());
            report.data_list.push(count);
        }
        Ok(report)
    }

    pub fn student_degree(&self) -> ServiceResult<Vec<NameValue>> {
        let students = self.store.all::<Student>()?;
        Ok(tally(students.iter().filter_map(|s| s.degree))
            .into_iter()
            .map(|(degree, value)| NameValue {
                name: degree_label(degree).to_string(),
                value,
            })
            .collect())
    }

    /// Students per class, for classes that still exist and have students.
    pub fn student_count(&self) -> ServiceResult<ClazzCountReport> {
        let students = self.store.all::<Student>()?;
        let clazzes: HashMap<u64, String> = self
            .store
            .all::<Clazz>()?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut report = ClazzCountReport::default();
        for (clazz_id, count) in tally(students.iter().filter_map(|s| s.clazz_id)) {
            if let Some(name) = clazzes.get(&clazz_id) {
                report.clazz_list.push(name.clone());
                report.data_list.push(count);
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClazzPayload, EmpPayload, StudentPayload};
    use crate::service::test_support::temp_store;
    use crate::service::{ClazzService, EmpService, StudentService};

    fn seed(store: &Store) {
        let emps = EmpService::new(store);
        for (i, (gender, job)) in [(1, Some(1)), (1, Some(2)), (2, Some(2)), (2, None), (1, Some(9))]
            .into_iter()
            .enumerate()
        {
            emps.save(EmpPayload {
                username: format!("user{i}"),
                name: format!("员工{i}"),
                gender,
                phone: format!("1330000000{i}"),
                job,
                ..Default::default()
            })
            .unwrap();
        }

        let clazzes = ClazzService::new(store);
        let java = clazzes
            .save(ClazzPayload {
                name: "Java 01 期".into(),
                ..Default::default()
            })
            .unwrap();
        clazzes
            .save(ClazzPayload {
                name: "空班".into(),
                ..Default::default()
            })
            .unwrap();

        let students = StudentService::new(store);
        for (i, (degree, clazz)) in [(Some(4), Some(java.id)), (Some(4), Some(java.id)), (Some(6), Some(999)), (None, None)]
            .into_iter()
            .enumerate()
        {
            students
                .save(StudentPayload {
                    name: format!("学生{i}"),
                    no: format!("20260000{i}"),
                    degree,
                    clazz_id: clazz,
                    ..Default::default()
                })
                .unwrap();
        }
    }

    #[test]
    fn reports_group_and_label() {
        let (_dir, store) = temp_store();
        seed(&store);
        let reports = ReportService::new(&store);

        assert_eq!(
            reports.emp_gender().unwrap(),
            vec![
                NameValue { name: "男".into(), value: 3 },
                NameValue { name: "女".into(), value: 2 },
            ]
        );

        let jobs = reports.emp_job().unwrap();
        assert_eq!(jobs.job_list, vec!["班主任", "讲师", "其他"]);
        assert_eq!(jobs.data_list, vec![1, 2, 1]);

        assert_eq!(
            reports.student_degree().unwrap(),
            vec![
                NameValue { name: "本科".into(), value: 2 },
                NameValue { name: "博士".into(), value: 1 },
            ]
        );

        let counts = reports.student_count().unwrap();
        assert_eq!(counts.clazz_list, vec!["Java 01 期"]);
        assert_eq!(counts.data_list, vec![2]);
    }

    #[test]
    fn empty_store_gives_empty_reports() {
        let (_dir, store) = temp_store();
        let reports = ReportService::new(&store);
        assert!(reports.emp_gender().unwrap().is_empty());
        assert_eq!(reports.emp_job().unwrap(), JobReport::default());
        assert!(reports.student_degree().unwrap().is_empty());
        assert_eq!(reports.student_count().unwrap(), ClazzCountReport::default());
    }

    #[test]
    fn labels() {
        assert_eq!(gender_label(1), "男");
        assert_eq!(gender_label(2), "女");
        assert_eq!(job_label(4), "教研主管");
        assert_eq!(degree_label(3), "大专");
        assert_eq!(degree_label(0), "其他");
    }
}
