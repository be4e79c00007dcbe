// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Student management and discipline records.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::models::{Clazz, PageResult, Paging, Student, StudentPayload, StudentQuery, StudentRow};
use crate::storage::{self, Store, STUDENT_NO};

use super::{name_matches, not_found, now, ServiceResult};

pub struct StudentService<'a> {
    store: &'a Store,
}

impl<'a> StudentService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Filtered page of students with their class names.
    pub fn page(&self, query: &StudentQuery) -> ServiceResult<PageResult<StudentRow>> {
        let mut students = self.store.all::<Student>()?;
        students.sort_by_key(|s| Reverse((s.update_time, s.id)));

        let matching: Vec<Student> = students
            .into_iter()
            .filter(|s| name_matches(&s.name, query.name.as_deref()))
            .filter(|s| query.degree.is_none_or(|d| s.degree == Some(d)))
            .filter(|s| query.clazz_id.is_none_or(|c| s.clazz_id == Some(c)))
            .collect();

        let page = Paging::new(query.page, query.page_size).apply(matching);
        let clazzes: HashMap<u64, String> = self
            .store
            .all::<Clazz>()?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let rows = page
            .rows
            .into_iter()
            .map(|student| StudentRow {
                clazz_name: student.clazz_id.and_then(|id| clazzes.get(&id).cloned()),
                student,
            })
            .collect();
        Ok(PageResult {
            total: page.total,
            rows,
        })
    }

    pub fn get(&self, id: u64) -> ServiceResult<Student> {
        self.store.get(id)?.ok_or_else(|| not_found("student", id))
    }

    /// Enrol a student with a clean discipline record.
    pub fn save(&self, payload: StudentPayload) -> ServiceResult<Student> {
        self.store.write(|txn| -> ServiceResult<_> {
            let id = storage::next_id::<Student>(txn)?;
            storage::claim_unique(txn, STUDENT_NO, &payload.no, id)?;

            let now = now();
            let student = Student {
                id,
                name: payload.name,
                no: payload.no,
                gender: payload.gender,
                phone: payload.phone,
                id_card: payload.id_card,
                is_college: payload.is_college,
                address: payload.address,
                degree: payload.degree,
                graduation_date: payload.graduation_date,
                clazz_id: payload.clazz_id,
                violation_count: 0,
                violation_score: 0,
                create_time: now,
                update_time: now,
            };
            storage::put(txn, &student)?;
            Ok(student)
        })
    }

    /// Update profile fields. Discipline counters are left untouched.
    pub fn update(&self, payload: StudentPayload) -> ServiceResult<Student> {
        let id = payload.id.unwrap_or_default();
        self.store.write(|txn| -> ServiceResult<_> {
            let existing: Student = storage::fetch(txn, id)?.ok_or_else(|| not_found("student", id))?;
            storage::rebind_unique(txn, STUDENT_NO, &existing.no, &payload.no, id)?;

            let student = Student {
                id,
                name: payload.name,
                no: payload.no,
                gender: payload.gender,
                phone: payload.phone,
                id_card: payload.id_card,
                is_college: payload.is_college,
                address: payload.address,
                degree: payload.degree,
                graduation_date: payload.graduation_date,
                clazz_id: payload.clazz_id,
                violation_count: existing.violation_count,
                violation_score: existing.violation_score,
                create_time: existing.create_time,
                update_time: now(),
            };
            storage::put(txn, &student)?;
            Ok(student)
        })
    }

    pub fn delete(&self, ids: &[u64]) -> ServiceResult<()> {
        self.store.write(|txn| -> ServiceResult<_> {
            for &id in ids {
                if let Some(student) = storage::remove::<Student>(txn, id)? {
                    storage::release_unique(txn, STUDENT_NO, &student.no, id)?;
                }
            }
            Ok(())
        })
    }

    /// Record one violation: count goes up by one, score by `score`.
    pub fn violation(&self, id: u64, score: i32) -> ServiceResult<Student> {
        self.store.write(|txn| -> ServiceResult<_> {
            let mut student: Student =
                storage::fetch(txn, id)?.ok_or_else(|| not_found("student", id))?;
            student.violation_count = student.violation_count.saturating_add(1);
            student.violation_score = student.violation_score.saturating_add(score);
            student.update_time = now();
            storage::put(txn, &student)?;
            Ok(student)
        })
    }
}
