// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Class management.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::{Local, NaiveDate};

use crate::models::{Clazz, ClazzPayload, ClazzQuery, ClazzRow, ClazzStatus, Emp, PageResult, Paging};
use crate::storage::{self, Store};

use super::{name_matches, not_found, now, ServiceResult};

pub struct ClazzService<'a> {
    store: &'a Store,
}

impl<'a> ClazzService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Filtered page of classes with head teacher name and status.
    ///
    /// `begin` and `end` together bound the class end date, inclusive. A
    /// lone bound is ignored.
    pub fn page(&self, query: &ClazzQuery) -> ServiceResult<PageResult<ClazzRow>> {
        self.page_on(query, Local::now().date_naive())
    }

    pub fn page_on(&self, query: &ClazzQuery, today: NaiveDate) -> ServiceResult<PageResult<ClazzRow>> {
        let matching: Vec<Clazz> = self
            .list()?
            .into_iter()
            .filter(|c| name_matches(&c.name, query.name.as_deref()))
            .filter(|c| match (query.begin, query.end) {
                (Some(begin), Some(end)) => c.end_date.is_some_and(|d| begin <= d && d <= end),
                _ => true,
            })
            .collect();

        let page = Paging::new(query.page, query.page_size).apply(matching);
        let masters: HashMap<u64, String> = self
            .store
            .all::<Emp>()?
            .into_iter()
            .map(|e| (e.id, e.name))
            .collect();

        let rows = page
            .rows
            .into_iter()
            .map(|clazz| ClazzRow {
                master_name: clazz.master_id.and_then(|id| masters.get(&id).cloned()),
                status: ClazzStatus::of(&clazz, today),
                clazz,
            })
            .collect();
        Ok(PageResult {
            total: page.total,
            rows,
        })
    }

    /// All classes, most recently updated first.
    pub fn list(&self) -> ServiceResult<Vec<Clazz>> {
        let mut clazzes = self.store.all::<Clazz>()?;
        clazzes.sort_by_key(|c| Reverse((c.update_time, c.id)));
        Ok(clazzes)
    }

    pub fn get(&self, id: u64) -> ServiceResult<Clazz> {
        self.store.get(id)?.ok_or_else(|| not_found("clazz", id))
    }

    pub fn save(&self, payload: ClazzPayload) -> ServiceResult<Clazz> {
        self.store.write(|txn| -> ServiceResult<_> {
            let now = now();
            let clazz = Clazz {
                id: storage::next_id::<Clazz>(txn)?,
                name: payload.name,
                room: payload.room,
                begin_date: payload.begin_date,
                end_date: payload.end_date,
                master_id: payload.master_id,
                subject: payload.subject,
                create_time: now,
                update_time: now,
            };
            storage::put(txn, &clazz)?;
            Ok(clazz)
        })
    }

    pub fn update(&self, payload: ClazzPayload) -> ServiceResult<Clazz> {
        let id = payload.id.unwrap_or_default();
        self.store.write(|txn| -> ServiceResult<_> {
            let existing: Clazz = storage::fetch(txn, id)?.ok_or_else(|| not_found("clazz", id))?;
            let clazz = Clazz {
                id,
                name: payload.name,
                room: payload.room,
                begin_date: payload.begin_date,
                end_date: payload.end_date,
                master_id: payload.master_id,
                subject: payload.subject,
                create_time: existing.create_time,
                update_time: now(),
            };
            storage::put(txn, &clazz)?;
            Ok(clazz)
        })
    }

    /// Delete a class. Deleting an unknown id is a no-op.
    pub fn delete(&self, id: u64) -> ServiceResult<()> {
        self.store.write(|txn| -> ServiceResult<_> {
            storage::remove::<Clazz>(txn, id)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmpPayload;
    use crate::service::test_support::temp_store;
    use crate::service::EmpService;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn clazz(name: &str, begin: Option<NaiveDate>, end: Option<NaiveDate>) -> ClazzPayload {
        ClazzPayload {
            name: name.into(),
            begin_date: begin,
            end_date: end,
            subject: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn page_adds_master_name_and_status() {
        let (_dir, store) = temp_store();
        let master = EmpService::new(&store)
            .save(EmpPayload {
                username: "wuyong".into(),
                name: "吴用".into(),
                gender: 1,
                phone: "13300000001".into(),
                ..Default::default()
            })
            .unwrap();

        let service = ClazzService::new(&store);
        let mut java = clazz("Java 01 期", date(2026, 3, 1), date(2026, 9, 1));
        java.master_id = Some(master.id);
        service.save(java).unwrap();
        service.save(clazz("前端 01 期", date(2025, 3, 1), date(2025, 9, 1))).unwrap();

        let page = service
            .page_on(&ClazzQuery::default(), NaiveDate::from_ymd_opt(2026, 5, 1).unwrap())
            .unwrap();
        assert_eq!(page.total, 2);
        let java_row = page.rows.iter().find(|r| r.clazz.name.starts_with("Java")).unwrap();
        assert_eq!(java_row.master_name.as_deref(), Some("吴用"));
        assert_eq!(java_row.status, ClazzStatus::InProgress);
        let web_row = page.rows.iter().find(|r| r.clazz.name.starts_with("前端")).unwrap();
        assert_eq!(web_row.master_name, None);
        assert_eq!(web_row.status, ClazzStatus::Finished);
    }

    #[test]
    fn page_filters_on_end_date_and_name() {
        let (_dir, store) = temp_store();
        let service = ClazzService::new(&store);
        service.save(clazz("Java 01 期", date(2026, 3, 1), date(2026, 9, 1))).unwrap();
        service.save(clazz("Java 02 期", date(2025, 3, 1), date(2025, 9, 1))).unwrap();
        service.save(clazz("前端 01 期", None, None)).unwrap();

        let query = ClazzQuery {
            begin: date(2026, 1, 1),
            end: date(2026, 12, 31),
            ..Default::default()
        };
        let page = service.page(&query).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0].clazz.name, "Java 01 期");

        let query = ClazzQuery {
            end: date(2025, 12, 31),
            ..Default::default()
        };
        assert_eq!(service.page(&query).unwrap().total, 3);

        let query = ClazzQuery {
            name: Some("java".into()),
            ..Default::default()
        };
        assert_eq!(service.page(&query).unwrap().total, 2);
    }

    #[test]
    fn update_get_delete() {
        let (_dir, store) = temp_store();
        let service = ClazzService::new(&store);
        let saved = service.save(clazz("Java 01 期", None, None)).unwrap();

        let mut payload = clazz("Java 01 期 (晚班)", None, date(2026, 12, 1));
        payload.id = Some(saved.id);
        payload.room = Some("212".into());
        service.update(payload).unwrap();

        let got = service.get(saved.id).unwrap();
        assert_eq!(got.name, "Java 01 期 (晚班)");
        assert_eq!(got.room.as_deref(), Some("212"));
        assert_eq!(got.create_time, saved.create_time);

        service.delete(saved.id).unwrap();
        assert!(service.get(saved.id).is_err());
        assert!(service.list().unwrap().is_empty());
        service.delete(saved.id).unwrap();
    }

    #[test]
    fn update_missing_is_not_found() {
        let (_dir, store) = temp_store();
        let mut payload = clazz("x", None, None);
        payload.id = Some(3);
        assert!(ClazzService::new(&store).update(payload).is_err());
    }
}
