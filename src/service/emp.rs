// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Employee management and login.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};

use crate::auth::{Principal, TokenIssuer};
use crate::models::{
    Dept, Emp, EmpDetail, EmpExpr, EmpExprPayload, EmpPayload, EmpQuery, EmpRow, LoginInfo,
    PageResult, Paging,
};
use crate::storage::{self, Store, EMP_PHONE, EMP_USERNAME};

use super::{name_matches, not_found, now, EmpLogService, ServiceResult};

/// Password given to every newly created employee.
pub const DEFAULT_PASSWORD: &str = "123456";

/// Hex SHA-256 digest stored in place of the password.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

pub struct EmpService<'a> {
    store: &'a Store,
}

impl<'a> EmpService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Filtered page of employees with their department names.
    ///
    /// The entry date range applies only when both bounds are given; it is
    /// inclusive and excludes employees without an entry date.
    pub fn page(&self, query: &EmpQuery) -> ServiceResult<PageResult<EmpRow>> {
        let matching: Vec<Emp> = self
            .sorted()?
            .into_iter()
            .filter(|e| name_matches(&e.name, query.name.as_deref()))
            .filter(|e| query.gender.is_none_or(|g| e.gender == g))
            .filter(|e| match (query.begin, query.end) {
                (Some(begin), Some(end)) => e.entry_date.is_some_and(|d| begin <= d && d <= end),
                _ => true,
            })
            .collect();

        let page = Paging::new(query.page, query.page_size).apply(matching);
        let rows = self.with_dept_names(page.rows)?;
        Ok(PageResult {
            total: page.total,
            rows,
        })
    }

    /// Every employee, most recently updated first.
    pub fn list(&self) -> ServiceResult<Vec<EmpRow>> {
        let emps = self.sorted()?;
        self.with_dept_names(emps)
    }

    /// Create an employee with the default password and its work history.
    ///
    /// An employee log line is written afterwards whether or not the save
    /// succeeded.
    pub fn save(&self, payload: EmpPayload) -> ServiceResult<Emp> {
        let info = format!("新增员工：{}", payload.name);

        let result = self.store.write(|txn| -> ServiceResult<_> {
            let id = storage::next_id::<Emp>(txn)?;
            storage::claim_unique(txn, EMP_USERNAME, &payload.username, id)?;
            storage::claim_unique(txn, EMP_PHONE, &payload.phone, id)?;

            let now = now();
            let emp = Emp {
                id,
                username: payload.username,
                name: payload.name,
                gender: payload.gender,
                phone: payload.phone,
                job: payload.job,
                salary: payload.salary,
                image: payload.image,
                entry_date: payload.entry_date,
                dept_id: payload.dept_id,
                create_time: now,
                update_time: now,
            };
            storage::put(txn, &emp)?;
            insert_exprs(txn, id, payload.expr_list)?;
            storage::set_credential(txn, id, &hash_password(DEFAULT_PASSWORD))?;
            Ok(emp)
        });

        if let Err(e) = EmpLogService::new(self.store).record(info) {
            tracing::error!(error = %e, "Failed to write employee log");
        }

        if let Ok(emp) = &result {
            tracing::info!(emp_id = emp.id, username = %emp.username, "Employee created");
        }
        result
    }

    /// Delete employees together with their work history and credentials.
    pub fn delete(&self, ids: &[u64]) -> ServiceResult<()> {
        let targets: HashSet<u64> = ids.iter().copied().collect();

        self.store.write(|txn| -> ServiceResult<_> {
            for &id in &targets {
                if let Some(emp) = storage::remove::<Emp>(txn, id)? {
                    storage::release_unique(txn, EMP_USERNAME, &emp.username, id)?;
                    storage::release_unique(txn, EMP_PHONE, &emp.phone, id)?;
                }
                storage::remove_credential(txn, id)?;
            }

            for expr in storage::load_all::<EmpExpr>(txn)? {
                if targets.contains(&expr.emp_id) {
                    storage::remove::<EmpExpr>(txn, expr.id)?;
                }
            }
            Ok(())
        })
    }

    /// Employee detail including work history.
    pub fn get_info(&self, id: u64) -> ServiceResult<EmpDetail> {
        let emp: Emp = self.store.get(id)?.ok_or_else(|| not_found("emp", id))?;
        let expr_list = self
            .store
            .all::<EmpExpr>()?
            .into_iter()
            .filter(|x| x.emp_id == id)
            .collect();
        Ok(EmpDetail { emp, expr_list })
    }

    /// Update an employee and replace the work history in one transaction.
    pub fn update(&self, payload: EmpPayload) -> ServiceResult<Emp> {
        let id = payload.id.unwrap_or_default();

        self.store.write(|txn| -> ServiceResult<_> {
            let existing: Emp = storage::fetch(txn, id)?.ok_or_else(|| not_found("emp", id))?;
            storage::rebind_unique(txn, EMP_USERNAME, &existing.username, &payload.username, id)?;
            storage::rebind_unique(txn, EMP_PHONE, &existing.phone, &payload.phone, id)?;

            let emp = Emp {
                id,
                username: payload.username,
                name: payload.name,
                gender: payload.gender,
                phone: payload.phone,
                job: payload.job,
                salary: payload.salary,
                image: payload.image,
                entry_date: payload.entry_date,
                dept_id: payload.dept_id,
                create_time: existing.create_time,
                update_time: now(),
            };
            storage::put(txn, &emp)?;

            for expr in storage::load_all::<EmpExpr>(txn)? {
                if expr.emp_id == id {
                    storage::remove::<EmpExpr>(txn, expr.id)?;
                }
            }
            insert_exprs(txn, id, payload.expr_list)?;
            Ok(emp)
        })
    }

    /// Check credentials and issue a token. `None` means the username or
    /// password did not match.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        issuer: &TokenIssuer,
    ) -> ServiceResult<Option<LoginInfo>> {
        let Some(id) = self.store.find_unique(EMP_USERNAME, username)? else {
            return Ok(None);
        };
        if self.store.credential(id)?.as_deref() != Some(hash_password(password).as_str()) {
            return Ok(None);
        }
        let Some(emp) = self.store.get::<Emp>(id)? else {
            return Ok(None);
        };

        let token = issuer.issue(Principal::new(emp.id, &emp.username).to_claims())?;
        Ok(Some(LoginInfo {
            id: emp.id,
            username: emp.username,
            name: emp.name,
            token,
        }))
    }

    /// Create an account with the default password unless `username` exists.
    ///
    /// Returns `true` when a new employee was created.
    pub fn ensure_account(&self, username: &str) -> ServiceResult<bool> {
        if self.store.find_unique(EMP_USERNAME, username)?.is_some() {
            return Ok(false);
        }
        self.save(EmpPayload {
            username: username.to_string(),
            name: username.to_string(),
            gender: 1,
            phone: String::new(),
            ..Default::default()
        })?;
        Ok(true)
    }

    fn sorted(&self) -> ServiceResult<Vec<Emp>> {
        let mut emps = self.store.all::<Emp>()?;
        emps.sort_by_key(|e| Reverse((e.update_time, e.id)));
        Ok(emps)
    }

    fn with_dept_names(&self, emps: Vec<Emp>) -> ServiceResult<Vec<EmpRow>> {
        let depts: HashMap<u64, String> = self
            .store
            .all::<Dept>()?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        Ok(emps
            .into_iter()
            .map(|emp| EmpRow {
                dept_name: emp.dept_id.and_then(|id| depts.get(&id).cloned()),
                emp,
            })
            .collect())
    }
}

fn insert_exprs(
    txn: &redb::WriteTransaction,
    emp_id: u64,
    exprs: Vec<EmpExprPayload>,
) -> ServiceResult<()> {
    for expr in exprs.into_iter().filter(EmpExprPayload::is_filled) {
        let record = EmpExpr {
            id: storage::next_id::<EmpExpr>(txn)?,
            emp_id,
            begin: expr.begin,
            end: expr.end,
            company: expr.company,
            job: expr.job,
        };
        storage::put(txn, &record)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenConfig, TokenVerifier};
    use crate::models::{EmpLog, EmpQuery};
    use crate::service::test_support::temp_store;
    use crate::service::{DeptService, ServiceError};
    use crate::storage::StoreError;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn emp(username: &str, name: &str, phone: &str) -> EmpPayload {
        EmpPayload {
            username: username.into(),
            name: name.into(),
            gender: 1,
            phone: phone.into(),
            ..Default::default()
        }
    }

    fn expr(company: &str) -> EmpExprPayload {
        EmpExprPayload {
            company: Some(company.into()),
            job: Some("讲师".into()),
            ..Default::default()
        }
    }

    #[test]
    fn password_hash_is_sha256_hex() {
        assert_eq!(
            hash_password("123456"),
            "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
        );
    }

    #[test]
    fn save_stores_history_credential_and_log() {
        let (_dir, store) = temp_store();
        let service = EmpService::new(&store);

        let mut payload = emp("linchong", "林冲", "13300000002");
        payload.expr_list = vec![expr("梁山"), EmpExprPayload::default(), expr("东京")];
        let saved = service.save(payload).unwrap();

        let detail = service.get_info(saved.id).unwrap();
        assert_eq!(detail.emp, saved);
        let companies: Vec<_> = detail.expr_list.iter().filter_map(|x| x.company.clone()).collect();
        assert_eq!(companies, vec!["梁山", "东京"]);

        assert_eq!(store.credential(saved.id).unwrap(), Some(hash_password(DEFAULT_PASSWORD)));
        let logs = store.all::<EmpLog>().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].info, "新增员工：林冲");
    }

    #[test]
    fn duplicate_phone_rolls_back_but_still_logs() {
        let (_dir, store) = temp_store();
        let service = EmpService::new(&store);
        service.save(emp("a", "甲", "13300000003")).unwrap();

        let mut dup = emp("b", "乙", "13300000003");
        dup.expr_list = vec![expr("梁山")];
        let err = service.save(dup).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate entry '13300000003' for key 'emp.phone'");

        assert_eq!(store.all::<Emp>().unwrap().len(), 1);
        assert!(store.all::<EmpExpr>().unwrap().is_empty());
        assert!(store.find_unique(EMP_USERNAME, "b").unwrap().is_none());
        assert_eq!(store.all::<EmpLog>().unwrap().len(), 2);
    }

    #[test]
    fn page_filters_and_joins_dept_name() {
        let (_dir, store) = temp_store();
        let dept = DeptService::new(&store)
            .add(crate::models::DeptPayload {
                id: None,
                name: "教研部".into(),
            })
            .unwrap();
        let service = EmpService::new(&store);

        let mut a = emp("zhangsan", "张三", "13300000010");
        a.dept_id = Some(dept.id);
        a.entry_date = NaiveDate::from_ymd_opt(2024, 1, 10);
        service.save(a).unwrap();

        let mut b = emp("zhangsanfeng", "张三丰", "13300000011");
        b.gender = 2;
        b.entry_date = NaiveDate::from_ymd_opt(2025, 6, 1);
        service.save(b).unwrap();

        service.save(emp("lisi", "李四", "13300000012")).unwrap();

        let by_name = service
            .page(&EmpQuery {
                name: Some("张三".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_name.total, 2);
        // Newest first.
        assert_eq!(by_name.rows[0].emp.username, "zhangsanfeng");
        assert_eq!(by_name.rows[1].dept_name.as_deref(), Some("教研部"));

        let by_gender = service
            .page(&EmpQuery {
                gender: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_gender.total, 1);

        let by_entry = service
            .page(&EmpQuery {
                begin: NaiveDate::from_ymd_opt(2024, 1, 10),
                end: NaiveDate::from_ymd_opt(2024, 12, 31),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_entry.total, 1);
        assert_eq!(by_entry.rows[0].emp.username, "zhangsan");

        // A lone bound does not filter, so undated employees stay listed.
        let begin_only = service
            .page(&EmpQuery {
                begin: NaiveDate::from_ymd_opt(2030, 1, 1),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(begin_only.total, 3);

        let second_page = service
            .page(&EmpQuery {
                page: Some(2),
                page_size: Some(2),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(second_page.total, 3);
        assert_eq!(second_page.rows.len(), 1);
    }

    #[test]
    fn update_replaces_history_and_rebinds_unique_values() {
        let (_dir, store) = temp_store();
        let service = EmpService::new(&store);
        let mut payload = emp("wusong", "武松", "13300000020");
        payload.expr_list = vec![expr("阳谷县")];
        let saved = service.save(payload).unwrap();

        let mut update = emp("wusong", "武二郎", "13300000021");
        update.id = Some(saved.id);
        update.expr_list = vec![expr("二龙山"), expr("梁山")];
        let updated = service.update(update).unwrap();
        assert_eq!(updated.name, "武二郎");
        assert_eq!(updated.create_time, saved.create_time);

        let detail = service.get_info(saved.id).unwrap();
        let companies: Vec<_> = detail.expr_list.iter().filter_map(|x| x.company.clone()).collect();
        assert_eq!(companies, vec!["二龙山", "梁山"]);

        // Old phone is free again.
        service.save(emp("other", "其他", "13300000020")).unwrap();
    }

    #[test]
    fn failed_update_keeps_old_history() {
        let (_dir, store) = temp_store();
        let service = EmpService::new(&store);
        let mut payload = emp("a", "甲", "13300000030");
        payload.expr_list = vec![expr("旧公司")];
        let a = service.save(payload).unwrap();
        service.save(emp("b", "乙", "13300000031")).unwrap();

        let mut update = emp("a", "甲", "13300000031");
        update.id = Some(a.id);
        update.expr_list = vec![expr("新公司")];
        assert!(service.update(update).is_err());

        let detail = service.get_info(a.id).unwrap();
        assert_eq!(detail.emp.phone, "13300000030");
        assert_eq!(detail.expr_list[0].company.as_deref(), Some("旧公司"));
    }

    #[test]
    fn missing_employee_is_not_found() {
        let (_dir, store) = temp_store();
        let service = EmpService::new(&store);
        assert!(matches!(service.get_info(7), Err(ServiceError::Store(StoreError::NotFound(_)))));

        let mut update = emp("x", "x", "1");
        update.id = Some(7);
        assert!(matches!(service.update(update), Err(ServiceError::Store(StoreError::NotFound(_)))));
    }

    #[test]
    fn delete_removes_history_and_frees_keys() {
        let (_dir, store) = temp_store();
        let service = EmpService::new(&store);
        let mut payload = emp("a", "甲", "13300000040");
        payload.expr_list = vec![expr("x")];
        let a = service.save(payload).unwrap();
        let b = service.save(emp("b", "乙", "13300000041")).unwrap();
        let c = service.save(emp("c", "丙", "13300000042")).unwrap();

        service.delete(&[a.id, b.id, 999]).unwrap();

        let remaining: Vec<_> = service.list().unwrap().into_iter().map(|r| r.emp.id).collect();
        assert_eq!(remaining, vec![c.id]);
        assert!(store.all::<EmpExpr>().unwrap().is_empty());
        assert_eq!(store.credential(a.id).unwrap(), None);
        service.save(emp("a", "甲", "13300000040")).unwrap();
    }

    #[test]
    fn login_checks_password_and_issues_token() {
        let (_dir, store) = temp_store();
        let service = EmpService::new(&store);
        let saved = service.save(emp("songjiang", "宋江", "13300000050")).unwrap();

        let config = TokenConfig::new("emp-test-key", Duration::from_secs(60));
        let issuer = TokenIssuer::new(&config);

        assert!(service.login("songjiang", "wrong", &issuer).unwrap().is_none());
        assert!(service.login("nobody", "123456", &issuer).unwrap().is_none());

        let info = service.login("songjiang", "123456", &issuer).unwrap().unwrap();
        assert_eq!(info.id, saved.id);
        assert_eq!(info.name, "宋江");

        let claims = TokenVerifier::new(&config).verify(&info.token).unwrap();
        assert_eq!(Principal::from_claims(&claims).unwrap(), Principal::new(saved.id, "songjiang"));
    }

    #[test]
    fn ensure_account_is_idempotent() {
        let (_dir, store) = temp_store();
        let service = EmpService::new(&store);
        assert!(service.ensure_account("admin").unwrap());
        assert!(!service.ensure_account("admin").unwrap());
        assert_eq!(store.all::<Emp>().unwrap().len(), 1);
    }
}
