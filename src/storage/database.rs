// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded record database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `dept`, `emp`, `emp_expr`, `emp_log`, `clazz`, `student`, `operate_log`:
//!   id → serialized record (JSON bytes)
//! - `dept.name`, `emp.username`, `emp.phone`, `student.no`: unique value → id
//! - `credential`: employee id → SHA-256 hex password hash
//! - `sequence`: table name → last issued id
//!
//! Multi-step mutations run inside [`Store::write`], which commits only when
//! the closure succeeds.

use std::fmt;
use std::path::Path;

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, TableHandle, WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{Clazz, Dept, Emp, EmpExpr, EmpLog, OperateLog, Student};

// =============================================================================
// Table Definitions
// =============================================================================

type RecordTable = TableDefinition<'static, u64, &'static [u8]>;
type IndexTable = TableDefinition<'static, &'static str, u64>;

const DEPTS: RecordTable = TableDefinition::new("dept");
const EMPS: RecordTable = TableDefinition::new("emp");
const EMP_EXPRS: RecordTable = TableDefinition::new("emp_expr");
const EMP_LOGS: RecordTable = TableDefinition::new("emp_log");
const CLAZZES: RecordTable = TableDefinition::new("clazz");
const STUDENTS: RecordTable = TableDefinition::new("student");
const OPERATE_LOGS: RecordTable = TableDefinition::new("operate_log");

/// Employee id → password hash.
const CREDENTIALS: TableDefinition<u64, &str> = TableDefinition::new("credential");

/// Table name → last id handed out.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequence");

/// A unique constraint on one column, stored as value → owning id.
#[derive(Clone, Copy)]
pub struct UniqueIndex {
    table: IndexTable,
}

impl UniqueIndex {
    const fn new(name: &'static str) -> Self {
        Self {
            table: TableDefinition::new(name),
        }
    }

    /// Constraint name, `<table>.<column>`.
    pub fn name(&self) -> &str {
        self.table.name()
    }
}

impl fmt::Debug for UniqueIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UniqueIndex").field(&self.name()).finish()
    }
}

pub const DEPT_NAME: UniqueIndex = UniqueIndex::new("dept.name");
pub const EMP_USERNAME: UniqueIndex = UniqueIndex::new("emp.username");
pub const EMP_PHONE: UniqueIndex = UniqueIndex::new("emp.phone");
pub const STUDENT_NO: UniqueIndex = UniqueIndex::new("student.no");

const UNIQUE_INDEXES: [UniqueIndex; 4] = [DEPT_NAME, EMP_USERNAME, EMP_PHONE, STUDENT_NO];

/// An entity persisted as JSON under a numeric id.
pub trait Record: Serialize + DeserializeOwned {
    const TABLE: RecordTable;

    fn id(&self) -> u64;
}

macro_rules! impl_record {
    ($($ty:ty => $table:ident),* $(,)?) => {
        $(
            impl Record for $ty {
                const TABLE: RecordTable = $table;

                fn id(&self) -> u64 {
                    self.id
                }
            }
        )*
    };
}

impl_record! {
    Dept => DEPTS,
    Emp => EMPS,
    EmpExpr => EMP_EXPRS,
    EmpLog => EMP_LOGS,
    Clazz => CLAZZES,
    Student => STUDENTS,
    OperateLog => OPERATE_LOGS,
}

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A unique constraint already holds `value` for another record.
    #[error("Duplicate entry '{value}' for key '{key}'")]
    Duplicate { value: String, key: String },

    #[error("not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Store
// =============================================================================

/// Embedded ACID record database.
pub struct Store {
    db: Database,
}

impl Store {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            for table in [DEPTS, EMPS, EMP_EXPRS, EMP_LOGS, CLAZZES, STUDENTS, OPERATE_LOGS] {
                let _ = write_txn.open_table(table)?;
            }
            for index in UNIQUE_INDEXES {
                let _ = write_txn.open_table(index.table)?;
            }
            let _ = write_txn.open_table(CREDENTIALS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Run `f` in a write transaction, committing only if it returns `Ok`.
    pub fn write<T, E>(&self, f: impl FnOnce(&WriteTransaction) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let txn = self.db.begin_write().map_err(StoreError::from)?;
        match f(&txn) {
            Ok(value) => {
                txn.commit().map_err(StoreError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort) = txn.abort() {
                    tracing::warn!(error = %abort, "Failed to abort write transaction");
                }
                Err(e)
            }
        }
    }

    /// Look up a single record by id.
    pub fn get<R: Record>(&self, id: u64) -> StoreResult<Option<R>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(R::TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All records of a table in id order.
    pub fn all<R: Record>(&self) -> StoreResult<Vec<R>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(R::TABLE)?;
        let mut records = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }

    /// Resolve a unique value to the id holding it.
    pub fn find_unique(&self, index: UniqueIndex, value: &str) -> StoreResult<Option<u64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(index.table)?;
        Ok(table.get(value)?.map(|guard| guard.value()))
    }

    pub fn credential(&self, emp_id: u64) -> StoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CREDENTIALS)?;
        Ok(table.get(emp_id)?.map(|guard| guard.value().to_string()))
    }
}

// =============================================================================
// Write-transaction helpers
// =============================================================================

/// Hand out the next id for records of type `R`.
pub fn next_id<R: Record>(txn: &WriteTransaction) -> StoreResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let name = R::TABLE.name();
    let next = table.get(name)?.map(|guard| guard.value()).unwrap_or(0) + 1;
    table.insert(name, next)?;
    Ok(next)
}

/// Insert or replace a record.
pub fn put<R: Record>(txn: &WriteTransaction, record: &R) -> StoreResult<()> {
    let json = serde_json::to_vec(record)?;
    let mut table = txn.open_table(R::TABLE)?;
    table.insert(record.id(), json.as_slice())?;
    Ok(())
}

/// Read a record inside a write transaction.
pub fn fetch<R: Record>(txn: &WriteTransaction, id: u64) -> StoreResult<Option<R>> {
    let table = txn.open_table(R::TABLE)?;
    // Copy out before the guard is dropped with the table
    let bytes = table.get(id)?.map(|guard| guard.value().to_vec());
    match bytes {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Every record of type `R` visible to the transaction.
pub fn load_all<R: Record>(txn: &WriteTransaction) -> StoreResult<Vec<R>> {
    let table = txn.open_table(R::TABLE)?;
    let mut records = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        records.push(serde_json::from_slice(value.value())?);
    }
    Ok(records)
}

/// Remove a record, returning it if it existed.
pub fn remove<R: Record>(txn: &WriteTransaction, id: u64) -> StoreResult<Option<R>> {
    let mut table = txn.open_table(R::TABLE)?;
    let bytes = table.remove(id)?.map(|guard| guard.value().to_vec());
    match bytes {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Bind `value` to `id`, failing if another record already holds it.
pub fn claim_unique(txn: &WriteTransaction, index: UniqueIndex, value: &str, id: u64) -> StoreResult<()> {
    let mut table = txn.open_table(index.table)?;
    let holder = table.get(value)?.map(|guard| guard.value());
    match holder {
        Some(holder) if holder != id => Err(StoreError::Duplicate {
            value: value.to_string(),
            key: index.name().to_string(),
        }),
        Some(_) => Ok(()),
        None => {
            table.insert(value, id)?;
            Ok(())
        }
    }
}

/// Drop the binding for `value` if `id` holds it.
pub fn release_unique(txn: &WriteTransaction, index: UniqueIndex, value: &str, id: u64) -> StoreResult<()> {
    let mut table = txn.open_table(index.table)?;
    let holder = table.get(value)?.map(|guard| guard.value());
    if holder == Some(id) {
        table.remove(value)?;
    }
    Ok(())
}

/// Move a unique binding from `old` to `new` for the same record.
pub fn rebind_unique(
    txn: &WriteTransaction,
    index: UniqueIndex,
    old: &str,
    new: &str,
    id: u64,
) -> StoreResult<()> {
    if old == new {
        return claim_unique(txn, index, new, id);
    }
    claim_unique(txn, index, new, id)?;
    release_unique(txn, index, old, id)
}

pub fn set_credential(txn: &WriteTransaction, emp_id: u64, hash: &str) -> StoreResult<()> {
    let mut table = txn.open_table(CREDENTIALS)?;
    table.insert(emp_id, hash)?;
    Ok(())
}

pub fn remove_credential(txn: &WriteTransaction, emp_id: u64) -> StoreResult<()> {
    let mut table = txn.open_table(CREDENTIALS)?;
    table.remove(emp_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(&dir.path().join("db").join("test.redb")).unwrap();
        (dir, store)
    }

    fn dept(id: u64, name: &str) -> Dept {
        let now = Local::now().naive_local();
        Dept {
            id,
            name: name.into(),
            create_time: now,
            update_time: now,
        }
    }

    #[test]
    fn unique_index_names_follow_table_dot_column() {
        assert_eq!(EMP_PHONE.name(), "emp.phone");
        assert_eq!(format!("{STUDENT_NO:?}"), "UniqueIndex(\"student.no\")");
    }

    #[test]
    fn sequences_are_per_table() {
        let (_dir, store) = temp_store();
        let ids = store
            .write(|txn| -> StoreResult<_> {
                Ok((next_id::<Dept>(txn)?, next_id::<Dept>(txn)?, next_id::<Emp>(txn)?))
            })
            .unwrap();
        assert_eq!(ids, (1, 2, 1));
    }

    #[test]
    fn put_get_all_remove() {
        let (_dir, store) = temp_store();
        store
            .write(|txn| -> StoreResult<_> {
                put(txn, &dept(2, "教研部"))?;
                put(txn, &dept(1, "学工部"))
            })
            .unwrap();

        let got: Dept = store.get(1).unwrap().unwrap();
        assert_eq!(got.name, "学工部");
        let names: Vec<String> = store.all::<Dept>().unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["学工部", "教研部"]);

        let removed = store.write(|txn| remove::<Dept>(txn, 1)).unwrap();
        assert!(removed.is_some());
        assert!(store.get::<Dept>(1).unwrap().is_none());
    }

    #[test]
    fn failed_closure_rolls_back() {
        let (_dir, store) = temp_store();
        let result = store.write(|txn| -> StoreResult<()> {
            put(txn, &dept(1, "学工部"))?;
            Err(StoreError::NotFound("dept 9".into()))
        });
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(store.get::<Dept>(1).unwrap().is_none());
    }

    #[test]
    fn unique_index_rejects_other_holder() {
        let (_dir, store) = temp_store();
        store.write(|txn| claim_unique(txn, EMP_PHONE, "13300000001", 1)).unwrap();
        // Same holder may re-claim.
        store.write(|txn| claim_unique(txn, EMP_PHONE, "13300000001", 1)).unwrap();

        let err = store
            .write(|txn| claim_unique(txn, EMP_PHONE, "13300000001", 2))
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate entry '13300000001' for key 'emp.phone'");

        store
            .write(|txn| rebind_unique(txn, EMP_PHONE, "13300000001", "13300000002", 1))
            .unwrap();
        assert_eq!(store.find_unique(EMP_PHONE, "13300000001").unwrap(), None);
        assert_eq!(store.find_unique(EMP_PHONE, "13300000002").unwrap(), Some(1));
    }

    #[test]
    fn release_ignores_other_holder() {
        let (_dir, store) = temp_store();
        store.write(|txn| claim_unique(txn, DEPT_NAME, "学工部", 1)).unwrap();
        store.write(|txn| release_unique(txn, DEPT_NAME, "学工部", 2)).unwrap();
        assert_eq!(store.find_unique(DEPT_NAME, "学工部").unwrap(), Some(1));
    }

    #[test]
    fn credentials_round_trip() {
        let (_dir, store) = temp_store();
        store.write(|txn| set_credential(txn, 4, "abc")).unwrap();
        assert_eq!(store.credential(4).unwrap().as_deref(), Some("abc"));
        store.write(|txn| remove_credential(txn, 4)).unwrap();
        assert_eq!(store.credential(4).unwrap(), None);
    }

    #[test]
    fn reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tlias.redb");
        {
            let store = Store::open(&path).unwrap();
            store.write(|txn| put(txn, &dept(1, "学工部"))).unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.all::<Dept>().unwrap().len(), 1);
    }
}
