// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state lives under `DATA_DIR`:
//!
//! ```text
//! <DATA_DIR>/
//!   tlias.redb        # Records, unique indexes, credentials, id sequences
//!   media/YYYY/MM/    # Uploaded files, served under /media
//!   static/           # Frontend assets, served under /static
//! ```

pub mod database;
pub mod uploads;

pub use database::{
    claim_unique, fetch, load_all, next_id, put, rebind_unique, release_unique, remove,
    remove_credential, set_credential, Record, Store, StoreError, StoreResult, UniqueIndex,
    DEPT_NAME, EMP_PHONE, EMP_USERNAME, STUDENT_NO,
};
pub use uploads::{UploadStorage, MEDIA_URL_PREFIX};
