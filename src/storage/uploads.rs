// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local storage for uploaded files.
//!
//! Files land in `<media>/YYYY/MM/<uuid><ext>` and are served back under
//! `/media/YYYY/MM/<uuid><ext>`.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use uuid::Uuid;

use super::StoreResult;

/// URL prefix the media directory is mounted under.
pub const MEDIA_URL_PREFIX: &str = "/media/";

#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Store `bytes` under a fresh name and return its public URL.
    pub fn store(&self, bytes: &[u8], original_name: &str) -> StoreResult<String> {
        self.store_on(Local::now().date_naive(), bytes, original_name)
    }

    pub fn store_on(&self, day: NaiveDate, bytes: &[u8], original_name: &str) -> StoreResult<String> {
        let relative = format!(
            "{}/{}{}",
            day.format("%Y/%m"),
            Uuid::new_v4(),
            extension_of(original_name)
        );
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("part");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(bytes)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &path)?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Stored upload");
        Ok(format!("{MEDIA_URL_PREFIX}{relative}"))
    }
}

/// `.ext` of the client file name, or empty when it has none we trust.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}
