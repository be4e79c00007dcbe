// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use utoipa::ToSchema;

use crate::{envelope::Envelope, error::ApiError, state::AppState};

pub const UPLOAD_FIELD: &str = "file";
pub const NO_FILE_MSG: &str = "请选择要上传的文件";

/// Multipart form accepted by [`upload`].
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Store the `file` part and return the URL it is served from.
///
/// Parts without a file name are ignored, so a form without a usable file
/// yields the "no file" message rather than an empty upload.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    tag = "Upload",
    responses((status = 200, description = "Envelope with the public URL of the stored file", body = String))
)]
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Envelope<String>, ApiError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        let bytes = field.bytes().await?;
        let url = state.uploads.store(&bytes, &original_name)?;
        tracing::info!(url = %url, original_name = %original_name, size = bytes.len(), "File uploaded");
        return Ok(Envelope::success(url));
    }

    tracing::info!("Upload without a file part");
    Ok(Envelope::error(NO_FILE_MSG))
}
