/// Multipart upload extraction shared by the image, video and logo routes

use axum::extract::Multipart;
use cms_shared::models::media::MediaKind;
use std::collections::HashMap;
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    uploads::Upload,
};

/// File of an upload request and the text fields sent alongside it
#[derive(Debug)]
pub struct UploadForm {
    pub upload: Upload,

    /// Non-file fields by name, blank values dropped
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// Takes a text field out of the form
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }
}

/// Reads the file of `kind` and any text fields from a multipart body
///
/// # Errors
///
/// - `400 Bad Request`: no file field, or a file of the wrong type
/// - `413 Payload Too Large`: file over the kind's size limit
pub async fn read_upload(mut multipart: Multipart, kind: MediaKind) -> ApiResult<UploadForm> {
    let mut upload = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name != kind.field_name() {
            if field.file_name().is_none() {
                let value = field.text().await?;
                if !value.trim().is_empty() {
                    fields.insert(name, value);
                }
            }
            continue;
        }

        let original_name = field
            .file_name()
            .map(str::to_string)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        if !kind.accepts(&original_name, &content_type) {
            debug!(%original_name, %content_type, field = kind.field_name(), "Rejected upload type");
            return Err(ApiError::BadRequest(format!(
                "Invalid file type for {}",
                kind.field_name()
            )));
        }

        let bytes = field.bytes().await?;
        if bytes.len() > kind.max_bytes() {
            return Err(ApiError::PayloadTooLarge(format!(
                "File exceeds the {} MB limit",
                kind.max_bytes() / (1024 * 1024)
            )));
        }

        upload = Some(Upload {
            original_name,
            content_type,
            bytes,
        });
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    Ok(UploadForm { upload, fields })
}
