use std::path::Path;

use axum::extract::{multipart::MultipartRejection, Multipart, State};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    auth::AdminSession,
    error::ApiError,
    response::ApiResponse,
    state::SharedState,
};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const PUBLIC_PREFIX: &str = "/uploads";

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "svg"];

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadView {
    pub url: String,
    pub file_name: String,
    pub size: usize,
}

fn image_extension(file_name: &str) -> Result<String, ApiError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(ApiError::validation(format!(
            "Only {} files can be uploaded",
            IMAGE_EXTENSIONS.join(", ")
        )))
    }
}

fn stored_name(ext: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!(
        "{}-{}.{ext}",
        Utc::now().timestamp_millis(),
        suffix.to_ascii_lowercase()
    )
}

/// Stores an image under the upload directory and returns its public URL.
#[instrument(skip_all)]
pub async fn upload_image(
    State(state): State<SharedState>,
    _admin: AdminSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<UploadView>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::validation(e.body_text()))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let original = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::validation("The uploaded file has no name"))?;
        let ext = image_extension(&original)?;
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(ApiError::validation("The uploaded file is empty"));
        }

        let dir = &state.config.upload_dir;
        let file_name = stored_name(&ext);
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(dir.join(&file_name), &bytes).await?;

        info!("Stored upload {original} as {file_name} ({} bytes)", bytes.len());
        return Ok(ApiResponse::created(UploadView {
            url: format!("{PUBLIC_PREFIX}/{file_name}"),
            file_name,
            size: bytes.len(),
        }));
    }

    Err(ApiError::validation("Multipart field 'file' is required"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_images_are_accepted() {
        assert_eq!(image_extension("logo.PNG").unwrap(), "png");
        assert_eq!(image_extension("team.photo.jpeg").unwrap(), "jpeg");
        assert!(image_extension("payload.exe").is_err());
        assert!(image_extension("no-extension").is_err());
    }

    #[test]
    fn stored_names_keep_the_extension() {
        let name = stored_name("webp");
        assert!(name.ends_with(".webp"));
        assert_ne!(name, stored_name("webp"));
    }
}
