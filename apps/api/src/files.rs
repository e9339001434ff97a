//! Image upload. Files land under `UPLOAD_DIR/<folder>/<uuid>.<ext>` and
//! the returned relative path is what record rows store in `image_url`.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
const DEFAULT_FOLDER: &str = "general";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_path: String,
    pub url: String,
}

/// POST /api/v1/files/upload — multipart form with a `file` part and an
/// optional `folder` part.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut folder = DEFAULT_FOLDER.to_string();
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("folder") => {
                folder = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid folder field: {e}")))?;
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .ok_or_else(|| AppError::Validation("no filename provided".into()))?
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("failed to read file: {e}")))?;
                file = Some((filename, data.to_vec()));
            }
            _ => {}
        }
    }

    let (filename, data) = file.ok_or_else(|| AppError::Validation("no file provided".into()))?;

    let extension = allowed_extension(&filename).ok_or_else(|| {
        AppError::Validation(format!(
            "file type not allowed; allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))
    })?;

    if data.len() > state.config.max_file_size_bytes {
        return Err(AppError::Validation(format!(
            "file too large; max size: {} bytes",
            state.config.max_file_size_bytes
        )));
    }

    let folder = sanitize_folder(&folder)?;
    let unique_name = format!("{}.{extension}", Uuid::new_v4());

    let dir = std::path::Path::new(&state.config.upload_dir).join(&folder);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    tokio::fs::write(dir.join(&unique_name), &data)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    let file_path = format!("{folder}/{unique_name}");
    let url = format!("/static/uploads/{file_path}");
    Ok(Json(UploadResponse { file_path, url }))
}

/// Lower-cased extension if the filename carries an allow-listed one.
fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Folder names are a single path segment; anything that could escape
/// the upload directory is rejected.
fn sanitize_folder(folder: &str) -> Result<String, AppError> {
    let folder = folder.trim();
    let valid = !folder.is_empty()
        && folder.len() <= 64
        && folder
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(folder.to_string())
    } else {
        Err(AppError::Validation(format!("invalid folder '{folder}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_allow_list() {
        assert_eq!(allowed_extension("a.PNG").as_deref(), Some("png"));
        assert_eq!(allowed_extension("photo.jpeg").as_deref(), Some("jpeg"));
        assert_eq!(allowed_extension("script.exe"), None);
        assert_eq!(allowed_extension("noextension"), None);
    }

    #[test]
    fn test_folder_must_be_single_segment() {
        assert!(sanitize_folder("meals").is_ok());
        assert!(sanitize_folder("kid_1-photos").is_ok());
        assert!(sanitize_folder("../etc").is_err());
        assert!(sanitize_folder("a/b").is_err());
        assert!(sanitize_folder("").is_err());
    }
}
