//! Upload intake: extension allow-list, filename sanitising and collision-free saving.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use crate::extract::DocumentKind;

/// Stem used when nothing of the original name survives sanitising.
const FALLBACK_STEM: &str = "upload";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("No file selected")]
    MissingFile,

    #[error("Please specify a target job position")]
    MissingJobPosition,

    #[error("Invalid file type. Please upload PDF, DOC, or DOCX files only.")]
    DisallowedType,

    #[error("Failed to save uploaded file")]
    Save(#[source] std::io::Error),
}

/// True when the filename ends in one of the accepted résumé extensions.
pub fn is_allowed_file(filename: &str) -> bool {
    DocumentKind::from_filename(filename).is_some()
}

/// Reduces a client-supplied filename to a safe, flat ASCII name.
///
/// Path separators become word breaks, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_` trimmed.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Validates the form fields of an upload and returns the sanitised filename.
pub fn validate_upload(filename: Option<&str>, job_position: &str) -> Result<String, IntakeError> {
    let filename = match filename {
        Some(name) if !name.is_empty() => name,
        _ => return Err(IntakeError::MissingFile),
    };
    if job_position.trim().is_empty() {
        return Err(IntakeError::MissingJobPosition);
    }
    if !is_allowed_file(filename) {
        return Err(IntakeError::DisallowedType);
    }

    let safe = secure_filename(filename);
    if is_allowed_file(&safe) {
        return Ok(safe);
    }
    // Sanitising removed the whole stem, e.g. a name written in a non-Latin script.
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or(IntakeError::DisallowedType)?;
    Ok(format!("{FALLBACK_STEM}.{ext}"))
}

/// Name for the `attempt`-th candidate: `resume.pdf`, `resume_1.pdf`, `resume_2.pdf`, …
fn candidate_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{attempt}.{ext}"),
        _ => format!("{filename}_{attempt}"),
    }
}

/// Writes `bytes` into `dir` under `filename`, appending `_1`, `_2`, … before
/// the extension until an unused name is found.
///
/// Files are created with create-new semantics, so concurrent uploads of the
/// same name never overwrite each other.
pub async fn save_upload(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, IntakeError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        error!("Failed to create upload directory {}: {e}", dir.display());
        IntakeError::Save(e)
    })?;

    let mut attempt = 0u32;
    loop {
        let path = dir.join(candidate_name(filename, attempt));
        let opened = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        match opened {
            Ok(mut file) => {
                if let Err(e) = write_all(&mut file, bytes).await {
                    error!("Failed to save uploaded file {}: {e}", path.display());
                    let _ = tokio::fs::remove_file(&path).await;
                    return Err(IntakeError::Save(e));
                }
                info!("Saved upload to {}", path.display());
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => {
                error!("Failed to save uploaded file {}: {e}", path.display());
                return Err(IntakeError::Save(e));
            }
        }
    }
}

async fn write_all(file: &mut tokio::fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await
}

/// Best-effort removal of a saved upload.
pub async fn discard_upload(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != ErrorKind::NotFound {
            error!("Failed to remove upload {}: {e}", path.display());
        }
    }
}
