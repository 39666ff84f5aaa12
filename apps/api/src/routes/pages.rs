//! HTML page handlers. Every failure becomes a flash message and a redirect
//! to the upload form.

use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use bytes::Bytes;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::analyze_resume;
use crate::errors::AppError;
use crate::extract::extract_text;
use crate::flash::{redirect_with_flash, take_flash, Flash};
use crate::intake::{discard_upload, save_upload, validate_upload, IntakeError};
use crate::models::analysis::ResumeAnalysis;
use crate::state::AppState;
use crate::views::{AnalysisPage, IndexPage};

pub const FILE_FIELD: &str = "resume_file";
pub const JOB_POSITION_FIELD: &str = "job_position";

const ANALYSIS_NOT_FOUND: &str = "Analysis not found or error loading results";

#[derive(Debug, Error)]
enum UploadError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error("File too large. Please upload a file smaller than {limit_mb}MB.")]
    TooLarge { limit_mb: usize },

    #[error("An error occurred while processing your file: {0}")]
    Multipart(MultipartError),

    #[error("Failed to extract text from the uploaded file")]
    Extraction,

    #[error("An error occurred while processing your file: {}", .0.public_message())]
    App(#[from] AppError),
}

#[derive(Default)]
struct UploadForm {
    file_name: Option<String>,
    bytes: Bytes,
    job_position: String,
}

fn render<T: Template>(template: &T) -> Result<String, AppError> {
    Ok(template.render()?)
}

/// GET /
///
/// Upload form. Consumes the pending flash message, if any.
pub async fn handle_index(jar: CookieJar) -> Response {
    let (jar, flash) = take_flash(jar);
    match render(&IndexPage {
        flash: flash.as_ref(),
    }) {
        Ok(html) => (jar, Html(html)).into_response(),
        Err(e) => {
            error!("Failed to render index: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Fallback for unknown routes: the upload form with a 404 status.
pub async fn handle_not_found() -> Response {
    match render(&IndexPage { flash: None }) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            error!("Failed to render not-found page: {e}");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// POST /upload
///
/// Full pipeline: intake → extraction → analysis → insert → redirect to the result.
pub async fn handle_upload(State(state): State<AppState>, multipart: Multipart) -> Response {
    match process_upload(&state, multipart).await {
        Ok(id) => Redirect::to(&format!("/analysis/{id}")).into_response(),
        Err(e) => {
            warn!("Upload rejected: {e}");
            redirect_with_flash("/", Flash::error(e.to_string()))
        }
    }
}

async fn process_upload(state: &AppState, multipart: Multipart) -> Result<Uuid, UploadError> {
    let form = read_form(multipart, state.config.max_upload_bytes).await?;
    let filename = validate_upload(form.file_name.as_deref(), &form.job_position)?;
    let job_position = form.job_position.trim().to_string();

    let path = save_upload(&state.config.upload_dir, &filename, &form.bytes).await?;

    let text = match extract_text(&path, &filename).await {
        Some(text) if !text.is_empty() => text,
        _ => {
            discard_upload(&path).await;
            return Err(UploadError::Extraction);
        }
    };

    let analysis = analyze_resume(state.llm.as_ref(), &text, &job_position).await;
    let stored = state
        .store
        .insert(analysis.into_new_record(filename, job_position, text))
        .await;
    discard_upload(&path).await;

    let stored = stored?;
    info!(
        "Analysis {} created (score={}, status={})",
        stored.id, stored.ats_score, stored.status
    );
    Ok(stored.id)
}

async fn read_form(mut multipart: Multipart, limit: usize) -> Result<UploadForm, UploadError> {
    let too_large = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge {
                limit_mb: limit / (1024 * 1024),
            }
        } else {
            UploadError::Multipart(e)
        }
    };

    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(too_large)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD => {
                form.file_name = field.file_name().map(str::to_string);
                form.bytes = field.bytes().await.map_err(too_large)?;
            }
            JOB_POSITION_FIELD => {
                form.job_position = field.text().await.map_err(too_large)?;
            }
            _ => {}
        }
    }
    Ok(form)
}

/// GET /analysis/:id
pub async fn handle_show_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let page = async {
        let analysis = load_analysis(&state, &id).await?;
        render(&AnalysisPage {
            analysis: &analysis,
        })
    };

    match page.await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            warn!("Failed to show analysis {id}: {e}");
            redirect_with_flash("/", Flash::error(ANALYSIS_NOT_FOUND))
        }
    }
}

/// Parses the path id and loads the analysis. Malformed and unknown ids are both `NotFound`.
pub async fn load_analysis(state: &AppState, id: &str) -> Result<ResumeAnalysis, AppError> {
    let id = Uuid::parse_str(id).map_err(|_| AppError::NotFound(format!("Analysis {id} not found")))?;
    state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Analysis {id} not found")))
}
