//! Analysis persistence — pluggable, trait-based store.
//!
//! `AppState` holds an `Arc<dyn AnalysisStore>`; production uses
//! `PgAnalysisStore`. Records are append-only: inserted once, never updated.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::analysis::{encode_list, AnalysisRow, NewAnalysis, ResumeAnalysis};

#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Inserts a new analysis and returns it with its storage-assigned id.
    async fn insert(&self, analysis: NewAnalysis) -> Result<ResumeAnalysis, AppError>;

    /// Looks an analysis up by id. A missing id is `Ok(None)`.
    async fn get(&self, id: Uuid) -> Result<Option<ResumeAnalysis>, AppError>;
}

/// PostgreSQL-backed store over the `resume_analyses` table.
#[derive(Clone)]
pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn encode(items: &[String]) -> Result<String, AppError> {
    encode_list(items).map_err(|e| AppError::Internal(e.into()))
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn insert(&self, analysis: NewAnalysis) -> Result<ResumeAnalysis, AppError> {
        let row = sqlx::query_as::<_, AnalysisRow>(
            r#"
            INSERT INTO resume_analyses
                (filename, job_position, extracted_text, ats_score, selection_probability,
                 suggestions, focus_areas, strengths, weaknesses, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&analysis.filename)
        .bind(&analysis.job_position)
        .bind(&analysis.extracted_text)
        .bind(analysis.ats_score)
        .bind(analysis.selection_probability)
        .bind(encode(&analysis.suggestions)?)
        .bind(encode(&analysis.focus_areas)?)
        .bind(encode(&analysis.strengths)?)
        .bind(encode(&analysis.weaknesses)?)
        .bind(analysis.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Stored analysis {} for {} ({}, status={})",
            row.id, row.filename, row.job_position, row.status
        );

        ResumeAnalysis::try_from(row).map_err(AppError::Internal)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResumeAnalysis>, AppError> {
        let row = sqlx::query_as::<_, AnalysisRow>("SELECT * FROM resume_analyses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ResumeAnalysis::try_from)
            .transpose()
            .map_err(AppError::Internal)
    }
}
