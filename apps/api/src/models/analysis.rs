use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Whether a stored analysis came from a real model reply or from the
/// placeholder produced when the model call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Ok,
    Degraded,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Ok => "ok",
            AnalysisStatus::Degraded => "degraded",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(AnalysisStatus::Ok),
            "degraded" => Ok(AnalysisStatus::Degraded),
            other => Err(format!("unknown analysis status '{other}'")),
        }
    }
}

/// Raw `resume_analyses` row. List columns hold JSON-encoded text.
#[derive(Debug, Clone, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub filename: String,
    pub job_position: String,
    pub extracted_text: Option<String>,
    pub ats_score: i32,
    pub selection_probability: f64,
    pub suggestions: String,
    pub focus_areas: String,
    pub strengths: String,
    pub weaknesses: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// A stored analysis with its list fields decoded.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeAnalysis {
    pub id: Uuid,
    pub filename: String,
    pub job_position: String,
    pub extracted_text: Option<String>,
    pub ats_score: i32,
    pub selection_probability: f64,
    pub suggestions: Vec<String>,
    pub focus_areas: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub status: AnalysisStatus,
    pub created_at: DateTime<Utc>,
}

impl ResumeAnalysis {
    pub fn is_degraded(&self) -> bool {
        self.status == AnalysisStatus::Degraded
    }

    /// Selection probability as a whole percentage for display.
    pub fn selection_percent(&self) -> i64 {
        (self.selection_probability * 100.0).round() as i64
    }
}

impl TryFrom<AnalysisRow> for ResumeAnalysis {
    type Error = anyhow::Error;

    fn try_from(row: AnalysisRow) -> Result<Self, Self::Error> {
        Ok(ResumeAnalysis {
            id: row.id,
            filename: row.filename,
            job_position: row.job_position,
            extracted_text: row.extracted_text,
            ats_score: row.ats_score,
            selection_probability: row.selection_probability,
            suggestions: decode_list(&row.suggestions)?,
            focus_areas: decode_list(&row.focus_areas)?,
            strengths: decode_list(&row.strengths)?,
            weaknesses: decode_list(&row.weaknesses)?,
            status: row.status.parse().map_err(anyhow::Error::msg)?,
            created_at: row.created_at,
        })
    }
}

/// Everything needed to insert a new analysis. Id and timestamp come from storage.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub filename: String,
    pub job_position: String,
    pub extracted_text: String,
    pub ats_score: i32,
    pub selection_probability: f64,
    pub suggestions: Vec<String>,
    pub focus_areas: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub status: AnalysisStatus,
}

/// Encodes an ordered list of strings for a TEXT column.
pub fn encode_list(items: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

/// Decodes a TEXT column written by `encode_list`. Blank text is an empty list.
pub fn decode_list(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_round_trip_keeps_order() {
        let items = vec![
            "Add measurable outcomes to each role".to_string(),
            "Mention \"Kubernetes\" explicitly".to_string(),
            "Move education below experience".to_string(),
        ];
        let encoded = encode_list(&items).unwrap();
        assert_eq!(decode_list(&encoded).unwrap(), items);
    }

    #[test]
    fn test_blank_column_decodes_to_empty() {
        assert!(decode_list("").unwrap().is_empty());
        assert!(decode_list("   ").unwrap().is_empty());
    }

    #[test]
    fn test_garbage_column_is_an_error() {
        assert!(decode_list("not json").is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("ok".parse::<AnalysisStatus>().unwrap(), AnalysisStatus::Ok);
        assert_eq!(
            "degraded".parse::<AnalysisStatus>().unwrap(),
            AnalysisStatus::Degraded
        );
        assert!("failed".parse::<AnalysisStatus>().is_err());
    }

    #[test]
    fn test_row_conversion_decodes_lists() {
        let row = AnalysisRow {
            id: Uuid::new_v4(),
            filename: "resume.pdf".to_string(),
            job_position: "Software Engineer".to_string(),
            extracted_text: Some("Jane Doe".to_string()),
            ats_score: 78,
            selection_probability: 0.655,
            suggestions: r#"["Quantify impact"]"#.to_string(),
            focus_areas: r#"["Keywords","Formatting"]"#.to_string(),
            strengths: "[]".to_string(),
            weaknesses: String::new(),
            status: "ok".to_string(),
            created_at: Utc::now(),
        };
        let analysis = ResumeAnalysis::try_from(row).unwrap();
        assert_eq!(analysis.focus_areas, vec!["Keywords", "Formatting"]);
        assert!(analysis.weaknesses.is_empty());
        assert_eq!(analysis.selection_percent(), 66);
        assert!(!analysis.is_degraded());
    }
}
