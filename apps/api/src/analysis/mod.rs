//! Résumé analysis — structured ATS verdict and narrative feedback.
//!
//! Both operations make a single model call and never fail: the structured
//! analysis degrades to a placeholder result, narrative feedback degrades to
//! an explanatory string.

pub mod prompts;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::analysis::prompts::{render, ANALYSIS_PROMPT, ANALYSIS_SYSTEM, FEEDBACK_PROMPT};
use crate::llm_client::{GenerativeModel, LlmError, ANALYSIS_MODEL, FEEDBACK_MODEL};
use crate::models::analysis::{AnalysisStatus, NewAnalysis};

pub const TECHNICAL_ERROR_FOCUS: &str = "Technical Error";
pub const TECHNICAL_ERROR_WEAKNESS: &str = "Unable to analyze due to technical issues";
pub const FEEDBACK_UNAVAILABLE: &str = "Unable to generate detailed feedback at this time.";

/// The structured verdict the model is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "deserialize_score")]
    pub ats_score: i32,
    pub selection_probability: f64,
    pub suggestions: Vec<String>,
    pub focus_areas: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl AnalysisResult {
    /// Placeholder used whenever the model call or its parsing fails.
    pub fn degraded(reason: &str) -> Self {
        AnalysisResult {
            ats_score: 0,
            selection_probability: 0.0,
            suggestions: vec![format!("Analysis failed: {reason}")],
            focus_areas: vec![TECHNICAL_ERROR_FOCUS.to_string()],
            strengths: Vec::new(),
            weaknesses: vec![TECHNICAL_ERROR_WEAKNESS.to_string()],
        }
    }
}

/// Accepts the score as any JSON number; fractional scores are rounded.
fn deserialize_score<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let score = f64::deserialize(deserializer)?;
    if !score.is_finite() {
        return Err(D::Error::custom("ats_score is not a finite number"));
    }
    Ok(score.round() as i32)
}

/// An analysis result together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub status: AnalysisStatus,
}

impl Analysis {
    pub fn into_new_record(
        self,
        filename: String,
        job_position: String,
        extracted_text: String,
    ) -> NewAnalysis {
        let AnalysisResult {
            ats_score,
            selection_probability,
            suggestions,
            focus_areas,
            strengths,
            weaknesses,
        } = self.result;
        NewAnalysis {
            filename,
            job_position,
            extracted_text,
            ats_score,
            selection_probability,
            suggestions,
            focus_areas,
            strengths,
            weaknesses,
            status: self.status,
        }
    }
}

/// Response schema in the OpenAPI subset accepted by Gemini's `responseSchema`.
pub fn response_schema() -> Value {
    let string_list = json!({"type": "ARRAY", "items": {"type": "STRING"}});
    json!({
        "type": "OBJECT",
        "properties": {
            "ats_score": {"type": "INTEGER"},
            "selection_probability": {"type": "NUMBER"},
            "suggestions": string_list,
            "focus_areas": string_list,
            "strengths": string_list,
            "weaknesses": string_list,
        },
        "required": [
            "ats_score",
            "selection_probability",
            "suggestions",
            "focus_areas",
            "strengths",
            "weaknesses"
        ],
        "propertyOrdering": [
            "ats_score",
            "selection_probability",
            "suggestions",
            "focus_areas",
            "strengths",
            "weaknesses"
        ]
    })
}

/// Runs the structured ATS analysis. Any failure yields the degraded result.
pub async fn analyze_resume(
    llm: &dyn GenerativeModel,
    resume_text: &str,
    job_position: &str,
) -> Analysis {
    match request_analysis(llm, resume_text, job_position).await {
        Ok(result) => Analysis {
            result,
            status: AnalysisStatus::Ok,
        },
        Err(e) => {
            error!("Failed to analyze resume: {e}");
            Analysis {
                result: AnalysisResult::degraded(&e.to_string()),
                status: AnalysisStatus::Degraded,
            }
        }
    }
}

async fn request_analysis(
    llm: &dyn GenerativeModel,
    resume_text: &str,
    job_position: &str,
) -> Result<AnalysisResult, LlmError> {
    let prompt = render(ANALYSIS_PROMPT, job_position, resume_text);
    let raw = llm
        .generate_json(ANALYSIS_MODEL, ANALYSIS_SYSTEM, &prompt, &response_schema())
        .await?;
    debug!("Gemini analysis reply: {raw}");

    if raw.trim().is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(serde_json::from_str(&raw)?)
}

/// Free-form narrative feedback, generated live. Errors come back as text.
pub async fn detailed_feedback(
    llm: &dyn GenerativeModel,
    resume_text: &str,
    job_position: &str,
) -> String {
    let prompt = render(FEEDBACK_PROMPT, job_position, resume_text);
    match llm.generate_text(FEEDBACK_MODEL, &prompt).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) | Err(LlmError::EmptyContent) => FEEDBACK_UNAVAILABLE.to_string(),
        Err(e) => {
            error!("Failed to get detailed feedback: {e}");
            format!("Error generating feedback: {e}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::MockGenerativeModel;

    const VALID_REPLY: &str = r#"{
        "ats_score": 82,
        "selection_probability": 0.64,
        "suggestions": ["Add a skills section", "Quantify achievements"],
        "focus_areas": ["Keywords"],
        "strengths": ["Clear layout"],
        "weaknesses": ["No metrics"]
    }"#;

    fn expected_degraded(message: &str) -> AnalysisResult {
        AnalysisResult {
            ats_score: 0,
            selection_probability: 0.0,
            suggestions: vec![format!("Analysis failed: {message}")],
            focus_areas: vec!["Technical Error".to_string()],
            strengths: vec![],
            weaknesses: vec!["Unable to analyze due to technical issues".to_string()],
        }
    }

    #[tokio::test]
    async fn test_valid_reply_is_parsed() {
        let mut llm = MockGenerativeModel::new();
        llm.expect_generate_json()
            .withf(|model, system, prompt, _| {
                model == ANALYSIS_MODEL
                    && system.contains("ATS")
                    && prompt.contains("Software Engineer")
                    && prompt.contains("Jane Doe, Rust developer")
            })
            .times(1)
            .returning(|_, _, _, _| Ok(VALID_REPLY.to_string()));

        let analysis = analyze_resume(&llm, "Jane Doe, Rust developer", "Software Engineer").await;

        assert_eq!(analysis.status, AnalysisStatus::Ok);
        assert_eq!(analysis.result.ats_score, 82);
        assert!((analysis.result.selection_probability - 0.64).abs() < f64::EPSILON);
        assert_eq!(
            analysis.result.suggestions,
            vec!["Add a skills section", "Quantify achievements"]
        );
        assert_eq!(analysis.result.weaknesses, vec!["No metrics"]);
    }

    #[tokio::test]
    async fn test_call_failure_degrades() {
        let mut llm = MockGenerativeModel::new();
        llm.expect_generate_json().returning(|_, _, _, _| {
            Err(LlmError::Api {
                status: 503,
                message: "overloaded".to_string(),
            })
        });

        let analysis = analyze_resume(&llm, "text", "Designer").await;

        assert_eq!(analysis.status, AnalysisStatus::Degraded);
        assert_eq!(
            analysis.result,
            expected_degraded("API error (status 503): overloaded")
        );
    }

    #[tokio::test]
    async fn test_empty_reply_degrades() {
        let mut llm = MockGenerativeModel::new();
        llm.expect_generate_json()
            .returning(|_, _, _, _| Ok("   ".to_string()));

        let analysis = analyze_resume(&llm, "text", "Designer").await;

        assert_eq!(analysis.status, AnalysisStatus::Degraded);
        assert_eq!(
            analysis.result,
            expected_degraded("Empty response from Gemini API")
        );
    }

    #[tokio::test]
    async fn test_malformed_reply_degrades() {
        let mut llm = MockGenerativeModel::new();
        llm.expect_generate_json()
            .returning(|_, _, _, _| Ok(r#"{"ats_score": "high"}"#.to_string()));

        let analysis = analyze_resume(&llm, "text", "Designer").await;

        assert_eq!(analysis.status, AnalysisStatus::Degraded);
        assert_eq!(analysis.result.ats_score, 0);
        assert!(analysis.result.suggestions[0].starts_with("Analysis failed: JSON parse error"));
        assert_eq!(analysis.result.focus_areas, vec!["Technical Error"]);
    }

    #[tokio::test]
    async fn test_fractional_score_is_rounded() {
        let mut llm = MockGenerativeModel::new();
        llm.expect_generate_json().returning(|_, _, _, _| {
            Ok(VALID_REPLY.replace("\"ats_score\": 82", "\"ats_score\": 82.0"))
        });

        let analysis = analyze_resume(&llm, "text", "Designer").await;

        assert_eq!(analysis.status, AnalysisStatus::Ok);
        assert_eq!(analysis.result.ats_score, 82);
    }

    #[test]
    fn test_score_rounds_half_up() {
        let reply = VALID_REPLY.replace("\"ats_score\": 82", "\"ats_score\": 74.5");
        let result: AnalysisResult = serde_json::from_str(&reply).unwrap();
        assert_eq!(result.ats_score, 75);
    }

    #[tokio::test]
    async fn test_feedback_returns_model_text() {
        let mut llm = MockGenerativeModel::new();
        llm.expect_generate_text()
            .withf(|model, prompt| model == FEEDBACK_MODEL && prompt.contains("Data Analyst"))
            .returning(|_, _| Ok("Strong start. Add SQL projects.".to_string()));

        let feedback = detailed_feedback(&llm, "resume", "Data Analyst").await;
        assert_eq!(feedback, "Strong start. Add SQL projects.");
    }

    #[tokio::test]
    async fn test_feedback_error_becomes_text() {
        let mut llm = MockGenerativeModel::new();
        llm.expect_generate_text().returning(|_, _| {
            Err(LlmError::Api {
                status: 401,
                message: "API key not valid".to_string(),
            })
        });

        let feedback = detailed_feedback(&llm, "resume", "Data Analyst").await;
        assert_eq!(
            feedback,
            "Error generating feedback: API error (status 401): API key not valid"
        );
    }

    #[tokio::test]
    async fn test_feedback_empty_reply() {
        let mut llm = MockGenerativeModel::new();
        llm.expect_generate_text()
            .returning(|_, _| Err(LlmError::EmptyContent));

        let feedback = detailed_feedback(&llm, "resume", "Data Analyst").await;
        assert_eq!(feedback, FEEDBACK_UNAVAILABLE);
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = response_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 6);
        assert_eq!(schema["properties"]["ats_score"]["type"], "INTEGER");
        assert_eq!(schema["properties"]["weaknesses"]["items"]["type"], "STRING");
    }

    #[test]
    fn test_into_new_record_keeps_all_lists() {
        let analysis = Analysis {
            result: AnalysisResult::degraded("boom"),
            status: AnalysisStatus::Degraded,
        };
        let record = analysis.into_new_record(
            "cv.docx".to_string(),
            "Nurse".to_string(),
            "text".to_string(),
        );
        assert_eq!(record.suggestions, vec!["Analysis failed: boom"]);
        assert_eq!(record.weaknesses, vec![TECHNICAL_ERROR_WEAKNESS]);
        assert_eq!(record.status, AnalysisStatus::Degraded);
    }
}
