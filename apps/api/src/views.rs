use askama::Template;

use crate::flash::Flash;
use crate::models::analysis::ResumeAnalysis;

/// Upload form, with the pending flash message if there is one.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage<'a> {
    pub flash: Option<&'a Flash>,
}

#[derive(Template)]
#[template(path = "analysis.html")]
pub struct AnalysisPage<'a> {
    pub analysis: &'a ResumeAnalysis,
}

impl AnalysisPage<'_> {
    /// Bootstrap text colour for the ATS score.
    pub fn score_class(&self) -> &'static str {
        match self.analysis.ats_score {
            s if s >= 75 => "success",
            s if s >= 50 => "warning",
            _ => "danger",
        }
    }
}
