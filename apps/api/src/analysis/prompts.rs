// Prompt templates for résumé analysis.
// `{job_position}` and `{resume_text}` are substituted before sending.

pub const ANALYSIS_SYSTEM: &str = "\
You are an expert ATS (Applicant Tracking System) analyzer and career counselor. \
Analyze the provided resume for the specified job position and provide detailed feedback. \
Your analysis must include:
1. ATS compatibility score (integer 0-100)
2. Selection probability (number 0.0-1.0)
3. Specific improvement suggestions
4. Key focus areas for improvement
5. Current strengths
6. Areas of weakness

Respond with JSON only, in this exact shape:
{
  \"ats_score\": number,
  \"selection_probability\": number,
  \"suggestions\": [\"suggestion1\", \"suggestion2\"],
  \"focus_areas\": [\"area1\", \"area2\"],
  \"strengths\": [\"strength1\", \"strength2\"],
  \"weaknesses\": [\"weakness1\", \"weakness2\"]
}";

pub const ANALYSIS_PROMPT: &str = r#"Target Job Position: {job_position}

Resume Content:
{resume_text}

Analyze this resume for the target position. Focus on:
- Keyword optimization for ATS systems
- Skills alignment with the job requirements
- Relevance and presentation of experience
- Format and structure improvements
- Missing critical elements"#;

pub const FEEDBACK_PROMPT: &str = r#"As an expert career counselor, write detailed, actionable feedback for this resume targeting the position: {job_position}

Resume Content:
{resume_text}

Cover:
1. Overall impression
2. Specific improvements for ATS optimization
3. Content and experience suggestions
4. Format and presentation recommendations
5. Industry-specific advice for {job_position}

Use a professional, encouraging tone and concrete next steps."#;

/// Fills `{job_position}` and `{resume_text}` in a template.
///
/// Substitution is a single left-to-right pass, so placeholder text inside
/// the inserted values is left alone.
pub fn render(template: &str, job_position: &str, resume_text: &str) -> String {
    let mut out = String::with_capacity(template.len() + resume_text.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{job_position}") {
            out.push_str(job_position);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{resume_text}") {
            out.push_str(resume_text);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}
