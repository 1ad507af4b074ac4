//! The opaque AI text-revision seam.
//!
//! The workflow assembles the prompt inputs and cleans the raw model output;
//! model choice and transport belong to the `Reviser` implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use copydesk_analysis::validate::FeedbackItem;

use crate::model::RevisionType;

#[derive(Debug, thiserror::Error)]
pub enum ReviserError {
    #[error("revision request timed out")]
    Timeout,
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("model returned empty output")]
    EmptyOutput,
}

/// Inputs to one revision request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionRequest {
    pub title: String,
    pub content: String,
    pub feedback: Vec<FeedbackItem>,
    pub revision_type: RevisionType,
}

/// Async AI revision call: prompt in, revised HTML out.
#[async_trait]
pub trait Reviser: Send + Sync {
    async fn revise(&self, prompt: &str) -> Result<String, ReviserError>;
}

/// Assemble the revision prompt from the article and its feedback items.
pub fn build_prompt(request: &RevisionRequest) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "Revise the following article titled \"{}\" so that every piece of editorial feedback below is addressed.\n\
         Return only the revised HTML, preserving structure and tone.\n\n",
        request.title
    ));
    prompt.push_str("Editorial feedback:\n");
    for (index, item) in request.feedback.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. [{}/{}] On \"{}\": {}\n",
            index + 1,
            item.category,
            item.severity,
            item.selected_text,
            item.feedback
        ));
    }
    prompt.push_str("\nArticle HTML:\n");
    prompt.push_str(&request.content);
    prompt
}

/// Strip code fences and "Here is the revised…" wrapper text from raw model
/// output, leaving only the revised HTML.
pub fn clean_model_output(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the opening fence line (```, ```html, ...) and the closing fence.
        text = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
        if let Some(fence) = text.rfind("```") {
            text = &text[..fence];
        }
        text = text.trim();
    }

    // Conversational preamble on its own first line.
    if let Some((first, rest)) = text.split_once('\n') {
        let lower = first.trim().to_lowercase();
        let conversational = ["here", "sure", "certainly", "below", "okay"]
            .iter()
            .any(|opener| lower.starts_with(opener));
        if conversational && (lower.contains("revis") || lower.ends_with(':')) {
            return rest.trim().to_string();
        }
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_feedback_and_content() {
        let request = RevisionRequest {
            title: "Online Nursing Degrees".to_string(),
            content: "<p>body</p>".to_string(),
            feedback: vec![FeedbackItem {
                id: "c1".to_string(),
                selected_text: "very good".to_string(),
                category: "style".to_string(),
                severity: "minor".to_string(),
                feedback: "remove filler".to_string(),
            }],
            revision_type: RevisionType::Feedback,
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("Online Nursing Degrees"));
        assert!(prompt.contains("1. [style/minor] On \"very good\": remove filler"));
        assert!(prompt.contains("<p>body</p>"));
    }

    #[test]
    fn strips_html_code_fence() {
        let raw = "```html\n<p>revised</p>\n```";
        assert_eq!(clean_model_output(raw), "<p>revised</p>");
    }

    #[test]
    fn strips_bare_code_fence() {
        let raw = "```\n<p>revised</p>\n```";
        assert_eq!(clean_model_output(raw), "<p>revised</p>");
    }

    #[test]
    fn strips_conversational_preamble() {
        let raw = "Here is the revised article:\n<p>revised</p>";
        assert_eq!(clean_model_output(raw), "<p>revised</p>");
    }

    #[test]
    fn leaves_clean_output_alone() {
        let raw = "<p>Here we explain the program.</p>\n<p>More.</p>";
        assert_eq!(clean_model_output(raw), raw);
    }
}
