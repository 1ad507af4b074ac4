use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use copydesk_analysis::validate::FeedbackItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentCategory {
    Accuracy,
    Tone,
    Structure,
    Seo,
    Compliance,
    Grammar,
    Style,
    Formatting,
    General,
}

impl CommentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentCategory::Accuracy => "accuracy",
            CommentCategory::Tone => "tone",
            CommentCategory::Structure => "structure",
            CommentCategory::Seo => "seo",
            CommentCategory::Compliance => "compliance",
            CommentCategory::Grammar => "grammar",
            CommentCategory::Style => "style",
            CommentCategory::Formatting => "formatting",
            CommentCategory::General => "general",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentSeverity {
    Minor,
    Moderate,
    Major,
    Critical,
}

impl CommentSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentSeverity::Minor => "minor",
            CommentSeverity::Moderate => "moderate",
            CommentSeverity::Major => "major",
            CommentSeverity::Critical => "critical",
        }
    }

    /// Fixed display color for the editor UI.
    pub fn color(&self) -> &'static str {
        match self {
            CommentSeverity::Minor => "#fbbf24",
            CommentSeverity::Moderate => "#f97316",
            CommentSeverity::Major => "#ef4444",
            CommentSeverity::Critical => "#b91c1c",
        }
    }
}

/// Comment lifecycle. `pending_review` is the only reopenable state; the
/// others are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatus {
    Pending,
    Addressed,
    Dismissed,
    PendingReview,
}

/// An editor's structured feedback anchored to a text excerpt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub article_id: Uuid,
    /// Verbatim excerpt the editor selected.
    pub selected_text: String,
    pub category: CommentCategory,
    pub severity: CommentSeverity,
    /// Free-text instruction for the revision.
    pub feedback: String,
    pub status: CommentStatus,
    /// Set when a revision approval marks this comment addressed, so "why
    /// was this closed" is always answerable from data.
    pub revision_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        article_id: Uuid,
        selected_text: impl Into<String>,
        category: CommentCategory,
        severity: CommentSeverity,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            article_id,
            selected_text: selected_text.into(),
            category,
            severity,
            feedback: feedback.into(),
            status: CommentStatus::Pending,
            revision_id: None,
            validation_evidence: None,
            validation_warnings: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

impl From<&Comment> for FeedbackItem {
    fn from(comment: &Comment) -> Self {
        FeedbackItem {
            id: comment.id.to_string(),
            selected_text: comment.selected_text.clone(),
            category: comment.category.as_str().to_string(),
            severity: comment.severity.as_str().to_string(),
            feedback: comment.feedback.clone(),
        }
    }
}

/// Partial update applied by `Store::update_comment`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPatch {
    pub status: Option<CommentStatus>,
    pub revision_id: Option<Uuid>,
    pub validation_evidence: Option<String>,
    pub validation_warnings: Option<Vec<String>>,
}

impl CommentPatch {
    pub fn status(status: CommentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn apply(&self, comment: &mut Comment) {
        if let Some(status) = self.status {
            comment.status = status;
        }
        if let Some(revision_id) = self.revision_id {
            comment.revision_id = Some(revision_id);
        }
        if let Some(evidence) = &self.validation_evidence {
            comment.validation_evidence = Some(evidence.clone());
        }
        if let Some(warnings) = &self.validation_warnings {
            comment.validation_warnings = warnings.clone();
        }
    }
}
