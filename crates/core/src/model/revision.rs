use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use copydesk_analysis::validate::ValidationResult;

use super::comment::Comment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionType {
    Feedback,
    AutoFix,
    Humanize,
    QualityImprovement,
}

/// Article metadata captured alongside a revision for training export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleContext {
    pub title: String,
    pub target_keyword: Option<String>,
    pub content_type: String,
    pub contributor: String,
    pub word_count: usize,
    pub comment_count: usize,
}

/// An immutable record of one AI-assisted rewrite attempt.
///
/// Once created, only `include_in_training`, `approved`, and
/// `rolled_back_at` may change; `RevisionPatch` is the sole mutation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    pub id: Uuid,
    pub article_id: Uuid,
    pub previous_version: String,
    pub revised_version: String,
    /// Immutable copy of the comments active at generation time.
    pub comments_snapshot: Vec<Comment>,
    pub revision_type: RevisionType,
    pub article_context: ArticleContext,
    pub prompt_used: String,
    pub validation: Option<ValidationResult>,
    pub include_in_training: bool,
    /// Tri-state: `None` = pending human decision.
    pub approved: Option<bool>,
    pub rolled_back_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Revision {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        article_id: Uuid,
        previous_version: String,
        revised_version: String,
        comments_snapshot: Vec<Comment>,
        revision_type: RevisionType,
        article_context: ArticleContext,
        prompt_used: String,
        validation: ValidationResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            article_id,
            previous_version,
            revised_version,
            comments_snapshot,
            revision_type,
            article_context,
            prompt_used,
            validation: Some(validation),
            include_in_training: true,
            approved: None,
            rolled_back_at: None,
            created_at: Utc::now(),
        }
    }
}

/// The only mutable surface of a revision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionPatch {
    pub include_in_training: Option<bool>,
    pub approved: Option<bool>,
    /// `Some(None)` clears a rollback; `Some(Some(_))` records one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolled_back_at: Option<Option<DateTime<Utc>>>,
}

impl RevisionPatch {
    pub fn approved(value: bool) -> Self {
        Self {
            approved: Some(value),
            ..Self::default()
        }
    }

    pub fn apply(&self, revision: &mut Revision) {
        if let Some(include) = self.include_in_training {
            revision.include_in_training = include;
        }
        if let Some(approved) = self.approved {
            revision.approved = Some(approved);
        }
        if let Some(rolled_back_at) = self.rolled_back_at {
            revision.rolled_back_at = rolled_back_at;
        }
    }
}
