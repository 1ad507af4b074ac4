//! Export approved revisions as training examples.
//!
//! Only revisions a human approved and left flagged `include_in_training`
//! become positive training signal; rejected revisions are kept for audit
//! but never exported.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ArticleContext, RevisionType};
use crate::store::{Store, StoreError};

/// One prompt/completion pair derived from an approved revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingExample {
    pub revision_id: Uuid,
    pub article_id: Uuid,
    pub prompt: String,
    pub previous_version: String,
    pub revised_version: String,
    pub revision_type: RevisionType,
    pub article_context: ArticleContext,
}

/// Collect training examples for one article.
pub fn export_training_examples(
    store: &dyn Store,
    article_id: Uuid,
) -> Result<Vec<TrainingExample>, StoreError> {
    let examples = store
        .list_revisions(article_id)?
        .into_iter()
        .filter(|r| r.approved == Some(true) && r.include_in_training)
        .map(|r| TrainingExample {
            revision_id: r.id,
            article_id: r.article_id,
            prompt: r.prompt_used,
            previous_version: r.previous_version,
            revised_version: r.revised_version,
            revision_type: r.revision_type,
            article_context: r.article_context,
        })
        .collect();
    Ok(examples)
}
