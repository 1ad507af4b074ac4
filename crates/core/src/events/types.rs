use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{CommentStatus, RevisionType};

/// Events emitted by the revision workflow, consumed by editor-UI listeners.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditorialEvent {
    RevisionRequested {
        article_id: Uuid,
        revision_type: RevisionType,
    },
    RevisionReady {
        article_id: Uuid,
        revision_id: Uuid,
        addressed: usize,
        partial: usize,
        failed: usize,
    },
    RevisionApproved {
        article_id: Uuid,
        revision_id: Uuid,
        /// Content was applied in memory but the persistence call failed;
        /// the caller should retry the save.
        unsaved: bool,
    },
    RevisionRejected {
        article_id: Uuid,
        revision_id: Uuid,
    },
    RevisionRolledBack {
        article_id: Uuid,
        revision_id: Uuid,
    },
    RevisionReapplied {
        article_id: Uuid,
        revision_id: Uuid,
    },
    CommentUpdated {
        article_id: Uuid,
        comment_id: Uuid,
        status: CommentStatus,
    },
}
