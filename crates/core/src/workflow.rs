//! Revision workflow state machine.
//!
//! One [`RevisionSession`] exists per article-editing session. It owns the
//! single mutable slot (the pending revision), enforces single-flight on AI
//! generation, and routes each comment by its validation verdict when a
//! human approves, never bulk-marking comments addressed just because an
//! AI call returned.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use copydesk_analysis::validate::{
    validate_revision, FeedbackItem, ValidationResult, ValidationStatus,
};

use crate::events::{EditorialEvent, EventBus};
use crate::model::{
    Article, ArticleContext, ArticlePatch, Comment, CommentCategory, CommentPatch, CommentSeverity,
    CommentStatus, Revision, RevisionPatch, RevisionType,
};
use crate::reviser::{build_prompt, clean_model_output, Reviser, ReviserError, RevisionRequest};
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionPhase {
    Idle,
    Generating,
    PendingApproval,
}

/// An unapproved candidate rewrite, held only in session state. The article
/// content is untouched until a human approves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRevision {
    pub revision_id: Uuid,
    pub previous_content: String,
    pub revised_content: String,
    pub feedback_items: Vec<FeedbackItem>,
    pub validation: ValidationResult,
    pub timestamp: DateTime<Utc>,
}

/// Result of approving a pending revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalOutcome {
    pub revision_id: Uuid,
    /// The content now driving the article.
    pub content: String,
    /// True when the approval stood but persisting the article failed;
    /// the caller should retry the save.
    pub unsaved: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("a revision is already in flight for this article")]
    RevisionInFlight,
    #[error("no pending comments to revise")]
    NothingToRevise,
    #[error("no revision is awaiting approval")]
    NoPendingRevision,
    #[error("revision request was cancelled")]
    Cancelled,
    #[error("revision {0} does not allow this transition")]
    InvalidRevisionState(Uuid),
    #[error("comment {0} does not allow this transition")]
    InvalidCommentState(Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Reviser(#[from] ReviserError),
}

struct SessionInner {
    phase: RevisionPhase,
    pending: Option<PendingRevision>,
}

/// Session-scoped owner of the revision state machine for one article.
pub struct RevisionSession {
    article_id: Uuid,
    store: Arc<dyn Store>,
    reviser: Arc<dyn Reviser>,
    events: EventBus,
    inner: Mutex<SessionInner>,
    /// Bumped by `cancel`; a generation that started under an older epoch
    /// discards its AI response.
    epoch: AtomicU64,
}

struct PreparedRequest {
    previous_content: String,
    feedback: Vec<FeedbackItem>,
    prompt: String,
    article: Article,
    comments: Vec<Comment>,
}

impl RevisionSession {
    pub fn new(
        article_id: Uuid,
        store: Arc<dyn Store>,
        reviser: Arc<dyn Reviser>,
        events: EventBus,
    ) -> Self {
        Self {
            article_id,
            store,
            reviser,
            events,
            inner: Mutex::new(SessionInner {
                phase: RevisionPhase::Idle,
                pending: None,
            }),
            epoch: AtomicU64::new(0),
        }
    }

    pub fn article_id(&self) -> Uuid {
        self.article_id
    }

    pub fn phase(&self) -> RevisionPhase {
        self.lock().phase
    }

    pub fn pending(&self) -> Option<PendingRevision> {
        self.lock().pending.clone()
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().expect("session lock poisoned")
    }

    /// Request an AI revision of the article against its pending comments.
    ///
    /// Single-flight: returns [`WorkflowError::RevisionInFlight`] while a
    /// generation is outstanding, without creating a second revision row or
    /// pending slot. On AI failure the session returns to idle with no
    /// comment or article state changed.
    pub async fn request_revision(
        &self,
        revision_type: RevisionType,
    ) -> Result<PendingRevision, WorkflowError> {
        let epoch = {
            let mut inner = self.lock();
            if inner.phase != RevisionPhase::Idle {
                return Err(WorkflowError::RevisionInFlight);
            }
            inner.phase = RevisionPhase::Generating;
            self.epoch.load(Ordering::SeqCst)
        };

        let prepared = match self.prepare_request(revision_type) {
            Ok(prepared) => prepared,
            Err(err) => {
                self.reset_to_idle();
                return Err(err);
            }
        };

        let _ = self.events.publish(EditorialEvent::RevisionRequested {
            article_id: self.article_id,
            revision_type,
        });

        tracing::info!(
            article_id = %self.article_id,
            comments = prepared.feedback.len(),
            "requesting AI revision"
        );

        let raw = match self.reviser.revise(&prepared.prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(article_id = %self.article_id, error = %err, "AI revision failed");
                self.reset_to_idle();
                return Err(err.into());
            }
        };

        self.finish_generation(epoch, revision_type, prepared, raw)
    }

    /// Cancel an in-flight generation. The eventual AI response, if any,
    /// is discarded instead of becoming a pending revision.
    pub fn cancel(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.lock();
        if inner.phase == RevisionPhase::Generating {
            inner.phase = RevisionPhase::Idle;
            tracing::info!(article_id = %self.article_id, "revision request cancelled");
        }
    }

    /// Human approval: apply the revised content, route each comment by its
    /// validation verdict, and mark the revision approved.
    ///
    /// The pending slot is only cleared once routing and the revision update
    /// succeed, so a store failure mid-approval leaves the session in
    /// `PendingApproval` and the call can be retried. A persistence failure
    /// of the article save after that point is non-fatal: the approval
    /// stands, and the outcome flags the unsaved state so the caller retries
    /// the save.
    pub fn approve(&self) -> Result<ApprovalOutcome, WorkflowError> {
        let pending = self
            .lock()
            .pending
            .clone()
            .ok_or(WorkflowError::NoPendingRevision)?;

        for item in &pending.validation.items {
            let Ok(comment_id) = item.id.parse::<Uuid>() else {
                tracing::warn!(id = %item.id, "validation item id is not a comment id; skipping");
                continue;
            };
            let patch = match item.status {
                ValidationStatus::Addressed => CommentPatch {
                    status: Some(CommentStatus::Addressed),
                    revision_id: Some(pending.revision_id),
                    validation_evidence: item.evidence.clone(),
                    validation_warnings: None,
                },
                // Not silently closed: handed back to a human with the
                // evidence and warnings attached.
                ValidationStatus::Partial | ValidationStatus::Failed => CommentPatch {
                    status: Some(CommentStatus::PendingReview),
                    revision_id: Some(pending.revision_id),
                    validation_evidence: item.evidence.clone(),
                    validation_warnings: Some(item.warnings.clone()),
                },
            };
            let updated = match self.store.update_comment(comment_id, patch) {
                Ok(updated) => updated,
                // Snapshot comments stay deletable while the revision is
                // under review; a vanished comment does not veto the rest.
                Err(StoreError::CommentNotFound(_)) => {
                    tracing::warn!(
                        comment_id = %comment_id,
                        "comment deleted during review; skipping its routing"
                    );
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            let _ = self.events.publish(EditorialEvent::CommentUpdated {
                article_id: self.article_id,
                comment_id,
                status: updated.status,
            });
        }

        self.store
            .update_revision(pending.revision_id, RevisionPatch::approved(true))?;

        {
            let mut inner = self.lock();
            inner.pending = None;
            inner.phase = RevisionPhase::Idle;
        }

        let unsaved = match self.store.save_article(
            self.article_id,
            ArticlePatch::content(pending.revised_content.clone()),
        ) {
            Ok(_) => false,
            Err(err) => {
                tracing::error!(
                    article_id = %self.article_id,
                    error = %err,
                    "approved revision applied but article save failed; retry the save"
                );
                true
            }
        };

        let _ = self.events.publish(EditorialEvent::RevisionApproved {
            article_id: self.article_id,
            revision_id: pending.revision_id,
            unsaved,
        });

        Ok(ApprovalOutcome {
            revision_id: pending.revision_id,
            content: pending.revised_content,
            unsaved,
        })
    }

    /// Human rejection: no comment changes, no article mutation. The
    /// revision row is kept for audit with `approved = false`.
    pub fn reject(&self) -> Result<String, WorkflowError> {
        let pending = {
            let mut inner = self.lock();
            let pending = inner
                .pending
                .take()
                .ok_or(WorkflowError::NoPendingRevision)?;
            inner.phase = RevisionPhase::Idle;
            pending
        };

        self.store
            .update_revision(pending.revision_id, RevisionPatch::approved(false))?;

        let _ = self.events.publish(EditorialEvent::RevisionRejected {
            article_id: self.article_id,
            revision_id: pending.revision_id,
        });

        Ok(pending.previous_content)
    }

    /// Roll back an approved revision. Hands back the previous version for
    /// the caller to restore as the live content. Comments the revision
    /// addressed stay closed; rollback is a content operation, not a
    /// retraction of editorial sign-off.
    pub fn rollback(&self, revision_id: Uuid) -> Result<String, WorkflowError> {
        let revision = self.store.get_revision(revision_id)?;
        if revision.approved != Some(true) || revision.rolled_back_at.is_some() {
            return Err(WorkflowError::InvalidRevisionState(revision_id));
        }

        self.store.update_revision(
            revision_id,
            RevisionPatch {
                rolled_back_at: Some(Some(Utc::now())),
                ..RevisionPatch::default()
            },
        )?;

        let _ = self.events.publish(EditorialEvent::RevisionRolledBack {
            article_id: self.article_id,
            revision_id,
        });

        Ok(revision.previous_version)
    }

    /// Reapply a rolled-back revision, handing back the revised version.
    pub fn reapply(&self, revision_id: Uuid) -> Result<String, WorkflowError> {
        let revision = self.store.get_revision(revision_id)?;
        if revision.rolled_back_at.is_none() {
            return Err(WorkflowError::InvalidRevisionState(revision_id));
        }

        self.store.update_revision(
            revision_id,
            RevisionPatch {
                rolled_back_at: Some(None),
                ..RevisionPatch::default()
            },
        )?;

        let _ = self.events.publish(EditorialEvent::RevisionReapplied {
            article_id: self.article_id,
            revision_id,
        });

        Ok(revision.revised_version)
    }

    /// Flip training inclusion, independent of approval state. Affects only
    /// which revisions are later exported as training examples.
    pub fn set_include_in_training(
        &self,
        revision_id: Uuid,
        include: bool,
    ) -> Result<(), WorkflowError> {
        self.store.update_revision(
            revision_id,
            RevisionPatch {
                include_in_training: Some(include),
                ..RevisionPatch::default()
            },
        )?;
        Ok(())
    }

    /// Editor adds a comment by selecting text.
    pub fn add_comment(
        &self,
        selected_text: impl Into<String>,
        category: CommentCategory,
        severity: CommentSeverity,
        feedback: impl Into<String>,
    ) -> Result<Comment, WorkflowError> {
        let comment = self.store.create_comment(Comment::new(
            self.article_id,
            selected_text,
            category,
            severity,
            feedback,
        ))?;
        let _ = self.events.publish(EditorialEvent::CommentUpdated {
            article_id: self.article_id,
            comment_id: comment.id,
            status: comment.status,
        });
        Ok(comment)
    }

    /// Dismiss a pending comment without revising.
    pub fn dismiss_comment(&self, comment_id: Uuid) -> Result<Comment, WorkflowError> {
        self.transition_comment(comment_id, CommentStatus::Pending, CommentStatus::Dismissed)
    }

    /// Reopen a comment the validator left in `pending_review`.
    pub fn reopen_comment(&self, comment_id: Uuid) -> Result<Comment, WorkflowError> {
        self.transition_comment(
            comment_id,
            CommentStatus::PendingReview,
            CommentStatus::Pending,
        )
    }

    /// Delete a comment; only allowed while it is still pending.
    pub fn delete_comment(&self, comment_id: Uuid) -> Result<(), WorkflowError> {
        self.store.delete_comment(comment_id)?;
        Ok(())
    }

    fn transition_comment(
        &self,
        comment_id: Uuid,
        from: CommentStatus,
        to: CommentStatus,
    ) -> Result<Comment, WorkflowError> {
        let comment = self.store.get_comment(comment_id)?;
        if comment.status != from {
            return Err(WorkflowError::InvalidCommentState(comment_id));
        }
        let updated = self
            .store
            .update_comment(comment_id, CommentPatch::status(to))?;
        let _ = self.events.publish(EditorialEvent::CommentUpdated {
            article_id: self.article_id,
            comment_id,
            status: updated.status,
        });
        Ok(updated)
    }

    fn reset_to_idle(&self) {
        let mut inner = self.lock();
        if inner.phase == RevisionPhase::Generating {
            inner.phase = RevisionPhase::Idle;
        }
    }

    fn prepare_request(&self, revision_type: RevisionType) -> Result<PreparedRequest, WorkflowError> {
        let article = self.store.get_article(self.article_id)?;
        let comments: Vec<Comment> = self
            .store
            .list_comments(self.article_id)?
            .into_iter()
            .filter(|c| c.status == CommentStatus::Pending)
            .collect();
        if comments.is_empty() {
            return Err(WorkflowError::NothingToRevise);
        }

        let feedback: Vec<FeedbackItem> = comments.iter().map(FeedbackItem::from).collect();
        let prompt = build_prompt(&RevisionRequest {
            title: article.title.clone(),
            content: article.content.clone(),
            feedback: feedback.clone(),
            revision_type,
        });

        Ok(PreparedRequest {
            previous_content: article.content.clone(),
            feedback,
            prompt,
            article,
            comments,
        })
    }

    fn finish_generation(
        &self,
        epoch: u64,
        revision_type: RevisionType,
        prepared: PreparedRequest,
        raw: String,
    ) -> Result<PendingRevision, WorkflowError> {
        let mut inner = self.lock();

        if self.epoch.load(Ordering::SeqCst) != epoch || inner.phase != RevisionPhase::Generating {
            tracing::info!(
                article_id = %self.article_id,
                "discarding AI response for a cancelled revision request"
            );
            return Err(WorkflowError::Cancelled);
        }

        let revised_content = clean_model_output(&raw);
        let validation = validate_revision(
            &prepared.previous_content,
            &revised_content,
            &prepared.feedback,
        );

        let context = ArticleContext {
            title: prepared.article.title.clone(),
            target_keyword: prepared.article.target_keyword.clone(),
            content_type: prepared.article.content_type.clone(),
            contributor: prepared.article.contributor.clone(),
            word_count: prepared.article.word_count,
            comment_count: prepared.comments.len(),
        };

        let revision = match self.store.create_revision(Revision::new(
            self.article_id,
            prepared.previous_content.clone(),
            revised_content.clone(),
            prepared.comments,
            revision_type,
            context,
            prepared.prompt,
            validation.clone(),
        )) {
            Ok(revision) => revision,
            Err(err) => {
                inner.phase = RevisionPhase::Idle;
                return Err(err.into());
            }
        };

        let pending = PendingRevision {
            revision_id: revision.id,
            previous_content: prepared.previous_content,
            revised_content,
            feedback_items: prepared.feedback,
            validation: validation.clone(),
            timestamp: Utc::now(),
        };

        inner.pending = Some(pending.clone());
        inner.phase = RevisionPhase::PendingApproval;

        let _ = self.events.publish(EditorialEvent::RevisionReady {
            article_id: self.article_id,
            revision_id: revision.id,
            addressed: validation.addressed_count,
            partial: validation.partial_count,
            failed: validation.failed_count,
        });

        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Reviser that returns queued responses, optionally holding each one
    /// until released.
    struct ScriptedReviser {
        responses: Mutex<Vec<Result<String, ReviserError>>>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedReviser {
        fn ok(response: &str) -> Self {
            Self {
                responses: Mutex::new(vec![Ok(response.to_string())]),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn failing() -> Self {
            Self {
                responses: Mutex::new(vec![Err(ReviserError::Timeout)]),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn gated(response: &str, gate: Arc<Notify>) -> Self {
            Self {
                responses: Mutex::new(vec![Ok(response.to_string())]),
                calls: AtomicUsize::new(0),
                gate: Some(gate),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Reviser for ScriptedReviser {
        async fn revise(&self, _prompt: &str) -> Result<String, ReviserError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(ReviserError::EmptyOutput))
        }
    }

    /// Store wrapper whose `save_article` always fails, for the
    /// applied-but-unsaved path.
    struct SaveFailingStore {
        inner: MemoryStore,
    }

    impl Store for SaveFailingStore {
        fn create_article(&self, a: Article) -> Result<Article, StoreError> {
            self.inner.create_article(a)
        }
        fn get_article(&self, id: Uuid) -> Result<Article, StoreError> {
            self.inner.get_article(id)
        }
        fn save_article(&self, _id: Uuid, _patch: ArticlePatch) -> Result<Article, StoreError> {
            Err(StoreError::Backend("save failed".to_string()))
        }
        fn create_comment(&self, c: Comment) -> Result<Comment, StoreError> {
            self.inner.create_comment(c)
        }
        fn get_comment(&self, id: Uuid) -> Result<Comment, StoreError> {
            self.inner.get_comment(id)
        }
        fn update_comment(&self, id: Uuid, p: CommentPatch) -> Result<Comment, StoreError> {
            self.inner.update_comment(id, p)
        }
        fn delete_comment(&self, id: Uuid) -> Result<(), StoreError> {
            self.inner.delete_comment(id)
        }
        fn list_comments(&self, id: Uuid) -> Result<Vec<Comment>, StoreError> {
            self.inner.list_comments(id)
        }
        fn create_revision(&self, r: Revision) -> Result<Revision, StoreError> {
            self.inner.create_revision(r)
        }
        fn get_revision(&self, id: Uuid) -> Result<Revision, StoreError> {
            self.inner.get_revision(id)
        }
        fn update_revision(&self, id: Uuid, p: RevisionPatch) -> Result<Revision, StoreError> {
            self.inner.update_revision(id, p)
        }
        fn list_revisions(&self, id: Uuid) -> Result<Vec<Revision>, StoreError> {
            self.inner.list_revisions(id)
        }
    }

    /// Store wrapper whose first `update_revision` fails, for the
    /// retryable-approve path.
    struct FlakyRevisionStore {
        inner: MemoryStore,
        failed_once: std::sync::atomic::AtomicBool,
    }

    impl Store for FlakyRevisionStore {
        fn create_article(&self, a: Article) -> Result<Article, StoreError> {
            self.inner.create_article(a)
        }
        fn get_article(&self, id: Uuid) -> Result<Article, StoreError> {
            self.inner.get_article(id)
        }
        fn save_article(&self, id: Uuid, patch: ArticlePatch) -> Result<Article, StoreError> {
            self.inner.save_article(id, patch)
        }
        fn create_comment(&self, c: Comment) -> Result<Comment, StoreError> {
            self.inner.create_comment(c)
        }
        fn get_comment(&self, id: Uuid) -> Result<Comment, StoreError> {
            self.inner.get_comment(id)
        }
        fn update_comment(&self, id: Uuid, p: CommentPatch) -> Result<Comment, StoreError> {
            self.inner.update_comment(id, p)
        }
        fn delete_comment(&self, id: Uuid) -> Result<(), StoreError> {
            self.inner.delete_comment(id)
        }
        fn list_comments(&self, id: Uuid) -> Result<Vec<Comment>, StoreError> {
            self.inner.list_comments(id)
        }
        fn create_revision(&self, r: Revision) -> Result<Revision, StoreError> {
            self.inner.create_revision(r)
        }
        fn get_revision(&self, id: Uuid) -> Result<Revision, StoreError> {
            self.inner.get_revision(id)
        }
        fn update_revision(&self, id: Uuid, p: RevisionPatch) -> Result<Revision, StoreError> {
            if !self.failed_once.swap(true, Ordering::SeqCst) {
                return Err(StoreError::Backend("transient failure".to_string()));
            }
            self.inner.update_revision(id, p)
        }
        fn list_revisions(&self, id: Uuid) -> Result<Vec<Revision>, StoreError> {
            self.inner.list_revisions(id)
        }
    }

    const PREVIOUS: &str =
        "<p>Online degrees are flexible. The program is very good for working adults. Many students enroll each year.</p>";
    const REVISED: &str =
        "<p>Online degrees are flexible. The program is a strong fit for working adults. Many students enroll each year.</p>";

    fn session_with(
        store: Arc<dyn Store>,
        reviser: Arc<dyn Reviser>,
    ) -> (RevisionSession, Article, Comment) {
        let article = store
            .create_article(Article::new("Online Nursing Degrees", PREVIOUS))
            .unwrap();
        let comment = store
            .create_comment(Comment::new(
                article.id,
                "very good",
                CommentCategory::Style,
                CommentSeverity::Minor,
                "remove filler word 'very'",
            ))
            .unwrap();
        let session = RevisionSession::new(article.id, store, reviser, EventBus::default());
        (session, article, comment)
    }

    #[tokio::test]
    async fn successful_revision_creates_pending_state() {
        let store = Arc::new(MemoryStore::new());
        let reviser = Arc::new(ScriptedReviser::ok(REVISED));
        let (session, article, _comment) = session_with(store.clone(), reviser);

        let pending = session.request_revision(RevisionType::Feedback).await.unwrap();
        assert_eq!(session.phase(), RevisionPhase::PendingApproval);
        assert_eq!(pending.validation.addressed_count, 1);

        // Article content is not yet mutated.
        assert_eq!(store.get_article(article.id).unwrap().content, PREVIOUS);

        // One revision row, still pending human decision.
        let revisions = store.list_revisions(article.id).unwrap();
        assert_eq!(revisions.len(), 1);
        assert_eq!(revisions[0].approved, None);
        assert_eq!(revisions[0].comments_snapshot.len(), 1);
    }

    #[tokio::test]
    async fn second_request_while_generating_is_rejected() {
        let gate = Arc::new(Notify::new());
        let store = Arc::new(MemoryStore::new());
        let reviser = Arc::new(ScriptedReviser::gated(REVISED, gate.clone()));
        let (session, article, _comment) = session_with(store.clone(), reviser.clone());
        let session = Arc::new(session);

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.request_revision(RevisionType::Feedback).await })
        };
        // Wait until the first request reaches the reviser.
        while reviser.call_count() == 0 {
            tokio::task::yield_now().await;
        }

        let second = session.request_revision(RevisionType::Feedback).await;
        assert!(matches!(second, Err(WorkflowError::RevisionInFlight)));

        gate.notify_one();
        first.await.unwrap().unwrap();

        assert_eq!(reviser.call_count(), 1);
        assert_eq!(store.list_revisions(article.id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_generation_discards_the_response() {
        let gate = Arc::new(Notify::new());
        let store = Arc::new(MemoryStore::new());
        let reviser = Arc::new(ScriptedReviser::gated(REVISED, gate.clone()));
        let (session, article, _comment) = session_with(store.clone(), reviser.clone());
        let session = Arc::new(session);

        let request = {
            let session = session.clone();
            tokio::spawn(async move { session.request_revision(RevisionType::Feedback).await })
        };
        while reviser.call_count() == 0 {
            tokio::task::yield_now().await;
        }

        session.cancel();
        gate.notify_one();

        let result = request.await.unwrap();
        assert!(matches!(result, Err(WorkflowError::Cancelled)));
        assert_eq!(session.phase(), RevisionPhase::Idle);
        assert!(session.pending().is_none());
        assert!(store.list_revisions(article.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn reviser_failure_returns_to_idle_without_side_effects() {
        let store = Arc::new(MemoryStore::new());
        let reviser = Arc::new(ScriptedReviser::failing());
        let (session, article, comment) = session_with(store.clone(), reviser);

        let result = session.request_revision(RevisionType::Feedback).await;
        assert!(matches!(result, Err(WorkflowError::Reviser(_))));
        assert_eq!(session.phase(), RevisionPhase::Idle);
        assert!(store.list_revisions(article.id).unwrap().is_empty());
        assert_eq!(
            store.get_comment(comment.id).unwrap().status,
            CommentStatus::Pending
        );
    }

    #[tokio::test]
    async fn request_without_pending_comments_is_refused() {
        let store = Arc::new(MemoryStore::new());
        let article = store
            .create_article(Article::new("Title", PREVIOUS))
            .unwrap();
        let session = RevisionSession::new(
            article.id,
            store,
            Arc::new(ScriptedReviser::ok(REVISED)),
            EventBus::default(),
        );
        let result = session.request_revision(RevisionType::Feedback).await;
        assert!(matches!(result, Err(WorkflowError::NothingToRevise)));
        assert_eq!(session.phase(), RevisionPhase::Idle);
    }

    #[tokio::test]
    async fn approve_routes_comments_by_validation_verdict() {
        let store = Arc::new(MemoryStore::new());
        let reviser = Arc::new(ScriptedReviser::ok(REVISED));
        let (session, article, addressed_comment) = session_with(store.clone(), reviser);

        // A second comment whose selection survives verbatim: must land in
        // pending_review, not be silently closed.
        let failed_comment = store
            .create_comment(Comment::new(
                article.id,
                "Many students enroll",
                CommentCategory::Accuracy,
                CommentSeverity::Major,
                "cite enrollment numbers",
            ))
            .unwrap();

        session.request_revision(RevisionType::Feedback).await.unwrap();
        let outcome = session.approve().unwrap();
        assert!(!outcome.unsaved);
        assert_eq!(session.phase(), RevisionPhase::Idle);

        let addressed = store.get_comment(addressed_comment.id).unwrap();
        assert_eq!(addressed.status, CommentStatus::Addressed);
        assert_eq!(addressed.revision_id, Some(outcome.revision_id));
        assert!(addressed.validation_evidence.is_some());

        let for_review = store.get_comment(failed_comment.id).unwrap();
        assert_eq!(for_review.status, CommentStatus::PendingReview);

        assert_eq!(store.get_article(article.id).unwrap().content, REVISED);
        let revision = store.get_revision(outcome.revision_id).unwrap();
        assert_eq!(revision.approved, Some(true));
    }

    #[tokio::test]
    async fn reject_restores_content_and_touches_no_comments() {
        let store = Arc::new(MemoryStore::new());
        let reviser = Arc::new(ScriptedReviser::ok(REVISED));
        let (session, article, comment) = session_with(store.clone(), reviser);

        session.request_revision(RevisionType::Feedback).await.unwrap();
        let previous = session.reject().unwrap();

        assert_eq!(previous, PREVIOUS);
        assert_eq!(store.get_article(article.id).unwrap().content, PREVIOUS);
        assert_eq!(
            store.get_comment(comment.id).unwrap().status,
            CommentStatus::Pending
        );
        let revisions = store.list_revisions(article.id).unwrap();
        assert_eq!(revisions[0].approved, Some(false));
        assert_eq!(session.phase(), RevisionPhase::Idle);
    }

    #[tokio::test]
    async fn approve_with_failing_save_reports_unsaved() {
        let store = Arc::new(SaveFailingStore {
            inner: MemoryStore::new(),
        });
        let reviser = Arc::new(ScriptedReviser::ok(REVISED));
        let (session, _article, _comment) = session_with(store.clone(), reviser);

        session.request_revision(RevisionType::Feedback).await.unwrap();
        let outcome = session.approve().unwrap();
        assert!(outcome.unsaved);
        assert_eq!(outcome.content, REVISED);

        // The approval decision itself stands.
        let revision = store.get_revision(outcome.revision_id).unwrap();
        assert_eq!(revision.approved, Some(true));
    }

    #[tokio::test]
    async fn approve_skips_comments_deleted_during_review() {
        let store = Arc::new(MemoryStore::new());
        let reviser = Arc::new(ScriptedReviser::ok(REVISED));
        let (session, article, kept_comment) = session_with(store.clone(), reviser);

        // Second snapshot comment, deleted while the revision awaits
        // approval (still pending, so deletion is legal).
        let doomed = session
            .add_comment(
                "Many students enroll",
                CommentCategory::Accuracy,
                CommentSeverity::Major,
                "cite enrollment numbers",
            )
            .unwrap();

        session.request_revision(RevisionType::Feedback).await.unwrap();
        session.delete_comment(doomed.id).unwrap();

        let outcome = session.approve().unwrap();
        assert!(!outcome.unsaved);

        // The surviving comment is routed and the approval is carried out
        // in full despite the vanished comment.
        let kept = store.get_comment(kept_comment.id).unwrap();
        assert_eq!(kept.status, CommentStatus::Addressed);
        assert_eq!(store.get_article(article.id).unwrap().content, REVISED);
        assert_eq!(
            store.get_revision(outcome.revision_id).unwrap().approved,
            Some(true)
        );
        assert_eq!(session.phase(), RevisionPhase::Idle);
    }

    #[tokio::test]
    async fn failed_approve_keeps_pending_state_and_can_be_retried() {
        let store = Arc::new(FlakyRevisionStore {
            inner: MemoryStore::new(),
            failed_once: std::sync::atomic::AtomicBool::new(false),
        });
        let reviser = Arc::new(ScriptedReviser::ok(REVISED));
        let (session, article, comment) = session_with(store.clone(), reviser);

        session.request_revision(RevisionType::Feedback).await.unwrap();

        let first = session.approve();
        assert!(matches!(first, Err(WorkflowError::Store(StoreError::Backend(_)))));

        // The failed attempt leaves the session retryable: the pending slot
        // is intact, the revision is not approved, and the content is not
        // applied.
        assert_eq!(session.phase(), RevisionPhase::PendingApproval);
        assert!(session.pending().is_some());
        let revision_id = session.pending().unwrap().revision_id;
        assert_eq!(store.get_revision(revision_id).unwrap().approved, None);
        assert_eq!(store.get_article(article.id).unwrap().content, PREVIOUS);

        let outcome = session.approve().unwrap();
        assert!(!outcome.unsaved);
        assert_eq!(session.phase(), RevisionPhase::Idle);
        assert_eq!(store.get_article(article.id).unwrap().content, REVISED);
        assert_eq!(store.get_revision(revision_id).unwrap().approved, Some(true));
        assert_eq!(
            store.get_comment(comment.id).unwrap().status,
            CommentStatus::Addressed
        );
    }

    #[tokio::test]
    async fn rollback_and_reapply_hand_back_the_right_versions() {
        let store = Arc::new(MemoryStore::new());
        let reviser = Arc::new(ScriptedReviser::ok(REVISED));
        let (session, _article, comment) = session_with(store.clone(), reviser);

        session.request_revision(RevisionType::Feedback).await.unwrap();
        let outcome = session.approve().unwrap();

        // Unapproved or unknown revisions cannot be rolled back.
        assert!(matches!(
            session.rollback(Uuid::new_v4()),
            Err(WorkflowError::Store(StoreError::RevisionNotFound(_)))
        ));

        let restored = session.rollback(outcome.revision_id).unwrap();
        assert_eq!(restored, PREVIOUS);
        assert!(store
            .get_revision(outcome.revision_id)
            .unwrap()
            .rolled_back_at
            .is_some());

        // Comments addressed by the revision stay closed.
        assert_eq!(
            store.get_comment(comment.id).unwrap().status,
            CommentStatus::Addressed
        );

        // Double rollback is refused.
        assert!(matches!(
            session.rollback(outcome.revision_id),
            Err(WorkflowError::InvalidRevisionState(_))
        ));

        let reapplied = session.reapply(outcome.revision_id).unwrap();
        assert_eq!(reapplied, REVISED);
        assert!(store
            .get_revision(outcome.revision_id)
            .unwrap()
            .rolled_back_at
            .is_none());
    }

    #[tokio::test]
    async fn training_toggle_is_independent_of_approval() {
        let store = Arc::new(MemoryStore::new());
        let reviser = Arc::new(ScriptedReviser::ok(REVISED));
        let (session, article, _comment) = session_with(store.clone(), reviser);

        session.request_revision(RevisionType::Feedback).await.unwrap();
        let revision_id = store.list_revisions(article.id).unwrap()[0].id;

        session.set_include_in_training(revision_id, false).unwrap();
        assert!(!store.get_revision(revision_id).unwrap().include_in_training);
        // Still pending human decision.
        assert_eq!(store.get_revision(revision_id).unwrap().approved, None);
    }

    #[tokio::test]
    async fn comment_lifecycle_transitions_are_guarded() {
        let store = Arc::new(MemoryStore::new());
        let reviser = Arc::new(ScriptedReviser::ok(REVISED));
        let (session, _article, comment) = session_with(store.clone(), reviser);

        // Pending → dismissed is terminal.
        session.dismiss_comment(comment.id).unwrap();
        assert!(matches!(
            session.dismiss_comment(comment.id),
            Err(WorkflowError::InvalidCommentState(_))
        ));
        // Dismissed comments cannot be reopened.
        assert!(matches!(
            session.reopen_comment(comment.id),
            Err(WorkflowError::InvalidCommentState(_))
        ));

        let fresh = session
            .add_comment(
                "working adults",
                CommentCategory::Tone,
                CommentSeverity::Moderate,
                "soften this",
            )
            .unwrap();
        session.delete_comment(fresh.id).unwrap();
        assert!(matches!(
            store.get_comment(fresh.id),
            Err(StoreError::CommentNotFound(_))
        ));
    }
}
