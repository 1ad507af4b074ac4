//! Abstract persistence seam.
//!
//! The workflow only ever talks to the `Store` trait; the in-memory
//! implementation backs tests and single-process deployments, and a SQL
//! store can implement the same trait without touching call sites.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::model::{
    Article, ArticlePatch, Comment, CommentPatch, CommentStatus, Revision, RevisionPatch,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("article {0} not found")]
    ArticleNotFound(Uuid),
    #[error("comment {0} not found")]
    CommentNotFound(Uuid),
    #[error("revision {0} not found")]
    RevisionNotFound(Uuid),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// CRUD surface the revision workflow persists through.
pub trait Store: Send + Sync {
    fn create_article(&self, article: Article) -> Result<Article, StoreError>;
    fn get_article(&self, id: Uuid) -> Result<Article, StoreError>;
    fn save_article(&self, id: Uuid, patch: ArticlePatch) -> Result<Article, StoreError>;

    fn create_comment(&self, comment: Comment) -> Result<Comment, StoreError>;
    fn get_comment(&self, id: Uuid) -> Result<Comment, StoreError>;
    fn update_comment(&self, id: Uuid, patch: CommentPatch) -> Result<Comment, StoreError>;
    /// Comments may only be deleted while still pending.
    fn delete_comment(&self, id: Uuid) -> Result<(), StoreError>;
    fn list_comments(&self, article_id: Uuid) -> Result<Vec<Comment>, StoreError>;

    fn create_revision(&self, revision: Revision) -> Result<Revision, StoreError>;
    fn get_revision(&self, id: Uuid) -> Result<Revision, StoreError>;
    fn update_revision(&self, id: Uuid, patch: RevisionPatch) -> Result<Revision, StoreError>;
    fn list_revisions(&self, article_id: Uuid) -> Result<Vec<Revision>, StoreError>;
}

#[derive(Default)]
struct Tables {
    articles: HashMap<Uuid, Article>,
    comments: HashMap<Uuid, Comment>,
    revisions: HashMap<Uuid, Revision>,
}

/// In-memory `Store` over `RwLock`ed maps.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().expect("store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().expect("store lock poisoned")
    }
}

impl Store for MemoryStore {
    fn create_article(&self, article: Article) -> Result<Article, StoreError> {
        let mut tables = self.write();
        tables.articles.insert(article.id, article.clone());
        Ok(article)
    }

    fn get_article(&self, id: Uuid) -> Result<Article, StoreError> {
        self.read()
            .articles
            .get(&id)
            .cloned()
            .ok_or(StoreError::ArticleNotFound(id))
    }

    fn save_article(&self, id: Uuid, patch: ArticlePatch) -> Result<Article, StoreError> {
        let mut tables = self.write();
        let article = tables
            .articles
            .get_mut(&id)
            .ok_or(StoreError::ArticleNotFound(id))?;
        patch.apply(article);
        Ok(article.clone())
    }

    fn create_comment(&self, comment: Comment) -> Result<Comment, StoreError> {
        let mut tables = self.write();
        if !tables.articles.contains_key(&comment.article_id) {
            return Err(StoreError::ArticleNotFound(comment.article_id));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    fn get_comment(&self, id: Uuid) -> Result<Comment, StoreError> {
        self.read()
            .comments
            .get(&id)
            .cloned()
            .ok_or(StoreError::CommentNotFound(id))
    }

    fn update_comment(&self, id: Uuid, patch: CommentPatch) -> Result<Comment, StoreError> {
        let mut tables = self.write();
        let comment = tables
            .comments
            .get_mut(&id)
            .ok_or(StoreError::CommentNotFound(id))?;
        patch.apply(comment);
        Ok(comment.clone())
    }

    fn delete_comment(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.write();
        let comment = tables
            .comments
            .get(&id)
            .ok_or(StoreError::CommentNotFound(id))?;
        if comment.status != CommentStatus::Pending {
            return Err(StoreError::Conflict(format!(
                "comment {id} is no longer pending and cannot be deleted"
            )));
        }
        tables.comments.remove(&id);
        Ok(())
    }

    fn list_comments(&self, article_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let mut comments: Vec<Comment> = self
            .read()
            .comments
            .values()
            .filter(|c| c.article_id == article_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    fn create_revision(&self, revision: Revision) -> Result<Revision, StoreError> {
        let mut tables = self.write();
        tables.revisions.insert(revision.id, revision.clone());
        Ok(revision)
    }

    fn get_revision(&self, id: Uuid) -> Result<Revision, StoreError> {
        self.read()
            .revisions
            .get(&id)
            .cloned()
            .ok_or(StoreError::RevisionNotFound(id))
    }

    fn update_revision(&self, id: Uuid, patch: RevisionPatch) -> Result<Revision, StoreError> {
        let mut tables = self.write();
        let revision = tables
            .revisions
            .get_mut(&id)
            .ok_or(StoreError::RevisionNotFound(id))?;
        patch.apply(revision);
        Ok(revision.clone())
    }

    fn list_revisions(&self, article_id: Uuid) -> Result<Vec<Revision>, StoreError> {
        let mut revisions: Vec<Revision> = self
            .read()
            .revisions
            .values()
            .filter(|r| r.article_id == article_id)
            .cloned()
            .collect();
        revisions.sort_by_key(|r| r.created_at);
        Ok(revisions)
    }
}
