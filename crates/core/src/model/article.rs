use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use copydesk_analysis::text;

/// One FAQ entry attached to an article, ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    InReview,
    Approved,
    Published,
}

/// An article in the editorial pipeline.
/// Content is an HTML string; `word_count` is derived from it on every save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub target_keyword: Option<String>,
    pub content_type: String,
    pub contributor: String,
    pub faqs: Vec<Faq>,
    pub status: ArticleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            word_count: text::word_count(&content),
            content,
            target_keyword: None,
            content_type: "article".to_string(),
            contributor: String::new(),
            faqs: Vec::new(),
            status: ArticleStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update applied by `Store::save_article`. Absent fields are left
/// untouched; a content change recomputes the word count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub target_keyword: Option<String>,
    pub faqs: Option<Vec<Faq>>,
    pub status: Option<ArticleStatus>,
}

impl ArticlePatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Apply this patch to an article in place.
    pub fn apply(&self, article: &mut Article) {
        if let Some(title) = &self.title {
            article.title = title.clone();
        }
        if let Some(content) = &self.content {
            article.content = content.clone();
            article.word_count = text::word_count(content);
        }
        if let Some(keyword) = &self.target_keyword {
            article.target_keyword = Some(keyword.clone());
        }
        if let Some(faqs) = &self.faqs {
            article.faqs = faqs.clone();
        }
        if let Some(status) = self.status {
            article.status = status;
        }
        article.updated_at = Utc::now();
    }
}
