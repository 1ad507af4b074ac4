pub mod article;
pub mod comment;
pub mod revision;

pub use article::{Article, ArticlePatch, ArticleStatus, Faq};
pub use comment::{Comment, CommentCategory, CommentPatch, CommentSeverity, CommentStatus};
pub use revision::{ArticleContext, Revision, RevisionPatch, RevisionType};
