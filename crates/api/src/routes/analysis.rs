//! Stateless analysis endpoints: the editor UI recomputes these on content
//! changes (debounced client-side; cost is linear in content length).

use axum::{routing::post, Json, Router};
use serde::Deserialize;

use copydesk_analysis::diff::{diff, DiffResult};
use copydesk_analysis::links::{analyze_links, LinkConfig, LinkReport};
use copydesk_analysis::quality::{evaluate_quality, ArticleMeta, QualityConfig, QualitySnapshot};
use copydesk_analysis::validate::{validate_revision, FeedbackItem, ValidationResult};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/analyze/links", post(links))
        .route("/v1/analyze/quality", post(quality))
        .route("/v1/diff", post(diff_contents))
        .route("/v1/validate", post(validate))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinksBody {
    content: String,
    #[serde(default)]
    config: LinkConfig,
}

async fn links(Json(body): Json<LinksBody>) -> Json<LinkReport> {
    Json(analyze_links(&body.content, &body.config))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QualityBody {
    content: String,
    #[serde(default)]
    meta: ArticleMeta,
    #[serde(default)]
    config: QualityConfig,
}

async fn quality(Json(body): Json<QualityBody>) -> Json<QualitySnapshot> {
    Json(evaluate_quality(&body.content, &body.meta, &body.config))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiffBody {
    old_content: String,
    new_content: String,
}

async fn diff_contents(Json(body): Json<DiffBody>) -> Json<DiffResult> {
    Json(diff(&body.old_content, &body.new_content))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateBody {
    previous_content: String,
    revised_content: String,
    feedback_items: Vec<FeedbackItem>,
}

async fn validate(Json(body): Json<ValidateBody>) -> Json<ValidationResult> {
    Json(validate_revision(
        &body.previous_content,
        &body.revised_content,
        &body.feedback_items,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn diff_endpoint_reports_identity() {
        let Json(result) = diff_contents(Json(DiffBody {
            old_content: "<p>same</p>".to_string(),
            new_content: "<p>same</p>".to_string(),
        }))
        .await;
        assert!(result.identical);
    }

    #[tokio::test]
    async fn links_endpoint_uses_default_config() {
        let Json(report) = links(Json(LinksBody {
            content: "<a href='/x'>x</a>".to_string(),
            config: LinkConfig::default(),
        }))
        .await;
        assert_eq!(report.internal_links, 1);
    }
}
