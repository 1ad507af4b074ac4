//! Revision workflow actions: request, approve, reject, cancel, rollback,
//! reapply, training toggle, training export.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use copydesk_core::model::{ArticlePatch, Revision, RevisionType};
use copydesk_core::training::{export_training_examples, TrainingExample};
use copydesk_core::workflow::{ApprovalOutcome, PendingRevision};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/articles/{id}/revisions", get(list_revisions))
        .route("/v1/articles/{id}/revisions", post(request_revision))
        .route("/v1/articles/{id}/revisions/cancel", post(cancel_revision))
        .route("/v1/articles/{id}/revisions/approve", post(approve_revision))
        .route("/v1/articles/{id}/revisions/reject", post(reject_revision))
        .route("/v1/articles/{id}/training-examples", get(training_examples))
        .route("/v1/revisions/{id}/rollback", post(rollback_revision))
        .route("/v1/revisions/{id}/reapply", post(reapply_revision))
        .route("/v1/revisions/{id}/training", post(set_training))
}

async fn list_revisions(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Revision>>> {
    Ok(Json(state.store().list_revisions(article_id)?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestRevisionBody {
    revision_type: Option<RevisionType>,
}

async fn request_revision(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    body: Option<Json<RequestRevisionBody>>,
) -> ApiResult<Json<PendingRevision>> {
    let revision_type = body
        .and_then(|Json(b)| b.revision_type)
        .unwrap_or(RevisionType::Feedback);
    let session = state.session_for(article_id);
    let pending = session.request_revision(revision_type).await?;
    Ok(Json(pending))
}

async fn cancel_revision(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> Json<Value> {
    state.session_for(article_id).cancel();
    Json(json!({ "cancelled": true }))
}

async fn approve_revision(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> ApiResult<Json<ApprovalOutcome>> {
    let session = state.session_for(article_id);
    Ok(Json(session.approve()?))
}

async fn reject_revision(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let session = state.session_for(article_id);
    let content = session.reject()?;
    Ok(Json(json!({ "content": content })))
}

/// Roll back an approved revision and restore its previous version as the
/// live article content.
async fn rollback_revision(
    State(state): State<AppState>,
    Path(revision_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let revision = state.store().get_revision(revision_id)?;
    let session = state.session_for(revision.article_id);
    let content = session.rollback(revision_id)?;
    state
        .store()
        .save_article(revision.article_id, ArticlePatch::content(content.clone()))?;
    Ok(Json(json!({ "content": content })))
}

/// Reapply a rolled-back revision, restoring its revised version.
async fn reapply_revision(
    State(state): State<AppState>,
    Path(revision_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let revision = state.store().get_revision(revision_id)?;
    let session = state.session_for(revision.article_id);
    let content = session.reapply(revision_id)?;
    state
        .store()
        .save_article(revision.article_id, ArticlePatch::content(content.clone()))?;
    Ok(Json(json!({ "content": content })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainingBody {
    include_in_training: bool,
}

async fn set_training(
    State(state): State<AppState>,
    Path(revision_id): Path<Uuid>,
    Json(body): Json<TrainingBody>,
) -> ApiResult<Json<Revision>> {
    let revision = state.store().get_revision(revision_id)?;
    let session = state.session_for(revision.article_id);
    session.set_include_in_training(revision_id, body.include_in_training)?;
    Ok(Json(state.store().get_revision(revision_id)?))
}

async fn training_examples(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TrainingExample>>> {
    Ok(Json(export_training_examples(
        state.store().as_ref(),
        article_id,
    )?))
}
