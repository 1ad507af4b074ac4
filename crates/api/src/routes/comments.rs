use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use copydesk_core::model::{Comment, CommentCategory, CommentSeverity};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/articles/{id}/comments", get(list_comments))
        .route("/v1/articles/{id}/comments", post(create_comment))
        .route("/v1/comments/{id}/dismiss", post(dismiss_comment))
        .route("/v1/comments/{id}/reopen", post(reopen_comment))
        .route("/v1/comments/{id}", delete(delete_comment))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    Ok(Json(state.store().list_comments(article_id)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentBody {
    selected_text: String,
    category: CommentCategory,
    severity: CommentSeverity,
    feedback: String,
}

async fn create_comment(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    Json(body): Json<CreateCommentBody>,
) -> ApiResult<Json<Comment>> {
    let session = state.session_for(article_id);
    let comment = session.add_comment(
        body.selected_text,
        body.category,
        body.severity,
        body.feedback,
    )?;
    Ok(Json(comment))
}

async fn dismiss_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Comment>> {
    let comment = state.store().get_comment(id)?;
    let session = state.session_for(comment.article_id);
    Ok(Json(session.dismiss_comment(id)?))
}

async fn reopen_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Comment>> {
    let comment = state.store().get_comment(id)?;
    let session = state.session_for(comment.article_id);
    Ok(Json(session.reopen_comment(id)?))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let comment = state.store().get_comment(id)?;
    let session = state.session_for(comment.article_id);
    session.delete_comment(id)?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
