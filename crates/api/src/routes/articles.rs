use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use copydesk_core::model::{Article, ArticlePatch};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/articles", post(create_article))
        .route("/v1/articles/{id}", get(get_article))
        .route("/v1/articles/{id}", patch(save_article))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateArticleBody {
    title: String,
    #[serde(default)]
    content: String,
    target_keyword: Option<String>,
    content_type: Option<String>,
    contributor: Option<String>,
}

async fn create_article(
    State(state): State<AppState>,
    Json(body): Json<CreateArticleBody>,
) -> ApiResult<Json<Article>> {
    let mut article = Article::new(body.title, body.content);
    article.target_keyword = body.target_keyword;
    if let Some(content_type) = body.content_type {
        article.content_type = content_type;
    }
    if let Some(contributor) = body.contributor {
        article.contributor = contributor;
    }
    let created = state.store().create_article(article)?;
    tracing::info!(article_id = %created.id, "article created");
    Ok(Json(created))
}

async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Article>> {
    Ok(Json(state.store().get_article(id)?))
}

async fn save_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ArticlePatch>,
) -> ApiResult<Json<Article>> {
    Ok(Json(state.store().save_article(id, patch)?))
}
