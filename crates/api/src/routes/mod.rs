pub mod analysis;
pub mod articles;
pub mod comments;
pub mod health;
pub mod revisions;

use axum::Router;

use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(analysis::routes())
        .merge(articles::routes())
        .merge(comments::routes())
        .merge(revisions::routes())
        .with_state(state)
}
