use anyhow::Context;
use axum::{extract::State, response::Html};
use tracing::debug;

use crate::{auth::session::CurrentUser, error::ApiError, state::AppState};

/// Primary app shell. Anonymous callers are redirected to `/login` by the
/// `CurrentUser` extractor.
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, ApiError> {
    let path = state.config.static_dir.join("index.html");
    let body = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    debug!(user_id = %user.id, "serving index");
    Ok(Html(body))
}

/// Login page, served regardless of session state.
pub async fn login_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.config.static_dir.join("login.html");
    let body = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    Ok(Html(body))
}
