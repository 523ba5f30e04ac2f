use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use tower_sessions::Session;
use tracing::warn;
use uuid::Uuid;

use crate::auth::User;
use crate::state::AppState;

/// Session key under which the authenticated user's id is stored.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Bind a session to a user id. The session id is rotated before the
/// authenticated state is written.
pub async fn establish(
    session: &Session,
    user_id: Uuid,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id).await
}

/// The authenticated user for this request, resolved from the session by id.
///
/// Anonymous requests are rejected with a redirect to the login page.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, e)| {
                warn!(error = e, "session unavailable on request");
                Redirect::to("/login")
            })?;

        let user_id: Uuid = match session.get(SESSION_USER_ID_KEY).await {
            Ok(Some(id)) => id,
            Ok(None) => return Err(Redirect::to("/login")),
            Err(e) => {
                warn!(error = %e, "failed to read session");
                return Err(Redirect::to("/login"));
            }
        };

        match User::find_by_id(&state.db, user_id).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                // Stale session naming a user that no longer exists.
                let _ = session.flush().await;
                Err(Redirect::to("/login"))
            }
            Err(e) => {
                warn!(error = %e, user_id = %user_id, "session user lookup failed");
                Err(Redirect::to("/login"))
            }
        }
    }
}
