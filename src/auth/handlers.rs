use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Redirect,
    Json,
};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, MessageResponse, SignupRequest},
        password,
        session::{self, CurrentUser},
        User,
    },
    error::ApiError,
    state::AppState,
};

#[instrument(skip(state, session, payload))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::MalformedRequest(e.body_text()))?;

    let hash = password::hash_password(&payload.password)?;
    let user = match User::create(&state.db, &payload.name, &payload.email, &hash).await {
        Ok(user) => user,
        Err(ApiError::DuplicateIdentity) => {
            warn!(email = %payload.email, "signup with already-registered email");
            return Err(ApiError::DuplicateIdentity);
        }
        Err(e) => return Err(e),
    };

    // Signup implies immediate login.
    session::establish(&session, user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user signed up");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Signup successful",
        }),
    ))
}

#[instrument(skip(state, session, payload))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::MalformedRequest(e.body_text()))?;

    // Unknown email and wrong password answer identically.
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    session::establish(&session, user.id).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Login successful",
        }),
    ))
}

pub async fn logout(session: Session, user: CurrentUser) -> Result<Redirect, ApiError> {
    session.flush().await?;
    info!(user_id = %user.0.id, "user logged out");
    Ok(Redirect::to("/login"))
}
