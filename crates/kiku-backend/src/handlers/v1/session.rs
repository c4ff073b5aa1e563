use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;

use kiku::data::AdminCheck;
use kiku::id::SessionId;

use crate::handlers::ApiError;
use crate::identity::identify;
use crate::services::SessionService;

/// Handler to create a new session, administered by the caller
pub async fn create(State(state): State<Arc<crate::AppState>>, jar: CookieJar) -> impl IntoResponse {
    let (jar, caller) = identify(jar, state.secure_cookies);
    let result = state
        .sessions
        .create(&caller)
        .await
        .map(|created| (StatusCode::CREATED, Json(created)))
        .map_err(ApiError::from);
    (jar, result)
}

/// Handler to get a session summary by ID
pub async fn get(
    State(state): State<Arc<crate::AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.sessions.get(&SessionId::from(session_id)).await?;
    Ok(Json(summary))
}

/// Handler to end a session, admin only
pub async fn end(
    State(state): State<Arc<crate::AppState>>,
    Path(session_id): Path<String>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, caller) = identify(jar, state.secure_cookies);
    let result = state
        .sessions
        .end(&SessionId::from(session_id), &caller)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(ApiError::from);
    (jar, result)
}

/// Handler to close a session to new questions and votes, admin only
pub async fn close(
    State(state): State<Arc<crate::AppState>>,
    Path(session_id): Path<String>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, caller) = identify(jar, state.secure_cookies);
    let result = state
        .sessions
        .close(&SessionId::from(session_id), &caller)
        .await
        .map(Json)
        .map_err(ApiError::from);
    (jar, result)
}

/// Handler telling the caller whether they administer the session
pub async fn check_admin(
    State(state): State<Arc<crate::AppState>>,
    Path(session_id): Path<String>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, caller) = identify(jar, state.secure_cookies);
    let result = state
        .sessions
        .is_admin(&SessionId::from(session_id), &caller)
        .await
        .map(|is_admin| Json(AdminCheck { is_admin }))
        .map_err(ApiError::from);
    (jar, result)
}
