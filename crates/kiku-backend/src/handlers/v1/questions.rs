use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;

use kiku::data::{QuestionView, SubmitQuestion};
use kiku::id::{QuestionId, SessionId};

use crate::handlers::ApiError;
use crate::identity::identify;
use crate::services::SessionService;

/// Handler to list a session's questions, most votes first
pub async fn list(
    State(state): State<Arc<crate::AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let questions = state
        .sessions
        .list_questions(&SessionId::from(session_id))
        .await?;
    let views: Vec<QuestionView> = questions.iter().map(QuestionView::from).collect();
    Ok(Json(views))
}

/// Handler to submit a new question
pub async fn submit(
    State(state): State<Arc<crate::AppState>>,
    Path(session_id): Path<String>,
    jar: CookieJar,
    payload: Result<Json<SubmitQuestion>, JsonRejection>,
) -> impl IntoResponse {
    let (jar, caller) = identify(jar, state.secure_cookies);
    let result = async {
        let Json(payload) = payload?;
        let question = state
            .sessions
            .submit_question(&SessionId::from(session_id), &caller, &payload.text)
            .await?;
        Ok::<_, ApiError>((StatusCode::CREATED, Json(QuestionView::from(&question))))
    }
    .await;
    (jar, result)
}

/// Handler to vote on a question
pub async fn vote(
    State(state): State<Arc<crate::AppState>>,
    Path((session_id, question_id)): Path<(String, String)>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, caller) = identify(jar, state.secure_cookies);
    let result = state
        .sessions
        .vote(
            &SessionId::from(session_id),
            &QuestionId::from(question_id),
            &caller,
        )
        .await
        .map(|question| Json(QuestionView::from(&question)))
        .map_err(ApiError::from);
    (jar, result)
}
