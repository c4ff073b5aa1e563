use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::handlers::{health, v1};

fn cors(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        // The identity cookie has to travel with cross-origin requests.
        .allow_credentials(true)
}

fn api_routes() -> Router<Arc<AppState>> {
    use v1::{questions, session};

    Router::new()
        .route("/session", post(session::create))
        .route(
            "/session/{session_id}",
            get(session::get).delete(session::end),
        )
        .route("/session/{session_id}/close", post(session::close))
        .route("/session/{session_id}/check-admin", get(session::check_admin))
        .route(
            "/session/{session_id}/questions",
            get(questions::list).post(questions::submit),
        )
        .route(
            "/session/{session_id}/questions/{question_id}/vote",
            put(questions::vote),
        )
}

/// Setup the routes for the server and configure CORS and request tracing
pub fn setup_routes(state: Arc<AppState>, allowed_origins: Vec<HeaderValue>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(health::get))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors(allowed_origins)),
        )
        .with_state(state)
}
