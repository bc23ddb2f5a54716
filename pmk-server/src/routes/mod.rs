pub mod agents;
pub mod workflow;

use crate::ServerConfig;
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build CORS layer based on security configuration
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.security.allowed_origins.is_empty() {
        cors.allow_origin(AllowOrigin::any())
    } else {
        let origins: Vec<HeaderValue> =
            config.security.allowed_origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

/// Create the server application.
pub fn create_app(config: ServerConfig) -> Router {
    if config.security.allowed_origins.is_empty() {
        tracing::warn!("CORS allows any origin; set allowed origins for production");
    }
    let state = AppState::new(&config);

    let agents = Router::new()
        .route("/idea-generation", post(agents::idea_generation))
        .route("/user-story", post(agents::user_story))
        .route("/prd", post(agents::prd))
        .route("/sprint-planner", post(agents::sprint_planner))
        .route("/visual-design", post(agents::visual_design))
        .route("/feedback", post(agents::feedback));

    let api_router = Router::new()
        .route("/health", get(health_check))
        .nest("/agents", agents)
        .route("/workflow", post(workflow::start))
        .route("/workflow/{session_id}", get(workflow::get_run).delete(workflow::delete_run))
        .route("/workflow/{session_id}/feedback", post(workflow::submit_feedback))
        .route("/workflow/{session_id}/feedback/confirm", post(workflow::confirm_feedback))
        .with_state(state);

    let cors_layer = build_cors_layer(&config);

    Router::new().nest("/api", api_router).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.security.request_timeout,
            ))
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(cors_layer)
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            )),
    )
}

async fn health_check() -> &'static str {
    "OK"
}
