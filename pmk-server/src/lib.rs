//! # pmk-server
//!
//! HTTP surface for the product-management agents.
//!
//! - `POST /api/agents/{agent}` for each of the five steps and the feedback router
//! - `POST /api/workflow` to run the whole workflow, then
//!   `GET`/`DELETE /api/workflow/{sessionId}` and the `feedback` / `feedback/confirm`
//!   sub-routes; the registry keeps a bounded number of runs
//! - `GET /api/health`
//!
//! Every route except health answers with the [`Envelope`]
//! `{success, data, error, metadata}`, failures included.

pub mod config;
pub mod envelope;
pub mod routes;
pub mod state;

pub use config::{SecurityConfig, ServerConfig};
pub use envelope::{Envelope, Responder, ResponseMetadata};
pub use routes::create_app;
pub use state::{AppState, WorkflowRegistry};

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(config: ServerConfig, addr: &str) -> std::io::Result<()> {
    let app = create_app(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "PMK server listening");
    axum::serve(listener, app).await
}
