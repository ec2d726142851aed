//! Router setup with all API routes and middleware.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mediflow_core::config::GeneralConfig;
use mediflow_core::error::MediflowError;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Single-user local demo; any origin may call the API.
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/conversation", post(handlers::conversation))
        .route(
            "/api/appointments",
            get(handlers::list_appointments).post(handlers::create_appointment),
        )
        .route("/api/appointments/{id}", get(handlers::get_appointment))
        .route("/api/appointments/{id}/ics", get(handlers::appointment_ics))
        .route("/api/providers", get(handlers::list_providers))
        .route("/api/providers/{id}", get(handlers::get_provider))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server on the configured address.
pub async fn start_server(
    general: &GeneralConfig,
    state: AppState,
) -> Result<(), MediflowError> {
    let addr = format!("{}:{}", general.host, general.port);
    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MediflowError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| MediflowError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
