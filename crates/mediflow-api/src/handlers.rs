//! Route handler functions for all API endpoints.
//!
//! Each handler extracts parameters via axum extractors, drives the
//! scheduler or the stores, and returns JSON responses.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mediflow_agent::Scheduler;
use mediflow_core::types::{
    Appointment, AppointmentRequest, ConversationState, Provider,
};

use crate::error::ApiError;
use crate::ics::generate_ics;
use crate::state::AppState;

// =============================================================================
// Request/response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ConversationRequest {
    pub message: String,
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub response: String,
    pub conversation_id: Uuid,
    pub state: ConversationState,
    pub suggested_actions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppointmentConfirmation {
    pub appointment_id: Uuid,
    pub patient_name: String,
    pub provider_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    /// Base64-encoded .ics calendar file.
    pub ics_file: String,
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// POST /api/conversation - one turn of the scheduling conversation.
pub async fn conversation(
    State(state): State<AppState>,
    Json(request): Json<ConversationRequest>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let scheduler: &Arc<Scheduler> = state.scheduler.as_ref().ok_or_else(|| {
        ApiError::ServiceUnavailable(
            "completion service not configured; set an LLM API key".to_string(),
        )
    })?;

    let outcome = scheduler
        .handle_message(request.conversation_id, &request.message)
        .await?;

    Ok(Json(ConversationResponse {
        response: outcome.reply,
        conversation_id: outcome.conversation_id,
        state: outcome.state,
        suggested_actions: outcome.suggestions,
    }))
}

/// POST /api/appointments - book directly, bypassing the conversation.
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(request): Json<AppointmentRequest>,
) -> Result<Json<AppointmentConfirmation>, ApiError> {
    if state.stores.providers.get(&request.provider_id).is_none() {
        return Err(ApiError::NotFound("Provider not found".to_string()));
    }

    let appointment = state.stores.book_appointment(request).map_err(|e| {
        tracing::warn!(error = %e, "Direct booking failed");
        ApiError::UnprocessableEntity(
            "Failed to create appointment. The time slot may no longer be available."
                .to_string(),
        )
    })?;

    let ics = generate_ics(&appointment);
    Ok(Json(AppointmentConfirmation {
        appointment_id: appointment.id,
        patient_name: appointment.patient_name,
        provider_name: appointment.provider_name,
        date: appointment.date,
        time: appointment.time,
        location: appointment.location,
        ics_file: BASE64.encode(ics.as_bytes()),
    }))
}

/// GET /api/appointments - all appointments, oldest first.
pub async fn list_appointments(State(state): State<AppState>) -> Json<Vec<Appointment>> {
    Json(state.stores.appointments.all())
}

/// GET /api/appointments/{id}
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, ApiError> {
    state
        .stores
        .appointments
        .get(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Appointment not found".to_string()))
}

/// GET /api/appointments/{id}/ics - calendar file as a download.
pub async fn appointment_ics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let appointment = state
        .stores
        .appointments
        .get(id)
        .ok_or_else(|| ApiError::NotFound("Appointment not found".to_string()))?;

    let ics = generate_ics(&appointment);
    let response = (
        [
            (header::CONTENT_TYPE, "text/calendar".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=appointment_{}.ics", id),
            ),
        ],
        ics,
    )
        .into_response();
    Ok(response)
}

/// GET /api/providers
pub async fn list_providers(State(state): State<AppState>) -> Json<Vec<Provider>> {
    Json(state.stores.providers.all().to_vec())
}

/// GET /api/providers/{id}
pub async fn get_provider(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Provider>, ApiError> {
    state
        .stores
        .providers
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Provider not found".to_string()))
}
