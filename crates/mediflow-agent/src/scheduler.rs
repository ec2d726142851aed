//! Bounded function-call orchestration loop.
//!
//! Drives one conversation turn: sends the transcript plus tool schemas to
//! the completion service, dispatches requested tool calls against the local
//! stores, and loops until the service replies with plain text or the
//! round-trip cap is hit.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use mediflow_core::types::{AppointmentRequest, ConversationState};
use mediflow_llm::{tool_schemas, ChatCompletionService, ChatMessage, ToolCall};
use mediflow_store::Stores;

use crate::conversation::{suggested_actions, ConversationTracker};
use crate::error::AgentError;
use crate::matcher::ProviderMatcher;

/// Hard cap on completion round trips per turn.
pub const MAX_TOOL_ROUNDS: usize = 5;

const CAPPED_FALLBACK: &str =
    "I'm having trouble completing that request right now. Please try again.";

/// How a turn's orchestration loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The service replied with plain text before the cap.
    Completed,
    /// The cap was hit; the reply is the last partial text or a fallback.
    Capped,
}

/// Result of one conversation turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    pub conversation_id: Uuid,
    pub state: ConversationState,
    pub suggestions: Vec<String>,
    pub exit: LoopExit,
}

/// Orchestrates scheduling conversations over the stores and the
/// completion service.
pub struct Scheduler {
    stores: Stores,
    matcher: ProviderMatcher,
    tracker: ConversationTracker,
    completion: Arc<dyn ChatCompletionService>,
}

impl Scheduler {
    pub fn new(stores: Stores, completion: Arc<dyn ChatCompletionService>) -> Self {
        let matcher = ProviderMatcher::new(stores.providers.clone());
        Self {
            stores,
            matcher,
            tracker: ConversationTracker::new(),
            completion,
        }
    }

    /// Handle one user message, running the tool loop to completion.
    ///
    /// Side effects: transcript growth, state advancement, and any bookings
    /// the dispatched tool calls perform. Retrying a turn can rebook.
    pub async fn handle_message(
        &self,
        conversation_id: Option<Uuid>,
        message: &str,
    ) -> Result<TurnOutcome, AgentError> {
        if message.trim().is_empty() {
            return Err(AgentError::EmptyMessage);
        }

        let id = self.tracker.ensure(conversation_id);
        self.tracker.add_message(id, ChatMessage::user(message))?;

        let tools = tool_schemas();
        let mut last_text: Option<String> = None;

        for round in 0..MAX_TOOL_ROUNDS {
            let mut transcript = vec![ChatMessage::system(&self.tracker.system_prompt(id))];
            transcript.extend(self.tracker.messages(id));

            let reply = self.completion.complete(&transcript, &tools).await?;

            if let Some(text) = &reply.content {
                last_text = Some(text.clone());
            }

            if !reply.wants_tools() {
                let text = reply.content.unwrap_or_default();
                self.tracker.add_message(id, ChatMessage::assistant(&text))?;
                return Ok(self.outcome(id, text, LoopExit::Completed));
            }

            debug!(
                conversation_id = %id,
                round,
                calls = reply.tool_calls.len(),
                "Dispatching tool calls"
            );
            for call in &reply.tool_calls {
                let result = self.dispatch(id, call);
                self.tracker
                    .add_message(id, ChatMessage::assistant_tool_calls(vec![call.clone()]))?;
                self.tracker
                    .add_message(id, ChatMessage::tool_result(&call.id, &result.to_string()))?;
            }
        }

        warn!(conversation_id = %id, cap = MAX_TOOL_ROUNDS, "Tool loop hit round cap");
        let text = last_text.unwrap_or_else(|| CAPPED_FALLBACK.to_string());
        self.tracker.add_message(id, ChatMessage::assistant(&text))?;
        Ok(self.outcome(id, text, LoopExit::Capped))
    }

    /// Current state of a conversation; `Initial` for unknown ids.
    pub fn conversation_state(&self, id: Uuid) -> ConversationState {
        self.tracker.state(id)
    }

    fn outcome(&self, id: Uuid, reply: String, exit: LoopExit) -> TurnOutcome {
        let state = self.tracker.state(id);
        TurnOutcome {
            reply,
            conversation_id: id,
            state,
            suggestions: suggested_actions(state),
            exit,
        }
    }

    /// Execute one tool call, returning its JSON result.
    ///
    /// Failures become `{"error": ...}` results fed back to the service
    /// rather than turn-level errors, so the loop keeps going.
    fn dispatch(&self, id: Uuid, call: &ToolCall) -> Value {
        let args: Value = match serde_json::from_str(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => return json!({ "error": format!("Invalid arguments: {}", e) }),
        };

        match call.function.name.as_str() {
            "identify_provider" => self.identify_provider(id, &args),
            "check_availability" => self.check_availability(id, &args),
            "create_appointment" => self.create_appointment(id, &args),
            other => json!({ "error": format!("Unknown function: {}", other) }),
        }
    }

    fn identify_provider(&self, id: Uuid, args: &Value) -> Value {
        let Some(health_issue) = args["health_issue"].as_str() else {
            return json!({ "error": "health_issue is required" });
        };

        let Some(matched) = self.matcher.match_for_issue(health_issue) else {
            return json!({ "error": "No suitable provider found" });
        };

        self.tracker.set_context(id, "health_issue", json!(health_issue));
        self.tracker.set_context(id, "provider_id", json!(matched.provider_id));
        self.tracker.set_context(id, "provider_name", json!(matched.provider_name));
        if let Some(patient_name) = args["patient_name"].as_str() {
            self.tracker.set_context(id, "patient_name", json!(patient_name));
        }
        self.tracker.advance_state(id, ConversationState::ProviderMatched);

        let Some(provider) = self.stores.providers.get(&matched.provider_id) else {
            return json!({ "error": "No suitable provider found" });
        };
        json!({
            "provider_id": matched.provider_id,
            "provider_name": matched.provider_name,
            "specialty": matched.specialty,
            "experience_years": provider.experience_years,
            "rating": provider.rating,
            "location": provider.location,
            "match_reason": matched.match_reason,
        })
    }

    fn check_availability(&self, id: Uuid, args: &Value) -> Value {
        let Some(provider_id) = args["provider_id"].as_str() else {
            return json!({ "error": "provider_id is required" });
        };
        let num_days = args["num_days"].as_u64().unwrap_or(7) as usize;

        let summary = self.stores.schedules.availability_summary(provider_id, num_days);
        if summary.is_empty() {
            return json!({ "error": "No available slots found" });
        }

        let availability: BTreeMap<String, Vec<String>> = summary
            .iter()
            .map(|(date, slots)| (date.format("%Y-%m-%d").to_string(), slots.clone()))
            .collect();

        self.tracker.set_context(id, "availability", json!(availability));
        self.tracker.advance_state(id, ConversationState::AvailabilityChecked);

        json!({
            "provider_id": provider_id,
            "availability": availability,
            "formatted_message": format_availability_message(&summary),
        })
    }

    fn create_appointment(&self, id: Uuid, args: &Value) -> Value {
        let (Some(patient_name), Some(provider_id), Some(date), Some(time)) = (
            args["patient_name"].as_str(),
            args["provider_id"].as_str(),
            args["date"].as_str(),
            args["time"].as_str(),
        ) else {
            return json!({ "error": "patient_name, provider_id, date, and time are required" });
        };
        let Ok(date) = date.parse::<NaiveDate>() else {
            return json!({ "error": format!("Invalid date: {}", date) });
        };

        let request = AppointmentRequest {
            patient_name: patient_name.to_string(),
            provider_id: provider_id.to_string(),
            date,
            time: time.to_string(),
            reason: args["reason"].as_str().map(str::to_string),
        };

        match self.stores.book_appointment(request) {
            Ok(appointment) => {
                self.tracker
                    .set_context(id, "appointment_id", json!(appointment.id));
                self.tracker
                    .advance_state(id, ConversationState::AppointmentConfirmed);
                json!({
                    "success": true,
                    "appointment_id": appointment.id,
                    "patient_name": appointment.patient_name,
                    "provider_name": appointment.provider_name,
                    "date": appointment.date,
                    "time": appointment.time,
                    "location": appointment.location,
                })
            }
            Err(e) => {
                warn!(error = %e, "Appointment creation failed");
                json!({ "error": "Failed to create appointment. Slot may no longer be available." })
            }
        }
    }
}

/// Render an availability summary as one line per date, slots grouped into
/// morning and afternoon.
fn format_availability_message(availability: &BTreeMap<NaiveDate, Vec<String>>) -> String {
    if availability.is_empty() {
        return "No available slots found.".to_string();
    }

    let slot_hour = |slot: &str| {
        slot.split(':')
            .next()
            .and_then(|h| h.parse::<u32>().ok())
            .unwrap_or(12)
    };

    let mut lines = Vec::new();
    for (date, slots) in availability {
        let morning: Vec<&str> = slots
            .iter()
            .map(String::as_str)
            .filter(|s| slot_hour(s) < 12)
            .collect();
        let afternoon: Vec<&str> = slots
            .iter()
            .map(String::as_str)
            .filter(|s| slot_hour(s) >= 12)
            .collect();

        let mut parts = Vec::new();
        if !morning.is_empty() {
            parts.push(format!("Morning: {}", morning.join(", ")));
        }
        if !afternoon.is_empty() {
            parts.push(format!("Afternoon: {}", afternoon.join(", ")));
        }
        lines.push(format!(
            "{}: {}",
            date.format("%A, %B %d, %Y"),
            parts.join(" | ")
        ));
    }
    lines.join("\n")
}
