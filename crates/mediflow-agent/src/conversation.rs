//! In-memory conversation tracking.
//!
//! Each conversation carries its transcript, a state machine position, and a
//! free-form context map filled in as tools run. States only move forward;
//! a non-forward transition is ignored rather than rejected.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use mediflow_core::types::ConversationState;
use mediflow_llm::ChatMessage;

use crate::error::AgentError;

const BASE_PROMPT: &str = "You are a helpful medical appointment scheduling assistant.
Your role is to:
1. Understand the patient's health issue
2. Match them with the appropriate healthcare provider
3. Help them find a suitable appointment time
4. Confirm the appointment details

Be empathetic, clear, and efficient. Ask clarifying questions when needed.
Use the provided functions to:
- identify_provider: Find the right doctor for their issue
- check_availability: Look up available appointment times
- create_appointment: Book the appointment once all details are confirmed

Always confirm key details before creating an appointment.";

#[derive(Debug)]
struct Conversation {
    state: ConversationState,
    messages: Vec<ChatMessage>,
    context: HashMap<String, Value>,
}

impl Conversation {
    fn new() -> Self {
        Self {
            state: ConversationState::Initial,
            messages: Vec::new(),
            context: HashMap::new(),
        }
    }
}

/// Tracks all live conversations behind a single lock.
#[derive(Default)]
pub struct ConversationTracker {
    conversations: Mutex<HashMap<Uuid, Conversation>>,
}

impl ConversationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh conversation and return its id.
    pub fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.lock().insert(id, Conversation::new());
        debug!(conversation_id = %id, "Conversation created");
        id
    }

    /// Return the given id if it exists, otherwise create a new conversation.
    ///
    /// An unknown id is treated as stale (e.g. after a restart) rather than
    /// an error, so callers always get a usable conversation.
    pub fn ensure(&self, id: Option<Uuid>) -> Uuid {
        match id {
            Some(id) if self.lock().contains_key(&id) => id,
            _ => self.create(),
        }
    }

    pub fn add_message(&self, id: Uuid, message: ChatMessage) -> Result<(), AgentError> {
        let mut conversations = self.lock();
        let conversation = conversations
            .get_mut(&id)
            .ok_or(AgentError::ConversationNotFound(id))?;
        conversation.messages.push(message);
        Ok(())
    }

    /// Snapshot of the transcript, oldest first.
    pub fn messages(&self, id: Uuid) -> Vec<ChatMessage> {
        self.lock()
            .get(&id)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    pub fn state(&self, id: Uuid) -> ConversationState {
        self.lock()
            .get(&id)
            .map(|c| c.state)
            .unwrap_or(ConversationState::Initial)
    }

    /// Advance the conversation state. Transitions that do not move forward
    /// are dropped; tool calls can arrive out of order or be retried.
    pub fn advance_state(&self, id: Uuid, next: ConversationState) {
        let mut conversations = self.lock();
        let Some(conversation) = conversations.get_mut(&id) else {
            return;
        };
        if conversation.state.can_advance_to(next) {
            debug!(conversation_id = %id, from = %conversation.state, to = %next, "State advanced");
            conversation.state = next;
        } else {
            debug!(conversation_id = %id, current = %conversation.state, ignored = %next, "Non-forward transition ignored");
        }
    }

    pub fn set_context(&self, id: Uuid, key: &str, value: Value) {
        if let Some(conversation) = self.lock().get_mut(&id) {
            conversation.context.insert(key.to_string(), value);
        }
    }

    pub fn context_value(&self, id: Uuid, key: &str) -> Option<Value> {
        self.lock().get(&id).and_then(|c| c.context.get(key).cloned())
    }

    /// Build the system prompt for the conversation's current state.
    pub fn system_prompt(&self, id: Uuid) -> String {
        let conversations = self.lock();
        let Some(conversation) = conversations.get(&id) else {
            return BASE_PROMPT.to_string();
        };
        let suffix = match conversation.state {
            ConversationState::Initial => {
                "The conversation is just starting. Greet the patient and ask how you can help."
                    .to_string()
            }
            ConversationState::IssueIdentified => {
                "You've identified the patient's health issue. Use identify_provider to find the right doctor."
                    .to_string()
            }
            ConversationState::ProviderMatched => {
                let provider_name = conversation
                    .context
                    .get("provider_name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("the provider");
                format!(
                    "You've matched the patient with {}. Use check_availability to show available times.",
                    provider_name
                )
            }
            ConversationState::AvailabilityChecked => {
                "You've shown available times. Help the patient choose and confirm the appointment details."
                    .to_string()
            }
            ConversationState::AppointmentConfirmed => {
                "The appointment has been confirmed. Provide the details and ask if they need anything else."
                    .to_string()
            }
        };
        format!("{}\n\n{}", BASE_PROMPT, suffix)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Conversation>> {
        // A poisoned lock means a panic mid-update; the map is still usable.
        self.conversations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Next-step hints for the UI, keyed on conversation state.
pub fn suggested_actions(state: ConversationState) -> Vec<String> {
    let actions: &[&str] = match state {
        ConversationState::Initial => &["Describe your health issue", "Ask about providers"],
        ConversationState::IssueIdentified => &[],
        ConversationState::ProviderMatched => &["Check availability", "Ask about the provider"],
        ConversationState::AvailabilityChecked => {
            &["Book an appointment", "Request different times"]
        }
        ConversationState::AppointmentConfirmed => {
            &["Download .ics file", "Schedule another appointment"]
        }
    };
    actions.iter().map(|s| s.to_string()).collect()
}
