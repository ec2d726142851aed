//! Mediflow agent crate - conversation tracking and tool-call orchestration.
//!
//! The scheduler drives a bounded exchange with the completion service:
//! it sends the transcript plus tool schemas, dispatches requested tool
//! calls against the local stores, and stops on a plain-text reply or at
//! the round-trip cap.

mod conversation;
mod error;
mod matcher;
mod scheduler;

pub use conversation::{suggested_actions, ConversationTracker};
pub use error::AgentError;
pub use matcher::{ProviderMatch, ProviderMatcher};
pub use scheduler::{LoopExit, Scheduler, TurnOutcome, MAX_TOOL_ROUNDS};
