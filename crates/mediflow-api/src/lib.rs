//! Mediflow API crate - HTTP interface for conversation and appointments.
//!
//! Exposes the scheduling conversation, appointment CRUD, calendar export,
//! and provider lookup over axum.

pub mod error;
pub mod handlers;
mod ics;
pub mod routes;
pub mod state;

pub use routes::{create_router, start_server};
pub use state::AppState;
