//! Mediflow core crate - shared domain types, configuration, and errors.

pub mod config;
pub mod error;
pub mod types;
