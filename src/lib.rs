//! anamnese - terminal client for structured clinical intake
//!
//! The binary in `main.rs` drives these modules; integration tests use them
//! directly against a mock backend.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod logging;
pub mod record;
pub mod session;
pub mod ui;
pub mod wizard;
