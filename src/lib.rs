//! Gate Relay — library crate for the server binary and integration tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod gate;
pub mod middleware;
pub mod models;
pub mod notification;
pub mod telemetry;

pub use api::AppState;
