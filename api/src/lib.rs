//! HTTP surface of the Harlequin verification service

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod telemetry;

pub use app::{create_app, AppState, DynVerificationService};
pub use startup::Application;
