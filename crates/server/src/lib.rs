//! HTTP front end for the job-posting fraud scoring service

pub mod api;
pub mod config;

pub use api::{create_router, serve, ApiError, AppState};
pub use config::ServiceConfig;
