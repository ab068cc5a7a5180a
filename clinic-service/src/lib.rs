pub mod config;
pub mod consultation;
pub mod model;
pub mod models;
pub mod prompt;
pub mod report;
pub mod service;
pub mod session;

pub use config::ClinicConfig;
pub use service::{AppState, build_router, create_app};
pub use models::*;
