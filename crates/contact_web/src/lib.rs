//! HTTP surface for the contact book.
//!
//! # Responsibility
//! - Map routes and form bodies onto `contact_core` workflows.
//! - Own process-level wiring: configuration, sessions, rendering.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod views;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use routes::router;
pub use session::{Session, SESSION_COOKIE};
pub use state::AppState;
