//! Web layer for service lookups.
//!
//! Provides read-only HTTP endpoints over the service store.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
