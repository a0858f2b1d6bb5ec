//! HTTP API layer for the gateway.

pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::{AppState, LeadPolicy};
