//! Telemetry for the gateway: tracing setup and in-process counters.
//!
//! Nothing is shipped to an external metrics system; the snapshot is served
//! by the API at `/api/metrics`.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
