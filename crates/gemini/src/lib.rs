//! Generative-language client used for chat, speech, and health pings.

pub mod chat;
pub mod client;
pub mod config;
pub mod health;
pub mod speech;
pub mod types;
pub mod wav;

pub use client::GeminiClient;
pub use config::GeminiConfig;
pub use health::{HealthStatus, ModelInfo};
