//! Core types, errors, and lead validation for the Horizon gateway.

pub mod chat;
pub mod clock;
pub mod error;
pub mod lead;
pub mod limits;

pub use chat::*;
pub use clock::*;
pub use error::{Error, Result};
pub use lead::*;
