//! HTTP transport for the playground backend.
//!
//! [`PlaygroundApi`] talks to `/execute` and `/compile` with [`reqwest`]
//! and implements [`rustplay_core::Backend`], classifying transport errors
//! into [`rustplay_core::JobFailure`]s.

pub mod api;
pub mod backend;
pub mod config;
pub mod wire;

pub use api::{ApiError, PlaygroundApi};
pub use backend::classify;
pub use config::ClientConfig;
