//! Shared pieces of the Mini-Course Creator editor.
//!
//! - `model`: wire mirrors of the server-owned course records
//! - `api`: the backend surface the editor consumes (`CourseApi`, `AiApi`)
//! - `client`: `reqwest`-backed implementation of both traits
//! - `config`, `error`, `perf`, and (feature `telemetry`) console tracing

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod perf;

#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use crate::api::{AiApi, CourseApi};
pub use crate::client::ApiClient;
pub use crate::config::Config;
pub use crate::error::{ApiError, SerDeError};
pub use crate::model::*;
