pub mod api;
pub mod assemble;
pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod telemetry;
pub mod translate;

pub use error::{RelayError, Result};
