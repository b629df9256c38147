pub mod api;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod synth;

pub use error::{MockError, Result};
