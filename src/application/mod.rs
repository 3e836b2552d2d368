//! Application layer module
//!
//! Ties a loaded configuration to a built [`FeeEngine`](crate::services::FeeEngine)
//! and runs command-line requests against it.

pub mod app;

// Re-export main application type
pub use app::Application;
