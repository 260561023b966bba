// Public API for integration tests and potential library usage

pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod protocol;
pub mod scoring;
pub mod store;
pub mod sync;
pub mod types;
