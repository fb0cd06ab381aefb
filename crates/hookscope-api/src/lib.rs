//! Hookscope HTTP API: capture, listing, generation, and the embedded UI.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
mod ui;

pub use config::Config;
pub use error::ApiError;
pub use server::{create_router, start_server, AppState};
