pub mod auth;
pub mod config;
pub mod files;
pub mod http_server;
pub mod registry;
pub mod state;
pub mod storage;

pub use config::Config;
pub use state::{ServiceState, StateError};
