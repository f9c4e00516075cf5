//! Server configuration and demo business logic for apisig.

pub mod config;
pub mod error;
pub mod handler;
pub mod provider;

pub use config::ServerConfig;
pub use error::CoreError;
pub use handler::DemoHandler;
pub use provider::DemoProvider;
