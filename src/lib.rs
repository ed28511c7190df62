//! Site settings service library.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod permissions;
pub mod routing;
pub mod settings;
pub mod store;

pub use config::ServiceConfig;
pub use error::{Error, ErrorKind, Result};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use settings::SettingsApi;
