//! HTTP transport for the settings API.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware layers)
//!     → request.rs (request ID, caller context from bearer token)
//!     → handlers.rs (browse / read / edit / upload / download)
//!     → response.rs (error kind → status + JSON body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{Caller, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
