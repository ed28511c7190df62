//! Routing-configuration artifact management.
//!
//! # Data Flow
//! ```text
//! upload(file, context)
//!     → gate: settings.edit
//!     → artifact.rs (timestamped backup, atomic replace)
//!     → site.rs (release URL generators, reload site application)
//!     → on reload failure: restore backup → reload again → original error
//!
//! download(context)
//!     → gate: settings.browse
//!     → artifact.rs (raw contents, or nothing when absent)
//! ```
//!
//! # Design Decisions
//! - The artifact is a single file; every replacement is one rename
//! - The site application is reached only through `SiteReloader` and
//!   `UrlGenerators`, so tests can script reload failures
//! - Backups are never deleted by this subsystem

pub mod artifact;
pub mod site;
pub mod transaction;

pub use artifact::RoutesArtifact;
pub use site::{RoutesDocument, SiteReloader, SiteRouter, UrlGenerators};
pub use transaction::RoutesConfigTransaction;
