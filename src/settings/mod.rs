//! Settings management subsystem.
//!
//! # Data Flow
//! ```text
//! browse / read
//!     → cache.rs (snapshot lookup)
//!     → gate.rs (visibility, per-key permission)
//!     → projector.rs (type filter, response envelope)
//!
//! edit
//!     → edit.rs pipeline: normalize → authorize (gate.rs) → validate
//!       → persist (store) → refresh cache.rs → project
//! ```
//!
//! # Design Decisions
//! - The cache is the only read path; the store is touched on writes only
//! - Structural rules (`permalinks`, `active_theme`, core class) are checked
//!   before the permission engine is consulted
//! - A batch is authorized as a whole; one denied entry rejects all of it

pub mod cache;
pub mod edit;
pub mod gate;
pub mod projector;
pub mod service;
pub mod types;

pub use cache::{SettingsCache, SettingsCacheBackend};
pub use edit::{EditPipeline, EditRequest, RawEdit};
pub use gate::AccessGate;
pub use projector::{project, SettingsResult};
pub use service::{BrowseOptions, SettingsApi};
pub use types::{AccessClass, Actor, Context, SettingChange, SettingValue};
