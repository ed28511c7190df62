//! Permission decisions.
//!
//! # Data Flow
//! ```text
//! AccessGate
//!     → PermissionEngine::can(context, action, target)
//!     → Ok(()) or an engine-specific error
//! ```
//!
//! # Design Decisions
//! - The engine is a black box behind a trait; callers never inspect its
//!   error detail
//! - `RolePermissions` is the bundled engine: a static role → action table
//! - Internal contexts are always allowed

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::settings::types::Context;

/// Something a caller can do to settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Browse,
    Read,
    Edit,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Browse => "browse",
            Action::Read => "read",
            Action::Edit => "edit",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "browse" => Ok(Action::Browse),
            "read" => Ok(Action::Read),
            "edit" => Ok(Action::Edit),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

/// What an action applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The settings collection as a whole.
    Settings,
    /// A single setting by key.
    Setting(String),
}

/// External "can this actor do this?" decision maker.
#[async_trait]
pub trait PermissionEngine: Send + Sync {
    async fn can(&self, ctx: &Context, action: Action, target: &Target) -> Result<()>;
}

/// Static role-based engine.
#[derive(Debug, Clone, Default)]
pub struct RolePermissions {
    grants: HashMap<String, HashSet<Action>>,
}

impl RolePermissions {
    pub fn new(grants: HashMap<String, HashSet<Action>>) -> Self {
        Self { grants }
    }

    /// Build from the config table (role → action names).
    pub fn from_config(roles: &HashMap<String, Vec<String>>) -> Result<Self> {
        let mut grants = HashMap::new();
        for (role, actions) in roles {
            let parsed = actions
                .iter()
                .map(|a| a.parse::<Action>().map_err(Error::BadRequest))
                .collect::<Result<HashSet<_>>>()?;
            grants.insert(role.clone(), parsed);
        }
        Ok(Self { grants })
    }

    fn allows(&self, role: &str, action: Action) -> bool {
        self.grants.get(role).map(|a| a.contains(&action)).unwrap_or(false)
    }
}

#[async_trait]
impl PermissionEngine for RolePermissions {
    async fn can(&self, ctx: &Context, action: Action, target: &Target) -> Result<()> {
        if ctx.internal {
            return Ok(());
        }

        let actor = ctx
            .actor
            .as_ref()
            .ok_or_else(|| Error::PermissionDenied("No authenticated actor".into()))?;

        if actor.roles.iter().any(|r| self.allows(r, action)) {
            return Ok(());
        }

        Err(Error::PermissionDenied(format!(
            "Actor '{}' lacks '{}' on {:?}",
            actor.id, action, target
        )))
    }
}
