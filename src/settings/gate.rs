//! Per-setting authorization.
//!
//! # Responsibilities
//! - Structural vetoes that no permission outcome can override
//!   (`permalinks` hidden, `active_theme` not editable here)
//! - Core settings reserved for internal callers
//! - Delegation to the permission engine for everything else
//!
//! # Design Decisions
//! - Engine rejections are replaced by one fixed message; the engine's own
//!   detail never reaches the caller
//! - `permalinks` reports not-found rather than forbidden
//! - Blog settings are publicly readable and skip the engine on read

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::permissions::{Action, PermissionEngine, Target};

use super::types::{AccessClass, Context, SettingValue, ACTIVE_THEME_KEY, PERMALINKS_KEY};

const NO_PERMISSION: &str = "You do not have permission to perform this action on settings.";
const CORE_FROM_EXTERNAL: &str = "Attempted to access core setting from external request.";
const ACTIVE_THEME_VIA_API: &str =
    "The active theme cannot be changed via the settings API. Activate a theme through the themes workflow instead.";

#[derive(Clone)]
pub struct AccessGate {
    engine: Arc<dyn PermissionEngine>,
}

impl AccessGate {
    pub fn new(engine: Arc<dyn PermissionEngine>) -> Self {
        Self { engine }
    }

    /// Coarse capability check on the settings collection.
    pub async fn can_manage(&self, ctx: &Context, action: Action) -> Result<()> {
        self.delegate(ctx, action, &Target::Settings).await
    }

    /// Browse permission. Visibility stripping happens in [`visible_to`].
    pub async fn can_browse(&self, ctx: &Context) -> Result<()> {
        self.can_manage(ctx, Action::Browse).await
    }

    /// Read or edit permission for one setting.
    pub async fn can_access(&self, setting: &SettingValue, action: Action, ctx: &Context) -> Result<()> {
        if setting.key == PERMALINKS_KEY {
            metrics::record_access_denied("reserved_key");
            return Err(Error::setting_not_found(&setting.key));
        }

        if action == Action::Edit && setting.key == ACTIVE_THEME_KEY {
            metrics::record_access_denied("active_theme");
            return Err(Error::BadRequest(ACTIVE_THEME_VIA_API.into()));
        }

        if setting.is_core() && !ctx.internal {
            tracing::warn!(key = %setting.key, action = %action, "Core setting requested from external context");
            metrics::record_access_denied("core");
            return Err(Error::PermissionDenied(CORE_FROM_EXTERNAL.into()));
        }

        if action == Action::Read && setting.class == AccessClass::Blog {
            return Ok(());
        }

        self.delegate(ctx, action, &Target::Setting(setting.key.clone())).await
    }

    async fn delegate(&self, ctx: &Context, action: Action, target: &Target) -> Result<()> {
        self.engine.can(ctx, action, target).await.map_err(|e| {
            tracing::debug!(action = %action, error = %e, "Permission engine rejected request");
            metrics::record_access_denied("engine");
            Error::PermissionDenied(NO_PERMISSION.into())
        })
    }
}

/// Whether a browse result may include `setting` for this caller.
pub fn visible_to(setting: &SettingValue, ctx: &Context) -> bool {
    ctx.internal || (!setting.is_core() && setting.key != PERMALINKS_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Engine with a fixed verdict that counts consultations.
    struct FixedEngine {
        allow: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PermissionEngine for FixedEngine {
        async fn can(&self, _ctx: &Context, _action: Action, _target: &Target) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.allow {
                Ok(())
            } else {
                Err(Error::PermissionDenied("engine secret detail".into()))
            }
        }
    }

    fn gate(allow: bool) -> (AccessGate, Arc<FixedEngine>) {
        let engine = Arc::new(FixedEngine { allow, calls: AtomicUsize::new(0) });
        (AccessGate::new(engine.clone()), engine)
    }

    fn setting(key: &str, class: AccessClass) -> SettingValue {
        let now = Utc::now();
        SettingValue {
            id: key.into(),
            key: key.into(),
            value: "v".into(),
            class,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_core_denied_externally_without_consulting_engine() {
        let (gate, engine) = gate(true);
        let core = setting("db_hash", AccessClass::Core);
        let err = gate.can_access(&core, Action::Read, &Context::anonymous()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);

        assert!(gate.can_access(&core, Action::Edit, &Context::internal()).await.is_ok());
    }

    #[tokio::test]
    async fn test_permalinks_is_not_found_even_internally() {
        let (gate, _) = gate(true);
        let permalinks = setting(PERMALINKS_KEY, AccessClass::Blog);
        for action in [Action::Read, Action::Edit] {
            let err = gate.can_access(&permalinks, action, &Context::internal()).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
    }

    #[tokio::test]
    async fn test_active_theme_edit_is_bad_request() {
        let (gate, _) = gate(true);
        let theme = setting(ACTIVE_THEME_KEY, AccessClass::Theme);
        let err = gate.can_access(&theme, Action::Edit, &Context::internal()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(gate.can_access(&theme, Action::Read, &Context::internal()).await.is_ok());
    }

    #[tokio::test]
    async fn test_engine_detail_is_discarded() {
        let (gate, _) = gate(false);
        let title = setting("title", AccessClass::Blog);
        let err = gate.can_access(&title, Action::Edit, &Context::anonymous()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(!err.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_blog_read_skips_engine() {
        let (gate, engine) = gate(false);
        let title = setting("title", AccessClass::Blog);
        assert!(gate.can_access(&title, Action::Read, &Context::anonymous()).await.is_ok());
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_visibility() {
        let ext = Context::anonymous();
        assert!(!visible_to(&setting("db_hash", AccessClass::Core), &ext));
        assert!(!visible_to(&setting(PERMALINKS_KEY, AccessClass::Blog), &ext));
        assert!(visible_to(&setting("title", AccessClass::Blog), &ext));
        assert!(visible_to(&setting("db_hash", AccessClass::Core), &Context::internal()));
    }
}
