//! Default document checker for edit batches.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::settings::types::SettingChange;

use super::DocumentValidator;

/// Rejects empty keys, duplicate keys and oversized values.
#[derive(Debug, Clone)]
pub struct SchemaValidator {
    max_value_bytes: usize,
}

impl SchemaValidator {
    pub fn new(max_value_bytes: usize) -> Self {
        Self { max_value_bytes }
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(64 * 1024)
    }
}

#[async_trait]
impl DocumentValidator for SchemaValidator {
    async fn check(&self, changes: &[SettingChange]) -> Result<()> {
        let mut seen = HashSet::new();
        for change in changes {
            if change.key.trim().is_empty() {
                return Err(Error::Validation("Setting key must not be empty".into()));
            }
            if !seen.insert(change.key.as_str()) {
                return Err(Error::Validation(format!("Setting '{}' appears more than once", change.key)));
            }
            if change.value.len() > self.max_value_bytes {
                return Err(Error::Validation(format!(
                    "Value for '{}' exceeds {} bytes",
                    change.key, self.max_value_bytes
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn change(key: &str, value: &str) -> SettingChange {
        SettingChange { key: key.into(), value: value.into() }
    }

    #[tokio::test]
    async fn test_schema_checks() {
        let validator = SchemaValidator::new(8);
        assert!(validator.check(&[change("title", "ok")]).await.is_ok());

        let dup = validator.check(&[change("title", "a"), change("title", "b")]).await.unwrap_err();
        assert_eq!(dup.kind(), ErrorKind::ValidationError);

        let long = validator.check(&[change("title", "way too long")]).await.unwrap_err();
        assert_eq!(long.kind(), ErrorKind::ValidationError);

        assert!(validator.check(&[change(" ", "x")]).await.is_err());
    }
}
