//! User-identity lookup for provisioning labels

use std::collections::{BTreeMap, HashMap};

/// Resolves the display label (typically an email) shown for a principal
/// in authenticator apps
pub trait IdentityLookup {
    fn display_label(&self, principal_id: &str) -> Option<String>;
}

/// Fixed principal → label directory, usually the `[accounts]` table of the
/// configuration file
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    labels: HashMap<String, String>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a label
    pub fn with_label(mut self, principal_id: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(principal_id.into(), label.into());
        self
    }
}

impl From<&BTreeMap<String, String>> for StaticDirectory {
    fn from(accounts: &BTreeMap<String, String>) -> Self {
        Self {
            labels: accounts
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl IdentityLookup for StaticDirectory {
    fn display_label(&self, principal_id: &str) -> Option<String> {
        self.labels
            .get(principal_id)
            .filter(|label| !label.trim().is_empty())
            .cloned()
    }
}

impl<I: IdentityLookup + ?Sized> IdentityLookup for &I {
    fn display_label(&self, principal_id: &str) -> Option<String> {
        (**self).display_label(principal_id)
    }
}
