//! Interception policy: which methods are audited, and under which label.

use std::collections::HashMap;

use calltrail_core::AuditConfig;

/// Decides whether a method is audited.
///
/// Returns the operation label for audited methods and `None` otherwise.
/// Implementations must be free of side effects.
pub trait AuditPolicy: Send + Sync {
    fn select(&self, method: &str) -> Option<String>;
}

/// Registry of tagged methods.
///
/// A method opts in by being tagged; untagged methods are never audited.
#[derive(Debug, Clone, Default)]
pub struct TaggedMethods {
    labels: HashMap<String, String>,
}

impl TaggedMethods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a method with an empty label.
    pub fn tag(self, method: impl Into<String>) -> Self {
        self.tag_with(method, "")
    }

    /// Tag a method with an operation label. Blank method names are ignored.
    pub fn tag_with(mut self, method: impl Into<String>, label: impl Into<String>) -> Self {
        let method = method.into();
        if !method.trim().is_empty() {
            self.labels.insert(method, label.into());
        }
        self
    }

    /// Build the registry from the `audit.methods` table.
    pub fn from_config(config: &AuditConfig) -> Self {
        config
            .methods
            .iter()
            .fold(Self::new(), |tags, (method, label)| tags.tag_with(method, label))
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

impl AuditPolicy for TaggedMethods {
    fn select(&self, method: &str) -> Option<String> {
        self.labels.get(method).cloned()
    }
}
