//! Caller context passed explicitly into the interceptor.

use serde::{Deserialize, Serialize};

/// Address recorded when the caller's address cannot be determined.
pub const UNKNOWN_ADDRESS: &str = "unknown";

/// Identity and network address of whoever triggered an intercepted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    username: Option<String>,
    ip: String,
}

impl CallerContext {
    /// A caller with a resolved identity.
    pub fn new(username: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ip: normalize_ip(ip.into()),
        }
    }

    /// A caller without identity.
    pub fn anonymous(ip: impl Into<String>) -> Self {
        Self {
            username: None,
            ip: normalize_ip(ip.into()),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }
}

impl Default for CallerContext {
    fn default() -> Self {
        Self::anonymous(UNKNOWN_ADDRESS)
    }
}

fn normalize_ip(ip: String) -> String {
    let trimmed = ip.trim();
    if trimmed.is_empty() {
        UNKNOWN_ADDRESS.to_string()
    } else {
        trimmed.to_string()
    }
}
