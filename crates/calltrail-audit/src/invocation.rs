//! Description of a call about to be intercepted.

use serde::Serialize;
use serde_json::{Map, Value};

/// Qualified method name plus named arguments of one call.
#[derive(Debug, Clone)]
pub struct Invocation {
    method: String,
    params: Map<String, Value>,
}

impl Invocation {
    /// Describe a call to `method`, e.g. `"StudentService::query_by_sno"`.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Map::new(),
        }
    }

    /// Attach a named argument.
    ///
    /// Arguments that fail to serialize are recorded as a placeholder string
    /// so that auditing never fails the call.
    pub fn param<T: Serialize + ?Sized>(mut self, name: impl Into<String>, value: &T) -> Self {
        let value = serde_json::to_value(value)
            .unwrap_or_else(|e| Value::String(format!("<unserializable: {}>", e)));
        self.params.insert(name.into(), value);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Serialized argument list stored in the `params` column.
    pub fn serialized_params(&self) -> String {
        Value::Object(self.params.clone()).to_string()
    }
}
