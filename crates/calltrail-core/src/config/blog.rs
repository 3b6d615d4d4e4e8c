//! Externalized blog properties.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named string properties bound from the `blog` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogProperties {
    /// Blog name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Blog title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Any further properties, served verbatim.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Default for BlogProperties {
    fn default() -> Self {
        Self {
            name: default_name(),
            title: default_title(),
            extra: BTreeMap::new(),
        }
    }
}

impl BlogProperties {
    /// Name and title joined with a full-width comma.
    pub fn greeting(&self) -> String {
        format!("{}，{}", self.name, self.title)
    }

    /// Look up a property by key, including `name` and `title`.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "name" => Some(&self.name),
            "title" => Some(&self.title),
            other => self.extra.get(other).map(String::as_str),
        }
    }
}

fn default_name() -> String {
    "calltrail".to_string()
}

fn default_title() -> String {
    "Call audit demo".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_joins_name_and_title() {
        let props = BlogProperties {
            name: "liuyu".to_string(),
            title: "Spring Boot".to_string(),
            extra: BTreeMap::new(),
        };
        assert_eq!(props.greeting(), "liuyu，Spring Boot");
    }

    #[test]
    fn extra_properties_are_flattened() {
        let props: BlogProperties =
            serde_yaml::from_str("name: a\ntitle: b\nwholeTitle: a-b\n").unwrap();
        assert_eq!(props.get("wholeTitle"), Some("a-b"));
        assert_eq!(props.get("name"), Some("a"));
        assert_eq!(props.get("missing"), None);
    }
}
