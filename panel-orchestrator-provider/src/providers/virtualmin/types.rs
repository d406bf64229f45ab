//! Virtualmin `remote.cgi` JSON records

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// `{"command": "...", "status": "success" | "failure", "error": "...", ...}`
///
/// Plain programs answer with `output`; `multiline` list programs with a
/// `data` array of [`VirtualminRecord`].
#[derive(Debug, Default, Deserialize)]
pub struct VirtualminResponse {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub data: Value,
}

impl VirtualminResponse {
    pub fn succeeded(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

/// One `multiline` entry: every attribute is a list of strings, keyed by the
/// lowercased label (`"Server quota"` becomes `server_quota`).
#[derive(Debug, Default, Clone, Deserialize)]
pub struct VirtualminRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub values: HashMap<String, Vec<String>>,
}

impl VirtualminRecord {
    /// First non-blank value of `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)?
            .iter()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
    }

    pub fn value_or_default(&self, key: &str) -> String {
        self.value(key).unwrap_or_default().to_string()
    }
}
