//! Request and response types exchanged with the transport

use serde::{Deserialize, Serialize};

/// A form submission against the game server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Path relative to the server root, e.g. "shop.php"
    pub path: String,
    /// Form fields in submission order
    pub fields: Vec<(String, String)>,
}

impl Request {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            fields: Vec::new(),
        }
    }

    /// Add a form field (builder style)
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Look up a field value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Render as "path?a=1&b=2"
    pub fn to_url(&self) -> String {
        if self.fields.is_empty() {
            return self.path.clone();
        }
        let query: Vec<String> = self
            .fields
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        format!("{}?{}", self.path, query.join("&"))
    }
}

/// What came back from the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// URL after redirects
    pub final_url: String,
    pub text: String,
}

impl Response {
    pub fn new(final_url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            final_url: final_url.into(),
            text: text.into(),
        }
    }
}
