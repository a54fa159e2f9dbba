//! Token header: the JSON object carried in the first segment.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Protected token header.
///
/// Known fields are typed; everything else a caller supplies rides along in
/// `extra` and is passed through unmodified. The encode paths overwrite
/// `alg` (and `enc` for encrypted tokens) with the algorithm's own
/// identifier, so callers cannot smuggle a different identifier in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Signing or key-management algorithm identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Content-encryption algorithm identifier (encrypted tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enc: Option<String>,

    /// Key identifier hint for the resolution callback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Content type of the payload (`"JWT"` marks a nested token)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,

    /// Caller-defined fields, passed through unmodified
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Header {
    /// Create an empty header.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key identifier.
    #[must_use]
    pub fn with_kid(mut self, kid: impl Into<String>) -> Self {
        self.kid = Some(kid.into());
        self
    }

    /// Set the payload content type.
    #[must_use]
    pub fn with_cty(mut self, cty: impl Into<String>) -> Self {
        self.cty = Some(cty.into());
        self
    }

    /// Add a caller-defined field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// True when the payload should be treated as JSON claims: the content
    /// type is either unspecified or explicitly JSON.
    #[must_use]
    pub(crate) fn payload_is_json(&self) -> bool {
        match self.cty.as_deref() {
            None | Some("JSON") => true,
            Some(_) => false,
        }
    }
}
