//! # Product Identifier
//!
//! The book being purchased is named by the `isbn` query parameter of the
//! checkout page. It is read once and never re-read.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Query key carrying the product identifier
pub const ISBN_PARAM: &str = "isbn";

/// Product identifier taken verbatim from the page URL (no validation)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductIdentifier(String);

impl ProductIdentifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ProductIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Read the `isbn` parameter from a location search string.
///
/// Decodes like `URLSearchParams.get`: the leading `?` is optional, `+` is a
/// space, percent escapes are decoded and the first occurrence wins. A key
/// with an empty value yields `Some("")`.
pub fn extract_identifier(query: &str) -> Option<ProductIdentifier> {
    query_param(query, ISBN_PARAM).map(ProductIdentifier)
}

/// First value of `key` in a query string
pub fn query_param(query: &str, key: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}
