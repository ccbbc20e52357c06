//! Validation for extension names
//!
//! An extension name doubles as the prefix of the SQL function the extension
//! registers (`vector` -> `vector_version()`), so it is spliced into SQL text.
//! Only plain identifiers are accepted.

use crate::error::{ExtError, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Validated extension name
///
/// # Rules
/// - ASCII letters, digits and underscores only
/// - Must not start with a digit
/// - Length: 1-64 characters
///
/// # Examples
///
/// Valid names:
/// - "vector"
/// - "js"
/// - "cloudsync"
/// - "my_ext2"
///
/// Invalid names:
/// - "sqlite-vector" (hyphen)
/// - "2fast" (leading digit)
/// - "vector()" (punctuation)
/// - "" (empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionName(String);

impl ExtensionName {
    /// Pattern for valid extension names
    const PATTERN: &'static str = r"^[A-Za-z_][A-Za-z0-9_]*$";

    /// Maximum length
    const MAX_LENGTH: usize = 64;

    /// Create a new validated name
    ///
    /// # Errors
    ///
    /// Returns `InvalidExtensionName` if the name doesn't meet validation rules.
    ///
    /// # Examples
    ///
    /// ```
    /// use extprobe::ExtensionName;
    ///
    /// let name = ExtensionName::new("vector").unwrap();
    /// assert_eq!(name.version_function(), "vector_version");
    ///
    /// assert!(ExtensionName::new("sqlite-vector").is_err());
    /// assert!(ExtensionName::new("js; DROP TABLE t").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate_name(&name)?;
        Ok(ExtensionName(name))
    }

    fn pattern() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(Self::PATTERN).expect("extension name pattern is valid"))
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(ExtError::InvalidExtensionName(
                "name cannot be empty".to_string(),
            ));
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(ExtError::InvalidExtensionName(format!(
                "name too long (max {} characters)",
                Self::MAX_LENGTH
            )));
        }

        if !Self::pattern().is_match(name) {
            return Err(ExtError::InvalidExtensionName(format!("'{}'", name)));
        }

        Ok(())
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to String
    pub fn into_string(self) -> String {
        self.0
    }

    /// Name of the SQL function reporting the extension version
    pub fn version_function(&self) -> String {
        format!("{}_version", self.0)
    }

    /// Query returning the extension version as a single text column
    pub fn version_query(&self) -> String {
        format!("SELECT {}()", self.version_function())
    }
}

impl AsRef<str> for ExtensionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExtensionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ExtensionName {
    type Err = ExtError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl Serialize for ExtensionName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ExtensionName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ExtensionName::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(ExtensionName::new("vector").is_ok());
        assert!(ExtensionName::new("js").is_ok());
        assert!(ExtensionName::new("_private").is_ok());
        assert!(ExtensionName::new("Vec2").is_ok());
        assert!(ExtensionName::new("a").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(ExtensionName::new("").is_err());
        assert!(ExtensionName::new("sqlite-vector").is_err());
        assert!(ExtensionName::new("2fast").is_err());
        assert!(ExtensionName::new("vector()").is_err());
        assert!(ExtensionName::new("js version").is_err());
        assert!(ExtensionName::new("x".repeat(65)).is_err());
    }

    #[test]
    fn test_max_length_accepted() {
        assert!(ExtensionName::new("x".repeat(64)).is_ok());
    }

    #[test]
    fn test_version_query() {
        let name = ExtensionName::new("vector").unwrap();
        assert_eq!(name.version_function(), "vector_version");
        assert_eq!(name.version_query(), "SELECT vector_version()");
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let ok: ExtensionName = serde_json::from_str("\"js\"").unwrap();
        assert_eq!(ok.as_str(), "js");

        let err = serde_json::from_str::<ExtensionName>("\"js-ext\"");
        assert!(err.is_err());
    }
}
