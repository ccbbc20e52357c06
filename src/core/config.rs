//! Database configuration
//!
//! A [`DatabaseConfig`] bundles everything needed to open a database with
//! native extensions attached: where the database lives, how it is opened,
//! and which extension libraries get loaded into the connection.
//!
//! Configurations are built in code or read from TOML:
//!
//! ```toml
//! database = "/var/cache/app/ext_test.db"
//! mode = "read-write-create"
//! library_dir = "/opt/app/lib"
//!
//! [[extensions]]
//! name = "vector"
//! min_version = ">=0.9"
//!
//! [[extensions]]
//! name = "js"
//! path = "/opt/js/libjs.so"
//! entry_point = "sqlite3_js_init"
//! ```

use crate::error::{ExtError, Result};
use crate::library::resolve_library;
use crate::validation::ExtensionName;
use rusqlite::OpenFlags;
use semver::VersionReq;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// File name used when no database path is configured
pub const DEFAULT_DATABASE_FILE: &str = "ext_test.db";

/// Extensions probed when nothing else is requested
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["vector", "js"];

/// `<temp_dir>/ext_test.db`
pub fn default_database_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DATABASE_FILE)
}

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DatabaseLocation {
    /// Private in-memory database (`:memory:`)
    Memory,
    /// Database file on disk
    File(PathBuf),
}

impl DatabaseLocation {
    pub const MEMORY: &'static str = ":memory:";

    /// `file:` URIs are handed to SQLite as-is (connections open with
    /// `SQLITE_OPEN_URI`), so they are not file system paths.
    pub fn is_uri(&self) -> bool {
        match self {
            DatabaseLocation::Memory => false,
            DatabaseLocation::File(path) => path.to_string_lossy().starts_with("file:"),
        }
    }
}

impl From<String> for DatabaseLocation {
    fn from(s: String) -> Self {
        if s == Self::MEMORY {
            DatabaseLocation::Memory
        } else {
            DatabaseLocation::File(PathBuf::from(s))
        }
    }
}

impl From<DatabaseLocation> for String {
    fn from(location: DatabaseLocation) -> Self {
        location.to_string()
    }
}

impl From<&Path> for DatabaseLocation {
    fn from(path: &Path) -> Self {
        DatabaseLocation::File(path.to_path_buf())
    }
}

impl From<PathBuf> for DatabaseLocation {
    fn from(path: PathBuf) -> Self {
        DatabaseLocation::File(path)
    }
}

impl fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseLocation::Memory => f.write_str(Self::MEMORY),
            DatabaseLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// How the database is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenMode {
    ReadOnly,
    ReadWrite,
    /// Read-write, creating the file if necessary
    #[default]
    ReadWriteCreate,
}

impl OpenMode {
    pub fn flags(self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        match self {
            OpenMode::ReadOnly => base | OpenFlags::SQLITE_OPEN_READ_ONLY,
            OpenMode::ReadWrite => base | OpenFlags::SQLITE_OPEN_READ_WRITE,
            OpenMode::ReadWriteCreate => {
                base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
            }
        }
    }
}

/// One native extension to load into the connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionSpec {
    /// Extension name, also the prefix of its `<name>_version()` function
    pub name: ExtensionName,

    /// Explicit library path; resolved from the library directory when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Entry point symbol; SQLite derives one from the file name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,

    /// Version requirement checked against `<name>_version()`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<VersionReq>,
}

impl ExtensionSpec {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            name: ExtensionName::new(name)?,
            path: None,
            entry_point: None,
            min_version: None,
        })
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }

    /// Require the reported version to satisfy `requirement` (e.g. `">=0.9"`)
    pub fn with_min_version(mut self, requirement: &str) -> Result<Self> {
        let req = VersionReq::parse(requirement)
            .map_err(|e| ExtError::InvalidVersionRequirement(format!("{}: {}", requirement, e)))?;
        self.min_version = Some(req);
        Ok(self)
    }

    /// Library file to load: the explicit path, or the one found in `library_dir`
    pub fn library(&self, library_dir: &Path) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => resolve_library(library_dir, &self.name),
        }
    }
}

/// Parameters for opening a database with extensions attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(rename = "database")]
    pub location: DatabaseLocation,

    #[serde(default)]
    pub mode: OpenMode,

    /// Directory searched for extensions without an explicit path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_dir: Option<PathBuf>,

    /// Extensions, loaded in declaration order
    #[serde(default)]
    pub extensions: Vec<ExtensionSpec>,
}

impl DatabaseConfig {
    /// Configuration for a database file, created if necessary
    pub fn new(location: impl Into<DatabaseLocation>) -> Self {
        Self {
            location: location.into(),
            mode: OpenMode::default(),
            library_dir: None,
            extensions: Vec::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(DatabaseLocation::Memory)
    }

    pub fn with_mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library_dir = Some(dir.into());
        self
    }

    pub fn with_extension(mut self, extension: ExtensionSpec) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Add one extension per name, each resolved from the library directory
    pub fn with_extensions<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.extensions.push(ExtensionSpec::new(name)?);
        }
        Ok(self)
    }

    /// Library directory, defaulting to the current directory
    pub fn library_dir(&self) -> &Path {
        self.library_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Look up an extension by name, ignoring ASCII case like SQL does
    pub fn extension(&self, name: &ExtensionName) -> Option<&ExtensionSpec> {
        self.extensions
            .iter()
            .find(|ext| ext.name.as_str().eq_ignore_ascii_case(name.as_str()))
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: DatabaseConfig =
            toml::from_str(s).map_err(|e| ExtError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ExtError::Config(e.to_string()))
    }

    /// Validate all fields
    ///
    /// Checks:
    /// - File databases have a non-empty path
    /// - Extension names are unique, ignoring ASCII case (`js` and `JS` both
    ///   call `js_version()`)
    /// - Explicit library paths and entry points are non-empty
    pub fn validate(&self) -> Result<()> {
        if let DatabaseLocation::File(path) = &self.location {
            if path.as_os_str().is_empty() {
                return Err(ExtError::Config("database path cannot be empty".to_string()));
            }
        }

        let mut seen = HashSet::new();
        for ext in &self.extensions {
            if !seen.insert(ext.name.as_str().to_ascii_lowercase()) {
                return Err(ExtError::Config(format!(
                    "extension '{}' is listed more than once",
                    ext.name
                )));
            }
            if matches!(&ext.path, Some(p) if p.as_os_str().is_empty()) {
                return Err(ExtError::Config(format!(
                    "extension '{}' has an empty path",
                    ext.name
                )));
            }
            if matches!(&ext.entry_point, Some(e) if e.is_empty()) {
                return Err(ExtError::Config(format!(
                    "extension '{}' has an empty entry point",
                    ext.name
                )));
            }
        }

        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(default_database_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_string() {
        assert_eq!(
            DatabaseLocation::from(":memory:".to_string()),
            DatabaseLocation::Memory
        );
        assert_eq!(
            DatabaseLocation::from("data/app.db".to_string()),
            DatabaseLocation::File(PathBuf::from("data/app.db"))
        );
        assert_eq!(DatabaseLocation::Memory.to_string(), ":memory:");
    }

    #[test]
    fn test_location_is_uri() {
        assert!(DatabaseLocation::from("file:sub/x.db".to_string()).is_uri());
        assert!(DatabaseLocation::from("file:x.db?mode=memory".to_string()).is_uri());
        assert!(!DatabaseLocation::from("sub/x.db".to_string()).is_uri());
        assert!(!DatabaseLocation::Memory.is_uri());
    }

    #[test]
    fn test_open_mode_flags() {
        let flags = OpenMode::ReadWriteCreate.flags();
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_READ_WRITE));
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_CREATE));

        let flags = OpenMode::ReadOnly.flags();
        assert!(flags.contains(OpenFlags::SQLITE_OPEN_READ_ONLY));
        assert!(!flags.contains(OpenFlags::SQLITE_OPEN_CREATE));
    }

    #[test]
    fn test_builder() {
        let config = DatabaseConfig::new(PathBuf::from("/tmp/x.db"))
            .with_library_dir("/opt/lib")
            .with_extensions(DEFAULT_EXTENSIONS)
            .unwrap();

        assert_eq!(config.mode, OpenMode::ReadWriteCreate);
        assert_eq!(config.extensions.len(), 2);
        assert_eq!(config.extensions[0].name.as_str(), "vector");
        assert_eq!(config.extensions[1].name.as_str(), "js");
        assert_eq!(config.library_dir(), Path::new("/opt/lib"));
    }

    #[test]
    fn test_builder_rejects_bad_name() {
        let result = DatabaseConfig::in_memory().with_extensions(["ok", "not-ok"]);
        assert!(matches!(result, Err(ExtError::InvalidExtensionName(_))));
    }

    #[test]
    fn test_explicit_path_wins() {
        let spec = ExtensionSpec::new("js").unwrap().with_path("/custom/js.so");
        assert_eq!(spec.library(Path::new("/opt/lib")), PathBuf::from("/custom/js.so"));
    }

    #[test]
    fn test_from_toml() {
        let config = DatabaseConfig::from_toml_str(
            r#"
            database = ":memory:"
            mode = "read-write"
            library_dir = "/opt/lib"

            [[extensions]]
            name = "vector"
            min_version = ">=0.9"

            [[extensions]]
            name = "js"
            path = "/opt/js/libjs.so"
            entry_point = "sqlite3_js_init"
            "#,
        )
        .unwrap();

        assert_eq!(config.location, DatabaseLocation::Memory);
        assert_eq!(config.mode, OpenMode::ReadWrite);
        assert_eq!(config.extensions.len(), 2);
        assert!(config.extensions[0].min_version.is_some());
        assert_eq!(
            config.extensions[1].entry_point.as_deref(),
            Some("sqlite3_js_init")
        );
    }

    #[test]
    fn test_toml_defaults() {
        let config = DatabaseConfig::from_toml_str(r#"database = "app.db""#).unwrap();
        assert_eq!(config.mode, OpenMode::ReadWriteCreate);
        assert!(config.extensions.is_empty());
        assert!(config.library_dir.is_none());
    }

    #[test]
    fn test_toml_rejects_invalid_name() {
        let result = DatabaseConfig::from_toml_str(
            r#"
            database = ":memory:"
            [[extensions]]
            name = "sqlite-vector"
            "#,
        );
        assert!(matches!(result, Err(ExtError::Config(_))));
    }

    #[test]
    fn test_toml_rejects_duplicates() {
        let result = DatabaseConfig::from_toml_str(
            r#"
            database = ":memory:"
            [[extensions]]
            name = "js"
            [[extensions]]
            name = "js"
            "#,
        );
        assert!(matches!(result, Err(ExtError::Config(_))));

        let result = DatabaseConfig::from_toml_str(
            r#"
            database = ":memory:"
            [[extensions]]
            name = "js"
            [[extensions]]
            name = "JS"
            "#,
        );
        assert!(matches!(result, Err(ExtError::Config(_))));
    }

    #[test]
    fn test_duplicates_differing_in_case_rejected() {
        let config = DatabaseConfig::in_memory()
            .with_extensions(["js", "JS"])
            .unwrap();
        assert!(matches!(config.validate(), Err(ExtError::Config(_))));

        let config = DatabaseConfig::in_memory()
            .with_extensions(["vector", "Js"])
            .unwrap();
        let lookup = ExtensionName::new("js").unwrap();
        assert_eq!(config.extension(&lookup).unwrap().name.as_str(), "Js");
    }

    #[test]
    fn test_empty_database_path_rejected() {
        let config = DatabaseConfig::new(PathBuf::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_keeps_extensions() {
        let config = DatabaseConfig::in_memory()
            .with_extension(
                ExtensionSpec::new("vector")
                    .unwrap()
                    .with_min_version("^1.2")
                    .unwrap(),
            );
        let text = config.to_toml_string().unwrap();
        assert_eq!(DatabaseConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_bad_version_requirement() {
        let result = ExtensionSpec::new("vector").unwrap().with_min_version("soon");
        assert!(matches!(result, Err(ExtError::InvalidVersionRequirement(_))));
    }
}
