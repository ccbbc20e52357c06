//! SQLite connection with native extensions attached
//!
//! [`ExtDatabase::open`] opens the configured database and loads every
//! configured extension before handing the connection out. Extension loading
//! is switched on only for the duration of the loads.

use crate::config::{DatabaseConfig, DatabaseLocation, ExtensionSpec};
use crate::error::{ExtError, Result};
use crate::validation::ExtensionName;
use rusqlite::{Connection, LoadExtensionGuard, OptionalExtension};
use semver::Version;
use tracing::{debug, info, warn};

/// An open database with its extensions loaded
pub struct ExtDatabase {
    conn: Connection,
    location: DatabaseLocation,
    loaded: Vec<ExtensionName>,
}

impl ExtDatabase {
    /// Open the database described by `config` and load its extensions
    ///
    /// Extensions load in declaration order. The first one that fails aborts
    /// the open and the connection is dropped.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let flags = config.mode.flags();
        let conn = match &config.location {
            DatabaseLocation::Memory => Connection::open_in_memory_with_flags(flags)?,
            DatabaseLocation::File(path) => Connection::open_with_flags(path, flags)?,
        };
        info!("Opened database {} ({:?})", config.location, config.mode);

        let mut db = Self {
            conn,
            location: config.location.clone(),
            loaded: Vec::with_capacity(config.extensions.len()),
        };
        db.load_extensions(config)?;
        Ok(db)
    }

    /// Loading stays enabled only while `_guard` lives; afterwards neither the
    /// C API nor the SQL `load_extension()` function can load libraries.
    fn load_extensions(&mut self, config: &DatabaseConfig) -> Result<()> {
        let library_dir = config.library_dir();

        // SAFETY: extension loading is enabled only while the guard lives, and
        // the libraries loaded are the ones the caller configured.
        let _guard = unsafe { LoadExtensionGuard::new(&self.conn)? };

        for ext in &config.extensions {
            let path = ext.library(library_dir);
            debug!(
                "Loading extension '{}' from {:?} (entry point: {:?})",
                ext.name, path, ext.entry_point
            );

            // SAFETY: see above; running the library's init routine is the
            // purpose of this call.
            let loaded = unsafe { self.conn.load_extension(&path, ext.entry_point.as_deref()) };
            if let Err(source) = loaded {
                warn!("Failed to load extension '{}': {}", ext.name, source);
                return Err(ExtError::LoadFailed {
                    name: ext.name.to_string(),
                    path,
                    source,
                });
            }

            info!("Loaded extension '{}'", ext.name);
            self.loaded.push(ext.name.clone());
        }

        Ok(())
    }

    /// Extensions loaded into this connection, in load order
    pub fn loaded(&self) -> &[ExtensionName] {
        &self.loaded
    }

    pub fn location(&self) -> &DatabaseLocation {
        &self.location
    }

    /// Raw connection access
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Version of the SQLite engine behind the connection
    pub fn sqlite_version(&self) -> Result<String> {
        let version = self
            .conn
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Run `SELECT <name>_version()`
    ///
    /// Returns `None` when the query yields no row or a NULL value. Fails when
    /// the function is not registered on this connection.
    pub fn extension_version(&self, name: &ExtensionName) -> Result<Option<String>> {
        let sql = name.version_query();
        debug!("Querying {}", sql);

        let version: Option<Option<String>> = self
            .conn
            .query_row(&sql, [], |row| row.get(0))
            .optional()?;
        Ok(version.flatten())
    }

    /// Check a reported version against `ExtensionSpec::min_version`, if set
    pub fn check_requirement(spec: &ExtensionSpec, version: &str) -> Result<()> {
        let Some(required) = &spec.min_version else {
            return Ok(());
        };

        let parsed = parse_version(version)?;
        if !required.matches(&parsed) {
            return Err(ExtError::VersionMismatch {
                name: spec.name.to_string(),
                found: version.to_string(),
                required: required.to_string(),
            });
        }
        Ok(())
    }

    /// Close the connection, reporting any error SQLite returns
    pub fn close(self) -> Result<()> {
        debug!("Closing database {}", self.location);
        self.conn.close().map_err(|(_, e)| ExtError::Sqlite(e))
    }
}

impl std::fmt::Debug for ExtDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtDatabase")
            .field("location", &self.location)
            .field("loaded", &self.loaded)
            .finish_non_exhaustive()
    }
}

/// Parse an extension-reported version, tolerating a leading `v`
fn parse_version(version: &str) -> Result<Version> {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).map_err(|_| ExtError::InvalidVersion(version.to_string()))
}
