//! # extprobe - SQLite with native extensions attached
//!
//! `extprobe` opens a SQLite database, loads native extension libraries into
//! the connection and asks each one for its version through the
//! `<name>_version()` SQL function the extension registers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use extprobe::{probe, DatabaseConfig, ProbeOptions, Result};
//!
//! # fn main() -> Result<()> {
//! let config = DatabaseConfig::new(std::path::PathBuf::from("/tmp/ext_test.db"))
//!     .with_library_dir("/opt/app/lib")
//!     .with_extensions(["vector", "js"])?;
//!
//! let report = probe(&config, ProbeOptions::default());
//! println!("{}", report.render_text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Working with the connection
//!
//! ```rust,no_run
//! use extprobe::{DatabaseConfig, ExtDatabase, ExtensionName, Result};
//!
//! # fn main() -> Result<()> {
//! let config = DatabaseConfig::in_memory()
//!     .with_library_dir("/opt/app/lib")
//!     .with_extensions(["vector"])?;
//!
//! let db = ExtDatabase::open(&config)?;
//! let version = db.extension_version(&ExtensionName::new("vector")?)?;
//! db.close()?;
//! # let _ = version;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod probe;

// Re-export core modules internally so crate:: paths in core still work
pub(crate) use self::core::{config, error, library, validation};

pub use crate::core::{
    config::{
        default_database_path, DatabaseConfig, DatabaseLocation, ExtensionSpec, OpenMode,
        DEFAULT_DATABASE_FILE, DEFAULT_EXTENSIONS,
    },
    database::ExtDatabase,
    error::{ExtError, Result},
    library::{default_library_dir, dylib_suffix, library_path, resolve_library},
    validation::ExtensionName,
};
pub use crate::probe::{probe, probe_database, ProbeEntry, ProbeOptions, ProbeOutcome, ProbeReport};
