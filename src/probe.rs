//! Version probing
//!
//! A probe opens the configured database, asks every loaded extension for its
//! version and closes the database again. Any failure along the way turns the
//! whole report into a single error message; lines gathered before the
//! failure are dropped.

use crate::config::{DatabaseConfig, DatabaseLocation, OpenMode};
use crate::core::database::ExtDatabase;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Probe settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Also report the SQLite engine version
    pub sqlite_version: bool,
}

/// One answered version query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeEntry {
    /// Extension name (e.g., "vector")
    pub extension: String,

    /// SQL function that was called (e.g., "vector_version")
    pub function: String,

    /// Reported version; `None` only in reports built by hand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ProbeEntry {
    /// `vector_version(): 0.9.30`
    pub fn line(&self) -> String {
        format!(
            "{}(): {}",
            self.function,
            self.version.as_deref().unwrap_or("")
        )
    }
}

/// Result of a probe run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Every query ran; entries for queries that returned no row are absent
    Versions { entries: Vec<ProbeEntry> },
    /// Setup or a query failed
    Failed { error: String },
}

/// Everything a probe produced, ready for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProbeReport {
    pub database: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sqlite_version: Option<String>,

    #[serde(flatten)]
    pub outcome: ProbeOutcome,
}

impl ProbeReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Versions { .. })
    }

    /// Entries of a successful probe; empty for a failed one
    pub fn entries(&self) -> &[ProbeEntry] {
        match &self.outcome {
            ProbeOutcome::Versions { entries } => entries,
            ProbeOutcome::Failed { .. } => &[],
        }
    }

    /// Human-readable report
    ///
    /// A successful probe renders one `<function>(): <version>` line per
    /// entry (preceded by the engine version when requested). A failed probe
    /// renders only `Error: <message>`.
    pub fn render_text(&self) -> String {
        match &self.outcome {
            ProbeOutcome::Failed { error } => format!("Error: {}", error),
            ProbeOutcome::Versions { entries } => {
                let mut lines = Vec::with_capacity(entries.len() + 1);
                if let Some(version) = &self.sqlite_version {
                    lines.push(format!("sqlite_version(): {}", version));
                }
                lines.extend(entries.iter().map(ProbeEntry::line));
                lines.join("\n")
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Query every configured extension on an open database
///
/// Extensions are queried in configuration order, stopping at the first
/// error. Version requirements are checked as each answer arrives.
pub fn probe_database(db: &ExtDatabase, config: &DatabaseConfig) -> Result<Vec<ProbeEntry>> {
    let mut entries = Vec::with_capacity(config.extensions.len());

    for spec in &config.extensions {
        match db.extension_version(&spec.name)? {
            Some(version) => {
                ExtDatabase::check_requirement(spec, &version)?;
                debug!("{} reports version {}", spec.name, version);
                entries.push(ProbeEntry {
                    extension: spec.name.to_string(),
                    function: spec.name.version_function(),
                    version: Some(version),
                });
            }
            None => debug!("{} returned no version row", spec.name.version_function()),
        }
    }

    Ok(entries)
}

/// Open, probe, close
pub fn probe(config: &DatabaseConfig, options: ProbeOptions) -> ProbeReport {
    let database = config.location.to_string();

    match run(config, options) {
        Ok((sqlite_version, entries)) => {
            info!("Probed {} extension(s) in {}", entries.len(), database);
            ProbeReport {
                database,
                sqlite_version,
                outcome: ProbeOutcome::Versions { entries },
            }
        }
        Err(e) => {
            warn!("Probe of {} failed: {}", database, e);
            ProbeReport {
                database,
                sqlite_version: None,
                outcome: ProbeOutcome::Failed {
                    error: e.to_string(),
                },
            }
        }
    }
}

fn run(
    config: &DatabaseConfig,
    options: ProbeOptions,
) -> Result<(Option<String>, Vec<ProbeEntry>)> {
    config.validate()?;
    ensure_parent_dir(config)?;

    let db = ExtDatabase::open(config)?;
    let sqlite_version = if options.sqlite_version {
        Some(db.sqlite_version()?)
    } else {
        None
    };
    let entries = probe_database(&db, config)?;
    db.close()?;

    Ok((sqlite_version, entries))
}

/// Create the database file's directory when the mode allows creating it
///
/// `file:` URIs are left to SQLite.
fn ensure_parent_dir(config: &DatabaseConfig) -> Result<()> {
    if config.mode != OpenMode::ReadWriteCreate || config.location.is_uri() {
        return Ok(());
    }

    if let DatabaseLocation::File(path) = &config.location {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                debug!("Creating database directory {:?}", parent);
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}
