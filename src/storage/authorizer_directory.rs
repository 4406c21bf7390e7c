//! A JSON-file backed lookup of application code to authorizer.
//!
//! Codes are case-insensitive; they are upper-cased on the way in. Every
//! mutation rewrites the whole backing file.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{AuthorizerRecord, normalize_code},
    storage::json_file::{self, LoadError, SaveError},
};

const FORMAT_VERSION: &str = "1.0";

#[derive(Serialize)]
struct DirectoryFileRef<'a> {
    metadata: Metadata,
    #[serde(rename = "autorizadores")]
    authorizers: &'a BTreeMap<String, AuthorizerRecord>,
}

#[derive(Deserialize)]
struct DirectoryFile {
    #[serde(rename = "autorizadores", default)]
    authorizers: BTreeMap<String, AuthorizerRecord>,
}

#[derive(Serialize)]
struct Metadata {
    version: String,
    #[serde(rename = "ultima_actualizacion")]
    last_updated: NaiveDateTime,
    #[serde(rename = "total_aplicaciones")]
    total: usize,
}

/// How a missing backing file is initialised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seed {
    /// Populate with [`default_authorizers`].
    #[default]
    Defaults,
    /// Start empty.
    Empty,
}

/// A summary of the directory, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryInfo {
    /// Where the directory is stored.
    pub path: PathBuf,
    /// Number of application codes.
    pub total: usize,
    /// Every code, sorted.
    pub codes: Vec<String>,
    /// Entries flagged active.
    pub active: usize,
}

/// A JSON-file backed lookup of application code to authorizer.
#[derive(Debug)]
pub struct AuthorizerDirectory {
    path: PathBuf,
    authorizers: BTreeMap<String, AuthorizerRecord>,
}

impl AuthorizerDirectory {
    /// Opens the directory at `path`, seeding it with the default entries if
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a missing file cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SaveError> {
        Self::open_with(path, Seed::Defaults)
    }

    /// Opens the directory at `path`, initialising a missing file as `seed`
    /// says.
    ///
    /// A file that does not parse is moved to
    /// `<stem>.corrupt-<timestamp>.json` and replaced by an empty directory.
    /// Seeding only applies to files that never existed. If the move fails
    /// the directory is empty in memory and the file is left alone until the
    /// next mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if a missing file, or the empty replacement for a
    /// moved one, cannot be created.
    pub fn open_with(path: impl Into<PathBuf>, seed: Seed) -> Result<Self, SaveError> {
        let path = path.into();
        match json_file::read::<DirectoryFile>(&path) {
            Ok(Some(file)) => {
                let authorizers = file
                    .authorizers
                    .into_iter()
                    .map(|(code, record)| (normalize_code(&code), record))
                    .collect::<BTreeMap<_, _>>();
                tracing::debug!(
                    "Loaded {} authorizers from {}",
                    authorizers.len(),
                    path.display()
                );
                Ok(Self { path, authorizers })
            }
            Ok(None) => {
                let authorizers = match seed {
                    Seed::Defaults => default_authorizers()
                        .into_iter()
                        .map(|record| (record.code.clone(), record))
                        .collect(),
                    Seed::Empty => BTreeMap::new(),
                };
                tracing::info!(
                    "No authorizer directory at {}, creating one with {} entries",
                    path.display(),
                    authorizers.len()
                );
                let directory = Self { path, authorizers };
                directory.save()?;
                Ok(directory)
            }
            Err(e) => {
                tracing::warn!("{e}; starting with no authorizers");
                let directory = Self {
                    path,
                    authorizers: BTreeMap::new(),
                };
                if matches!(e, LoadError::Parse { .. }) {
                    match json_file::quarantine(&directory.path) {
                        Ok(moved) => {
                            tracing::warn!("Unreadable file moved to {}", moved.display());
                            directory.save()?;
                        }
                        Err(e) => tracing::warn!("Could not move the unreadable file aside: {e}"),
                    }
                }
                Ok(directory)
            }
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrites the backing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<(), SaveError> {
        let file = DirectoryFileRef {
            metadata: Metadata {
                version: FORMAT_VERSION.to_string(),
                last_updated: Local::now().naive_local(),
                total: self.authorizers.len(),
            },
            authorizers: &self.authorizers,
        };
        json_file::write(&self.path, &file).inspect_err(|e| tracing::error!("{e}"))
    }

    /// Looks up the authorizer for `code`, ignoring case.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&AuthorizerRecord> {
        self.authorizers.get(&normalize_code(code))
    }

    /// Looks up several codes at once.
    ///
    /// Codes without an entry are skipped, so the result may be shorter than
    /// the input. Compare lengths to detect misses.
    pub fn get_many<I, S>(&self, codes: I) -> Vec<&AuthorizerRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        codes
            .into_iter()
            .filter_map(|code| {
                let code = code.as_ref();
                let found = self.get(code);
                if found.is_none() {
                    tracing::warn!("No authorizer found for code {code}");
                }
                found
            })
            .collect()
    }

    /// Inserts or replaces the entry for `code` and persists.
    ///
    /// The record's code is overwritten with the normalised key and its
    /// update time is refreshed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written. The entry is kept in
    /// memory regardless.
    pub fn add(&mut self, code: &str, mut record: AuthorizerRecord) -> Result<(), SaveError> {
        let code = normalize_code(code);
        record.code.clone_from(&code);
        record.touch();
        self.authorizers.insert(code.clone(), record);
        self.save()?;
        tracing::info!("Added authorizer for {code}");
        Ok(())
    }

    /// Replaces the entry for an existing `code` and persists.
    ///
    /// Returns `Ok(false)`, without creating anything, if `code` has no entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn update(&mut self, code: &str, mut record: AuthorizerRecord) -> Result<bool, SaveError> {
        let code = normalize_code(code);
        let Some(existing) = self.authorizers.get_mut(&code) else {
            tracing::warn!("Cannot update {code}: no such authorizer");
            return Ok(false);
        };
        record.code.clone_from(&code);
        record.touch();
        *existing = record;
        self.save()?;
        tracing::info!("Updated authorizer for {code}");
        Ok(true)
    }

    /// Removes the entry for `code` and persists.
    ///
    /// Returns `Ok(false)` if `code` has no entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn remove(&mut self, code: &str) -> Result<bool, SaveError> {
        let code = normalize_code(code);
        if self.authorizers.remove(&code).is_none() {
            return Ok(false);
        }
        self.save()?;
        tracing::info!("Removed authorizer for {code}");
        Ok(true)
    }

    /// Every entry, ordered by code.
    pub fn all(&self) -> impl Iterator<Item = &AuthorizerRecord> {
        self.authorizers.values()
    }

    /// Every code, sorted.
    #[must_use]
    pub fn codes(&self) -> Vec<String> {
        self.authorizers.keys().cloned().collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.authorizers.len()
    }

    /// Whether the directory has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.authorizers.is_empty()
    }

    /// Summarises the directory.
    #[must_use]
    pub fn info(&self) -> DirectoryInfo {
        DirectoryInfo {
            path: self.path.clone(),
            total: self.authorizers.len(),
            codes: self.codes(),
            active: self.authorizers.values().filter(|a| a.active).count(),
        }
    }
}

/// The illustrative entries a new directory is seeded with.
#[must_use]
pub fn default_authorizers() -> Vec<AuthorizerRecord> {
    [
        ("APF2", "Daniela Fernanda Ortiz", "daniela.ortiz@empresa.com", "+57 300 123 4567", "Tecnología"),
        ("QASD", "Sebastián Eduardo Martín", "sebastian.martin@corporacion.co", "+57 301 234 5678", "Calidad"),
        ("SSSS", "Ricardo Antonio Jiménez", "ricardo.jimenez@global.org", "+57 302 345 6789", "Seguridad"),
        ("CASD", "Isabella Camila Rojas", "isabella.rojas@tech.net", "+57 303 456 7890", "Desarrollo"),
        ("FCVE", "Paola Carolina Díaz", "paola.diaz@solutions.com", "+57 304 567 8901", "Finanzas"),
        ("ATLA", "Laura Cristina Torres", "laura.torres@innovate.co", "+57 305 678 9012", "Operaciones"),
        ("FIEC", "Fernando Gabriel Ruiz", "fernando.ruiz@business.org", "+57 306 789 0123", "Estrategia"),
    ]
    .into_iter()
    .map(|(code, name, email, phone, area)| AuthorizerRecord {
        phone: phone.to_string(),
        area: area.to_string(),
        ..AuthorizerRecord::new(code, name, email)
    })
    .collect()
}
