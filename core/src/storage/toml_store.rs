//! TOML file store

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{RaceStore, StorageError};
use crate::race::Race;

const FILE_PREFIX: &str = "race-";
const FILE_EXTENSION: &str = "toml";

#[derive(Debug, Clone)]
pub struct TomlRaceStore {
    dir: PathBuf,
}

impl TomlRaceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a race file, e.g. `race-2026-10-18.toml`
    pub fn race_path(&self, id: &str) -> Result<PathBuf, StorageError> {
        validate_id(id)?;
        Ok(self.dir.join(format!("{FILE_PREFIX}{id}.{FILE_EXTENSION}")))
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::CreateDir {
            path: self.dir.clone(),
            source,
        })
    }
}

/// Ids become file names; keep them to a safe character set
fn validate_id(id: &str) -> Result<(), StorageError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidId { id: id.to_string() })
    }
}

impl RaceStore for TomlRaceStore {
    fn load_race(&self, id: &str) -> Result<Race, StorageError> {
        let path = self.race_path(id)?;
        if !path.exists() {
            return Err(StorageError::NotFound { id: id.to_string() });
        }

        let text = fs::read_to_string(&path).map_err(|source| StorageError::Read {
            path: path.clone(),
            source,
        })?;
        let race: Race = toml::from_str(&text).map_err(|source| StorageError::Parse {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), runners = race.runners().len(), "Loaded race");
        Ok(race)
    }

    fn save_race(&self, race: &Race) -> Result<(), StorageError> {
        let path = self.race_path(&race.id)?;
        self.ensure_dir()?;

        let text = toml::to_string_pretty(race).map_err(|source| StorageError::Serialize {
            id: race.id.clone(),
            source,
        })?;

        // Write beside the target then rename so a crash never leaves half a file
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, text).map_err(|source| StorageError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), status = %race.status(), "Saved race");
        Ok(())
    }

    fn list_races(&self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?;
                stem.strip_prefix(FILE_PREFIX).map(String::from)
            })
            .collect();
        ids.sort();
        Ok(ids)
    }
}
