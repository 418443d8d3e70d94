// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Guide persistence.
//!
//! The whole guide lives in a single JSON file under the platform data
//! directory. Saves go through a temporary file in the same directory
//! followed by a rename, so a crash mid-write never leaves a truncated
//! guide behind.

use crate::models::guide::{Guide, SCHEMA_VERSION};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "stepscribe";
const GUIDE_FILE: &str = "guide.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed guide file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no platform data directory available")]
    NoDataDir,

    #[error("unsupported guide schema version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Location of the saved guide.
pub fn data_file() -> Result<PathBuf, StorageError> {
    let dir = dirs::data_dir().ok_or(StorageError::NoDataDir)?;
    Ok(dir.join(APP_DIR).join(GUIDE_FILE))
}

/// Load the saved guide, if one exists.
pub fn load() -> Result<Option<Guide>, StorageError> {
    load_from(&data_file()?)
}

pub fn load_from(path: &Path) -> Result<Option<Guide>, StorageError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    // Check the version before deserializing the full model, so a file
    // from a newer build fails with a clear error instead of a parse one.
    #[derive(Deserialize)]
    struct VersionProbe {
        #[serde(default)]
        schema_version: u32,
    }
    let probe: VersionProbe = serde_json::from_str(&json)?;
    if probe.schema_version > SCHEMA_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: probe.schema_version,
            supported: SCHEMA_VERSION,
        });
    }

    Ok(Some(serde_json::from_str(&json)?))
}

/// Save the guide to the default location.
pub fn save(guide: &Guide) -> Result<(), StorageError> {
    save_to(guide, &data_file()?)
}

pub fn save_to(guide: &Guide, path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(guide)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Delete the saved guide. Missing file is not an error.
pub fn reset() -> Result<(), StorageError> {
    let path = data_file()?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Shape;
    use crate::models::step::test_image;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_from(&dir.path().join("guide.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("guide.json");

        let mut guide = Guide::new("My Guide", "Author");
        guide.add_step();
        let step = &mut guide.steps[0];
        step.description = "Open the menu.".to_string();
        step.set_image(test_image(8, 8));
        step.add_annotation(Shape::Highlight {
            cx: 50.0,
            cy: 50.0,
            w: 20.0,
            h: 10.0,
        });

        save_to(&guide, &path).unwrap();
        let loaded = load_from(&path).unwrap().unwrap();
        assert_eq!(loaded, guide);
        assert_eq!(loaded.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn save_replaces_previous_contents_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.json");

        save_to(&Guide::new("First", "A"), &path).unwrap();
        save_to(&Guide::new("Second", "A"), &path).unwrap();

        let loaded = load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.title, "Second");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn newer_schema_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.json");

        let mut guide = Guide::new("Future", "A");
        guide.schema_version = SCHEMA_VERSION + 5;
        save_to(&guide, &path).unwrap();

        match load_from(&path) {
            Err(StorageError::UnsupportedVersion { found, supported }) => {
                assert_eq!(found, SCHEMA_VERSION + 5);
                assert_eq!(supported, SCHEMA_VERSION);
            }
            other => panic!("expected version error, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(load_from(&path), Err(StorageError::Json(_))));
    }
}
