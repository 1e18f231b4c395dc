//! Manifest reading utilities.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ManifestError, ManifestResult};
use crate::models::{ProjectManifest, MANIFEST_FILE_NAME};

/// Reader for project manifests.
pub struct ManifestReader;

impl ManifestReader {
    /// Read a manifest from an explicit file path.
    pub fn read(path: impl AsRef<Path>) -> ManifestResult<ProjectManifest> {
        let path = path.as_ref();
        debug!("Reading project manifest from {:?}", path);

        let content = fs::read_to_string(path)?;
        let manifest: ProjectManifest = serde_yaml::from_str(&content)?;
        Ok(manifest)
    }

    /// Locate the project root by searching for `atelier.yaml` upwards from
    /// the given directory.
    pub fn find_project_root(start: impl AsRef<Path>) -> ManifestResult<PathBuf> {
        let start = start.as_ref();
        let mut current = Some(start);
        while let Some(dir) = current {
            if dir.join(MANIFEST_FILE_NAME).is_file() {
                return Ok(dir.to_path_buf());
            }
            current = dir.parent();
        }
        Err(ManifestError::NotFound(start.to_path_buf()))
    }

    /// Read the manifest governing the given directory.
    pub fn read_from(start: impl AsRef<Path>) -> ManifestResult<(PathBuf, ProjectManifest)> {
        let root = Self::find_project_root(start)?;
        let manifest = Self::read(root.join(MANIFEST_FILE_NAME))?;
        Ok((root, manifest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_find_project_root_walks_upwards() {
        let temp = tempdir().unwrap();
        let nested = temp.path().join("services/backend/src");
        fs::create_dir_all(&nested).unwrap();

        let manifest = ProjectManifest::new("shop");
        let content = serde_yaml::to_string(&manifest).unwrap();
        fs::write(temp.path().join(MANIFEST_FILE_NAME), content).unwrap();

        let root = ManifestReader::find_project_root(&nested).unwrap();
        assert_eq!(root, temp.path());

        let (found_root, loaded) = ManifestReader::read_from(&nested).unwrap();
        assert_eq!(found_root, temp.path());
        assert_eq!(loaded.metadata.name, "shop");
    }

    #[test]
    fn test_find_project_root_missing() {
        let temp = tempdir().unwrap();
        let err = ManifestReader::find_project_root(temp.path()).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
    }
}
