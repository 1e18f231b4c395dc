//! Manifest writing utilities.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ManifestResult;
use crate::models::{ProjectManifest, MANIFEST_FILE_NAME};

/// Writer for project manifests.
pub struct ManifestWriter;

impl ManifestWriter {
    /// Write the manifest into the given project root.
    pub fn write(root: impl AsRef<Path>, manifest: &ProjectManifest) -> ManifestResult<()> {
        let path = root.as_ref().join(MANIFEST_FILE_NAME);
        debug!("Writing project manifest to {:?}", path);

        let content = serde_yaml::to_string(manifest)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Service;
    use crate::reader::ManifestReader;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    #[test]
    fn test_write_then_read() {
        let temp = tempdir().unwrap();

        let mut manifest = ProjectManifest::new("shop");
        manifest
            .add_service(
                "backend",
                Service {
                    template: "fastapi-basic".to_string(),
                    path: "./backend".to_string(),
                    port: Some(8000),
                    resources: BTreeMap::new(),
                    environment: BTreeMap::new(),
                },
            )
            .unwrap();

        ManifestWriter::write(temp.path(), &manifest).unwrap();
        let loaded = ManifestReader::read(temp.path().join(MANIFEST_FILE_NAME)).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_write_is_stable() {
        let temp = tempdir().unwrap();
        let mut manifest = ProjectManifest::new("shop");
        for name in ["zeta", "alpha", "mid"] {
            manifest
                .add_service(
                    name,
                    Service {
                        template: "fastapi-basic".to_string(),
                        path: format!("./{}", name),
                        port: None,
                        resources: BTreeMap::new(),
                        environment: BTreeMap::new(),
                    },
                )
                .unwrap();
        }

        ManifestWriter::write(temp.path(), &manifest).unwrap();
        let first = fs::read_to_string(temp.path().join(MANIFEST_FILE_NAME)).unwrap();
        ManifestWriter::write(temp.path(), &manifest).unwrap();
        let second = fs::read_to_string(temp.path().join(MANIFEST_FILE_NAME)).unwrap();
        assert_eq!(first, second);
    }
}
