//! Deploy bundle loading
//!
//! A bundle is the template set the renderer consumes: `Bundle.yaml`
//! metadata, `values.yaml` defaults, and `templates/*.j2`. The builtin
//! Vista3D bundle is compiled in; `--bundle <dir>` swaps in an external one.

use serde::{Deserialize, Serialize};
use std::path::Path;
use walkdir::WalkDir;

use crate::builtin;
use crate::error::{CoreError, Result};
use crate::values::Values;

/// Supported Bundle.yaml apiVersion
const BUNDLE_API_VERSION: &str = "vistactl/v1";

/// Parsed Bundle.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    pub api_version: String,
    pub metadata: BundleMetadata,
}

/// Bundle metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A single template file
#[derive(Debug, Clone)]
pub struct TemplateFile {
    /// File name relative to `templates/`
    pub name: String,
    /// Template source text
    pub source: String,
}

/// A loaded bundle, ready for rendering
#[derive(Debug, Clone)]
pub struct Bundle {
    pub metadata: BundleMetadata,
    pub defaults: Values,
    pub templates: Vec<TemplateFile>,
}

impl Bundle {
    /// The compiled-in Vista3D bundle
    pub fn builtin() -> Self {
        let manifest: BundleManifest = serde_yaml::from_str(builtin::BUNDLE_YAML)
            .expect("builtin Bundle.yaml must parse");
        let defaults =
            Values::from_yaml(builtin::VALUES_YAML).expect("builtin values.yaml must parse");

        let templates = builtin::TEMPLATES
            .iter()
            .map(|(name, source)| TemplateFile {
                name: (*name).to_string(),
                source: (*source).to_string(),
            })
            .collect();

        Self {
            metadata: manifest.metadata,
            defaults,
            templates,
        }
    }

    /// Load a bundle from a directory
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(CoreError::BundleNotFound {
                path: dir.display().to_string(),
            });
        }

        let manifest_path = dir.join("Bundle.yaml");
        if !manifest_path.is_file() {
            return Err(CoreError::InvalidBundle {
                message: format!("missing Bundle.yaml in {}", dir.display()),
            });
        }

        let manifest: BundleManifest =
            serde_yaml::from_str(&std::fs::read_to_string(&manifest_path)?)?;
        if manifest.api_version != BUNDLE_API_VERSION {
            return Err(CoreError::InvalidBundle {
                message: format!(
                    "unsupported apiVersion '{}' (expected '{}')",
                    manifest.api_version, BUNDLE_API_VERSION
                ),
            });
        }

        let values_path = dir.join("values.yaml");
        let defaults = if values_path.is_file() {
            Values::from_file(&values_path)?
        } else {
            Values::new()
        };

        let templates = collect_templates(&dir.join("templates"))?;
        if templates.is_empty() {
            return Err(CoreError::InvalidBundle {
                message: format!("no templates found under {}/templates", dir.display()),
            });
        }

        Ok(Self {
            metadata: manifest.metadata,
            defaults,
            templates,
        })
    }
}

/// Collect `*.j2` templates under a directory, sorted by relative path so
/// render and apply order is deterministic.
fn collect_templates(templates_dir: &Path) -> Result<Vec<TemplateFile>> {
    let mut templates = Vec::new();

    if !templates_dir.is_dir() {
        return Ok(templates);
    }

    for entry in WalkDir::new(templates_dir).follow_links(false) {
        let entry = entry.map_err(|e| CoreError::InvalidBundle {
            message: format!("failed to walk templates directory: {}", e),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("j2") {
            continue;
        }

        let name = path
            .strip_prefix(templates_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        templates.push(TemplateFile {
            name,
            source: std::fs::read_to_string(path)?,
        });
    }

    templates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_bundle() {
        let bundle = Bundle::builtin();

        assert_eq!(bundle.metadata.name, "vista3d");
        assert_eq!(bundle.templates.len(), 5);
        assert_eq!(
            bundle.defaults.get_str("server.image.repository").unwrap(),
            "nvcr.io/nim/nvidia/vista3d"
        );
        // claims render before the workloads mounting them
        assert_eq!(bundle.templates[0].name, "pvcs.yaml.j2");
    }

    #[test]
    fn test_load_external_bundle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Bundle.yaml"),
            "apiVersion: vistactl/v1\nmetadata:\n  name: custom\n  version: 0.1.0\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("values.yaml"), "replicas: 2\n").unwrap();
        std::fs::create_dir(dir.path().join("templates")).unwrap();
        std::fs::write(
            dir.path().join("templates").join("cm.yaml.j2"),
            "kind: ConfigMap\n",
        )
        .unwrap();
        // non-template files are ignored
        std::fs::write(dir.path().join("templates").join("NOTES.txt"), "hi").unwrap();

        let bundle = Bundle::load(dir.path()).unwrap();
        assert_eq!(bundle.metadata.name, "custom");
        assert_eq!(bundle.templates.len(), 1);
        assert_eq!(bundle.defaults.get("replicas").unwrap(), 2);
    }

    #[test]
    fn test_load_rejects_wrong_api_version() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Bundle.yaml"),
            "apiVersion: helm/v3\nmetadata:\n  name: x\n  version: 0.1.0\n",
        )
        .unwrap();

        assert!(matches!(
            Bundle::load(dir.path()),
            Err(CoreError::InvalidBundle { .. })
        ));
    }

    #[test]
    fn test_load_missing_dir() {
        assert!(matches!(
            Bundle::load(Path::new("/nonexistent/bundle")),
            Err(CoreError::BundleNotFound { .. })
        ));
    }
}
