//! Values handling with deep merge support
//!
//! Deployment configuration is resolved from ordered override layers:
//! bundle defaults, then user values files in given order, then `--set`
//! overrides, then `--set-string` overrides. Later layers win on conflicts.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;

use crate::error::{CoreError, Result};

/// Values container with deep merge capability
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub JsonValue);

impl Values {
    /// Create empty values
    pub fn new() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Load values from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse values from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: JsonValue = serde_yaml::from_str(yaml)?;
        Ok(Self(value))
    }

    /// Deep merge another Values into this one
    ///
    /// Rules:
    /// - Scalars: overlay replaces base
    /// - Objects: recursive merge
    /// - Arrays: overlay replaces base (not appended)
    pub fn merge(&mut self, overlay: &Values) {
        deep_merge(&mut self.0, &overlay.0);
    }

    /// Set a value by dotted path (e.g., "server.image.tag")
    pub fn set(&mut self, path: &str, value: JsonValue) -> Result<()> {
        let parts: Vec<&str> = path.split('.').collect();
        set_nested(&mut self.0, &parts, value)
    }

    /// Get a value by dotted path
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        let parts: Vec<&str> = path.split('.').collect();
        get_nested(&self.0, &parts)
    }

    /// Get a string value by dotted path
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(JsonValue::as_str)
    }

    /// Get the inner JSON value
    pub fn inner(&self) -> &JsonValue {
        &self.0
    }

    /// Convert to JSON value
    pub fn into_inner(self) -> JsonValue {
        self.0
    }

    /// Check if values are empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            JsonValue::Object(map) => map.is_empty(),
            JsonValue::Null => true,
            _ => false,
        }
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.0)?)
    }

    /// Resolve the full override stack into one Values
    ///
    /// Precedence, later wins: `defaults` < `files` (in given order) <
    /// `set` (typed) < `set_string` (string-typed).
    pub fn resolve_layers(
        defaults: Values,
        files: &[std::path::PathBuf],
        set: &[String],
        set_string: &[String],
    ) -> Result<Values> {
        let mut merged = defaults;
        for path in files {
            let overlay = Values::from_file(path)?;
            merged.merge(&overlay);
        }
        if !set.is_empty() {
            merged.merge(&parse_set_values(set)?);
        }
        if !set_string.is_empty() {
            merged.merge(&parse_set_string_values(set_string)?);
        }
        Ok(merged)
    }
}

/// Merged values written to disk for inspection or hand-off
///
/// Ephemeral files are removed when dropped; a caller-supplied path is
/// written plainly and left behind.
#[derive(Debug)]
pub enum MergedValuesFile {
    Ephemeral(tempfile::NamedTempFile),
    Persistent(std::path::PathBuf),
}

impl MergedValuesFile {
    pub fn path(&self) -> &Path {
        match self {
            MergedValuesFile::Ephemeral(f) => f.path(),
            MergedValuesFile::Persistent(p) => p,
        }
    }
}

impl Values {
    /// Write the merged values to `explicit` if given (retained), otherwise
    /// to a temporary file cleaned up on drop.
    pub fn write_to_disk(&self, explicit: Option<&Path>) -> Result<MergedValuesFile> {
        let yaml = self.to_yaml()?;
        match explicit {
            Some(path) => {
                std::fs::write(path, yaml)?;
                Ok(MergedValuesFile::Persistent(path.to_path_buf()))
            }
            None => {
                use std::io::Write;
                let mut file = tempfile::NamedTempFile::new()?;
                file.write_all(yaml.as_bytes())?;
                file.flush()?;
                Ok(MergedValuesFile::Ephemeral(file))
            }
        }
    }
}

/// Deep merge two JSON values
fn deep_merge(base: &mut JsonValue, overlay: &JsonValue) {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Set a nested value by path
fn set_nested(value: &mut JsonValue, path: &[&str], new_value: JsonValue) -> Result<()> {
    if path.is_empty() {
        *value = new_value;
        return Ok(());
    }

    let key = path[0];
    let remaining = &path[1..];

    // Intermediate scalars are replaced by objects so the path can continue
    if !value.is_object() {
        *value = JsonValue::Object(serde_json::Map::new());
    }

    let map = value
        .as_object_mut()
        .expect("value should be an object after initialization");

    if remaining.is_empty() {
        map.insert(key.to_string(), new_value);
    } else {
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
        set_nested(entry, remaining, new_value)?;
    }

    Ok(())
}

/// Get a nested value by path
fn get_nested<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    if path.is_empty() {
        return Some(value);
    }

    match value {
        JsonValue::Object(map) => map.get(path[0]).and_then(|v| get_nested(v, &path[1..])),
        _ => None,
    }
}

/// Parse --set arguments (key=value format, values typed)
pub fn parse_set_values(set_args: &[String]) -> Result<Values> {
    let mut values = Values::new();

    for arg in set_args {
        let (key, val) = arg.split_once('=').ok_or_else(|| CoreError::ValuesMerge {
            message: format!("Invalid --set format: '{}'. Expected key=value", arg),
        })?;

        // Try to parse as JSON, fallback to string
        let json_value = if val == "true" {
            JsonValue::Bool(true)
        } else if val == "false" {
            JsonValue::Bool(false)
        } else if val == "null" {
            JsonValue::Null
        } else if let Ok(num) = val.parse::<i64>() {
            JsonValue::Number(num.into())
        } else if let Ok(num) = val.parse::<f64>() {
            JsonValue::Number(serde_json::Number::from_f64(num).unwrap_or(0.into()))
        } else if val.starts_with('[') || val.starts_with('{') {
            serde_json::from_str(val).unwrap_or(JsonValue::String(val.to_string()))
        } else {
            JsonValue::String(val.to_string())
        };

        values.set(key, json_value)?;
    }

    Ok(values)
}

/// Parse --set-string arguments (key=value format, values always strings)
///
/// Keeps image tags like `1.0` or `latest-8` from being coerced into numbers.
pub fn parse_set_string_values(set_args: &[String]) -> Result<Values> {
    let mut values = Values::new();

    for arg in set_args {
        let (key, val) = arg.split_once('=').ok_or_else(|| CoreError::ValuesMerge {
            message: format!("Invalid --set-string format: '{}'. Expected key=value", arg),
        })?;

        values.set(key, JsonValue::String(val.to_string()))?;
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_merge() {
        let mut base = Values::from_yaml(
            r#"
server:
  image:
    repository: nvcr.io/nim/nvidia/vista3d
    tag: "1.0.0"
  replicas: 1
"#,
        )
        .unwrap();

        let overlay = Values::from_yaml(
            r#"
server:
  image:
    tag: "1.1.0"
    pullPolicy: Always
  replicas: 2
"#,
        )
        .unwrap();

        base.merge(&overlay);

        assert_eq!(
            base.get("server.image.repository").unwrap(),
            "nvcr.io/nim/nvidia/vista3d"
        );
        assert_eq!(base.get("server.image.tag").unwrap(), "1.1.0");
        assert_eq!(base.get("server.image.pullPolicy").unwrap(), "Always");
        assert_eq!(base.get("server.replicas").unwrap(), 2);
    }

    #[test]
    fn test_set_nested() {
        let mut values = Values::new();
        values
            .set("server.image.tag", JsonValue::String("v1".into()))
            .unwrap();
        values.set("frontend.replicas", JsonValue::Number(3.into())).unwrap();

        assert_eq!(values.get("server.image.tag").unwrap(), "v1");
        assert_eq!(values.get("frontend.replicas").unwrap(), 3);
    }

    #[test]
    fn test_parse_set_values() {
        let args = vec![
            "server.image.tag=v2".to_string(),
            "frontend.replicas=5".to_string(),
            "ingress.enabled=true".to_string(),
        ];

        let values = parse_set_values(&args).unwrap();

        assert_eq!(values.get("server.image.tag").unwrap(), "v2");
        assert_eq!(values.get("frontend.replicas").unwrap(), 5);
        assert_eq!(values.get("ingress.enabled").unwrap(), true);
    }

    #[test]
    fn test_parse_set_string_keeps_strings() {
        let args = vec!["server.image.tag=1.0".to_string()];
        let values = parse_set_string_values(&args).unwrap();

        // A typed --set would turn 1.0 into a float; --set-string must not
        assert_eq!(values.get("server.image.tag").unwrap(), "1.0");
    }

    #[test]
    fn test_parse_set_invalid_format() {
        let args = vec!["no-equals-sign".to_string()];
        assert!(parse_set_values(&args).is_err());
        assert!(parse_set_string_values(&args).is_err());
    }

    #[test]
    fn test_layer_precedence_later_wins() {
        use std::io::Write;

        let defaults = Values::from_yaml("storageClass: local-path\nreplicas: 1").unwrap();

        let mut f1 = tempfile::NamedTempFile::new().unwrap();
        writeln!(f1, "storageClass: longhorn").unwrap();
        let mut f2 = tempfile::NamedTempFile::new().unwrap();
        writeln!(f2, "storageClass: nfs-client\nreplicas: 2").unwrap();

        let merged = Values::resolve_layers(
            defaults,
            &[f1.path().to_path_buf(), f2.path().to_path_buf()],
            &["replicas=3".to_string()],
            &["storageClass=manual".to_string()],
        )
        .unwrap();

        // every later layer overrode the earlier one
        assert_eq!(merged.get("storageClass").unwrap(), "manual");
        assert_eq!(merged.get("replicas").unwrap(), 3);
    }

    #[test]
    fn test_resolve_layers_no_overrides() {
        let defaults = Values::from_yaml("a: 1").unwrap();
        let merged = Values::resolve_layers(defaults, &[], &[], &[]).unwrap();
        assert_eq!(merged.get("a").unwrap(), 1);
    }

    #[test]
    fn test_write_to_disk_ephemeral_removed_on_drop() {
        let values = Values::from_yaml("a: 1").unwrap();
        let file = values.write_to_disk(None).unwrap();
        let path = file.path().to_path_buf();
        assert!(path.exists());
        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_write_to_disk_persistent_retained() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("merged.yaml");
        let values = Values::from_yaml("a: 1").unwrap();

        let file = values.write_to_disk(Some(&target)).unwrap();
        drop(file);
        assert!(target.exists());

        let reread = Values::from_file(&target).unwrap();
        assert_eq!(reread.get("a").unwrap(), 1);
    }
}
