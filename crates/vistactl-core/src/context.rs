//! Template rendering context

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::values::Values;

/// Context available to all templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderContext {
    /// User values (merged)
    pub values: JsonValue,

    /// Release information
    pub release: ReleaseInfo,
}

/// Release information for templates
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    /// Release name
    pub name: String,

    /// Target namespace
    pub namespace: String,

    /// The tool writing the manifest (field manager / managed-by label)
    pub service: String,
}

impl ReleaseInfo {
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            service: "vistactl".to_string(),
        }
    }
}

impl RenderContext {
    /// Create a new render context
    pub fn new(values: Values, release: ReleaseInfo) -> Self {
        Self {
            values: values.into_inner(),
            release,
        }
    }

    /// Convert to a minijinja-compatible context
    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_context() {
        let values = Values::from_yaml("server:\n  replicas: 1").unwrap();
        let ctx = RenderContext::new(values, ReleaseInfo::new("vista3d", "imaging"));

        let json = ctx.to_json();
        assert_eq!(json["release"]["name"], "vista3d");
        assert_eq!(json["release"]["namespace"], "imaging");
        assert_eq!(json["values"]["server"]["replicas"], 1);
    }
}
