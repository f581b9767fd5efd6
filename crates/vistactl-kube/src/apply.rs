//! Applying and deleting rendered manifests
//!
//! Server-side apply keeps reruns idempotent: an unchanged manifest
//! converges without conflicts, and field ownership stays with this tool.
//! Documents are processed in manifest order (the bundle orders claims
//! before workloads); deletion runs in reverse.

use kube::{
    Client,
    api::{Api, DeleteParams, DynamicObject, Patch, PatchParams},
    core::{GroupVersionKind, TypeMeta},
    discovery::{ApiCapabilities, ApiResource, Discovery, Scope},
};
use tracing::debug;

use crate::error::{KubeError, Result};

/// Field manager name for Server-Side Apply
const FIELD_MANAGER: &str = "vistactl";

/// Summary of apply/delete operations
#[derive(Debug, Clone, Default)]
pub struct OperationSummary {
    /// Successfully processed resources
    pub succeeded: Vec<String>,
    /// Failed resources with errors
    pub failed: Vec<(String, String)>,
    /// Skipped resources (e.g., already gone)
    pub skipped: Vec<(String, String)>,
}

impl OperationSummary {
    /// Check if all operations succeeded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Format as a human-readable summary
    pub fn summary(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if !self.succeeded.is_empty() {
            parts.push(format!("{} succeeded", self.succeeded.len()));
        }
        if !self.failed.is_empty() {
            parts.push(format!("{} failed", self.failed.len()));
        }
        if !self.skipped.is_empty() {
            parts.push(format!("{} skipped", self.skipped.len()));
        }
        if parts.is_empty() {
            "No resources processed".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Parsed resource ready for cluster operations
struct ParsedResource {
    obj: DynamicObject,
    gvk: GroupVersionKind,
    api_resource: ApiResource,
    capabilities: ApiCapabilities,
}

impl ParsedResource {
    fn display_name(&self) -> String {
        let name = self.obj.metadata.name.as_deref().unwrap_or("unnamed");
        match &self.obj.metadata.namespace {
            Some(ns) => format!("{}/{}/{}", ns, self.gvk.kind, name),
            None => format!("{}/{}", self.gvk.kind, name),
        }
    }
}

/// Split a multi-document manifest into non-empty documents
pub fn split_documents(manifest: &str) -> Vec<&str> {
    manifest
        .split("\n---")
        .map(str::trim)
        .filter(|doc| {
            !doc.is_empty()
                && !doc
                    .lines()
                    .all(|l| l.trim().is_empty() || l.trim().starts_with('#'))
        })
        .collect()
}

/// Parse documents into dynamic objects without touching the cluster
pub fn parse_objects(manifest: &str) -> Result<Vec<DynamicObject>> {
    split_documents(manifest)
        .into_iter()
        .enumerate()
        .map(|(index, doc)| {
            serde_yaml::from_str(doc).map_err(|e| {
                KubeError::InvalidManifest(format!("failed to parse document {}: {}", index, e))
            })
        })
        .collect()
}

/// Applies and deletes manifests against a cluster
pub struct Applier {
    client: Client,
    discovery: Discovery,
}

impl Applier {
    /// Create a new applier, running API discovery once
    pub async fn new(client: Client) -> Result<Self> {
        let discovery = Discovery::new(client.clone()).run().await?;
        Ok(Self { client, discovery })
    }

    /// Apply a manifest, defaulting namespaced resources into `namespace`
    pub async fn apply_manifest(
        &self,
        namespace: &str,
        manifest: &str,
    ) -> Result<OperationSummary> {
        let resources = self.resolve_all(manifest, namespace)?;
        let mut summary = OperationSummary::default();

        for resource in &resources {
            let name = resource.display_name();
            match self.apply_single(resource).await {
                Ok(created) => {
                    let action = if created { "created" } else { "configured" };
                    debug!(resource = %name, action, "applied");
                    summary.succeeded.push(format!("{} ({})", name, action));
                }
                Err(e) => summary.failed.push((name, e.to_string())),
            }
        }

        Ok(summary)
    }

    /// Delete a manifest's resources, in reverse document order
    pub async fn delete_manifest(
        &self,
        namespace: &str,
        manifest: &str,
    ) -> Result<OperationSummary> {
        let resources = self.resolve_all(manifest, namespace)?;
        let mut summary = OperationSummary::default();

        for resource in resources.iter().rev() {
            let name = resource.display_name();
            match self.delete_single(resource).await {
                Ok(true) => summary.succeeded.push(format!("{} (deleted)", name)),
                Ok(false) => summary.skipped.push((name, "not found".to_string())),
                Err(e) => summary.failed.push((name, e.to_string())),
            }
        }

        Ok(summary)
    }

    /// Resolve every document against API discovery
    fn resolve_all(&self, manifest: &str, default_namespace: &str) -> Result<Vec<ParsedResource>> {
        parse_objects(manifest)?
            .into_iter()
            .map(|obj| self.resolve_single(obj, default_namespace))
            .collect()
    }

    fn resolve_single(
        &self,
        mut obj: DynamicObject,
        default_namespace: &str,
    ) -> Result<ParsedResource> {
        let type_meta = obj.types.as_ref().ok_or_else(|| {
            KubeError::InvalidManifest("resource missing apiVersion or kind".to_string())
        })?;
        let api_version = type_meta.api_version.clone();

        let gvk = gvk_from_type_meta(type_meta);

        let (api_resource, capabilities) = self.discovery.resolve_gvk(&gvk).ok_or_else(|| {
            KubeError::InvalidManifest(format!(
                "unknown resource type: {}/{}",
                api_version, gvk.kind
            ))
        })?;

        if capabilities.scope == Scope::Namespaced && obj.metadata.namespace.is_none() {
            obj.metadata.namespace = Some(default_namespace.to_string());
        }

        Ok(ParsedResource {
            obj,
            gvk,
            api_resource,
            capabilities,
        })
    }

    /// Server-side apply one resource; returns true when it was created
    async fn apply_single(&self, resource: &ParsedResource) -> Result<bool> {
        let name = resource.obj.metadata.name.as_deref().ok_or_else(|| {
            KubeError::InvalidManifest("resource missing metadata.name".to_string())
        })?;

        let api = self.api_for(resource);
        let exists = api.get_opt(name).await?.is_some();

        let mut params = PatchParams::apply(FIELD_MANAGER);
        params.force = true;

        api.patch(name, &params, &Patch::Apply(&resource.obj))
            .await?;

        Ok(!exists)
    }

    /// Delete one resource; returns false when it was already gone
    async fn delete_single(&self, resource: &ParsedResource) -> Result<bool> {
        let name = resource.obj.metadata.name.as_deref().ok_or_else(|| {
            KubeError::InvalidManifest("resource missing metadata.name".to_string())
        })?;

        let api = self.api_for(resource);
        let params = DeleteParams {
            propagation_policy: Some(kube::api::PropagationPolicy::Background),
            ..Default::default()
        };

        match api.delete(name, &params).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn api_for(&self, resource: &ParsedResource) -> Api<DynamicObject> {
        if resource.capabilities.scope == Scope::Namespaced {
            let ns = resource
                .obj
                .metadata
                .namespace
                .as_deref()
                .unwrap_or("default");
            Api::namespaced_with(self.client.clone(), ns, &resource.api_resource)
        } else {
            Api::all_with(self.client.clone(), &resource.api_resource)
        }
    }
}

fn gvk_from_type_meta(tm: &TypeMeta) -> GroupVersionKind {
    let (group, version) = match tm.api_version.rsplit_once('/') {
        Some((g, v)) => (g.to_string(), v.to_string()),
        None => (String::new(), tm.api_version.clone()),
    };

    GroupVersionKind {
        group,
        version,
        kind: tm.kind.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_documents() {
        let manifest = "kind: A\n---\nkind: B\n---\n# only a comment\n---\n\n";
        let docs = split_documents(manifest);
        assert_eq!(docs, vec!["kind: A", "kind: B"]);
    }

    #[test]
    fn test_split_keeps_embedded_separator_free_docs() {
        // a document whose string content contains "---" mid-line is intact
        let manifest = "kind: ConfigMap\ndata:\n  x: \"a---b\"";
        assert_eq!(split_documents(manifest).len(), 1);
    }

    #[test]
    fn test_parse_objects() {
        let manifest = r#"apiVersion: v1
kind: Service
metadata:
  name: vista3d-server
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: vista3d-server
  namespace: imaging
"#;
        let objects = parse_objects(manifest).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].types.as_ref().unwrap().kind, "Service");
        assert_eq!(objects[1].metadata.namespace.as_deref(), Some("imaging"));
    }

    #[test]
    fn test_parse_objects_reports_bad_document_index() {
        let manifest = "apiVersion: v1\nkind: Service\nmetadata:\n  name: ok\n---\n{ not yaml";
        let err = parse_objects(manifest).unwrap_err();
        assert!(err.to_string().contains("document 1"));
    }

    #[test]
    fn test_gvk_from_type_meta() {
        let tm = TypeMeta {
            api_version: "apps/v1".into(),
            kind: "Deployment".into(),
        };
        let gvk = gvk_from_type_meta(&tm);
        assert_eq!(gvk.group, "apps");
        assert_eq!(gvk.version, "v1");

        let core = TypeMeta {
            api_version: "v1".into(),
            kind: "Service".into(),
        };
        let gvk = gvk_from_type_meta(&core);
        assert_eq!(gvk.group, "");
        assert_eq!(gvk.version, "v1");
    }

    #[test]
    fn test_operation_summary_formatting() {
        let mut summary = OperationSummary::default();
        assert_eq!(summary.summary(), "No resources processed");
        assert!(summary.is_success());

        summary.succeeded.push("a".into());
        summary.skipped.push(("b".into(), "not found".into()));
        assert_eq!(summary.summary(), "1 succeeded, 1 skipped");

        summary.failed.push(("c".into(), "boom".into()));
        assert!(!summary.is_success());
    }
}
