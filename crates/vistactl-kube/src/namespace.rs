//! Namespace handling

use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::PostParams;
use tracing::debug;

use crate::client::ClusterClient;
use crate::error::Result;

/// Ensure the target namespace exists
///
/// Creates it on 404; an existing namespace is left untouched. This tooling
/// never deletes namespaces. Returns true when the namespace was created.
pub async fn ensure_namespace(client: &ClusterClient, name: &str) -> Result<bool> {
    let api = client.namespaces();

    if api.get_opt(name).await?.is_some() {
        debug!(namespace = name, "namespace already exists");
        return Ok(false);
    }

    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };

    api.create(&PostParams::default(), &ns).await?;
    debug!(namespace = name, "namespace created");
    Ok(true)
}
