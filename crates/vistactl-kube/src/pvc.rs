//! Persistent volume claim handling
//!
//! A bound claim's storage class is immutable, so a redeploy that changes
//! storage classes must drop the old claims first. The applier deletes the
//! application's claims by default and preserves them only on request.

use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use kube::api::{DeleteParams, ListParams};
use tracing::debug;

use crate::client::ClusterClient;
use crate::error::Result;

/// One claim's observed state, for reports
#[derive(Debug, Clone)]
pub struct ClaimInfo {
    pub name: String,
    pub storage_class: Option<String>,
    pub phase: Option<String>,
    pub capacity: Option<String>,
}

/// Delete the named claims, ignoring those already absent
///
/// Returns the names actually deleted.
pub async fn delete_claims(client: &ClusterClient, names: &[String]) -> Result<Vec<String>> {
    let api = client.claims();
    let mut deleted = Vec::new();

    for name in names {
        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => {
                debug!(claim = %name, "deleted claim");
                deleted.push(name.clone());
            }
            Err(kube::Error::Api(resp)) if resp.code == 404 => {
                debug!(claim = %name, "claim already absent");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(deleted)
}

/// List the release's claims with their bound storage classes
pub async fn list_claims(client: &ClusterClient, release: &str) -> Result<Vec<ClaimInfo>> {
    let params =
        ListParams::default().labels(&format!("app.kubernetes.io/instance={}", release));
    let claims = client.claims().list(&params).await?;

    Ok(claims.items.iter().map(claim_info).collect())
}

fn claim_info(claim: &PersistentVolumeClaim) -> ClaimInfo {
    let capacity = claim
        .status
        .as_ref()
        .and_then(|s| s.capacity.as_ref())
        .and_then(|c| c.get("storage"))
        .map(|q| q.0.clone());

    ClaimInfo {
        name: claim.metadata.name.clone().unwrap_or_default(),
        storage_class: claim
            .spec
            .as_ref()
            .and_then(|s| s.storage_class_name.clone()),
        phase: claim.status.as_ref().and_then(|s| s.phase.clone()),
        capacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{PersistentVolumeClaimSpec, PersistentVolumeClaimStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_claim_info_extraction() {
        let claim = PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some("vista3d-models".into()),
                ..Default::default()
            },
            spec: Some(PersistentVolumeClaimSpec {
                storage_class_name: Some("local-path".into()),
                ..Default::default()
            }),
            status: Some(PersistentVolumeClaimStatus {
                phase: Some("Bound".into()),
                ..Default::default()
            }),
        };

        let info = claim_info(&claim);
        assert_eq!(info.name, "vista3d-models");
        assert_eq!(info.storage_class.as_deref(), Some("local-path"));
        assert_eq!(info.phase.as_deref(), Some("Bound"));
        assert!(info.capacity.is_none());
    }
}
