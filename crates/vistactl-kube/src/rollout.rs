//! Bounded rollout waiting
//!
//! Polls Deployment status until every workload reports its desired
//! replicas updated, ready, and available. The wait is bounded and fatal on
//! expiry; there is no retry or backoff beyond the poll loop itself.

use k8s_openapi::api::apps::v1::Deployment;
use std::time::Instant;
use tracing::debug;
use vistactl_core::WaitConfig;

use crate::client::ClusterClient;
use crate::error::{KubeError, Result};

/// Readiness of one deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub desired: i32,
    pub updated: i32,
    pub ready: i32,
    pub available: i32,
    /// Controller has observed the latest spec
    pub observed: bool,
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        self.observed
            && self.updated >= self.desired
            && self.ready >= self.desired
            && self.available >= self.desired
    }

    /// Short display form, e.g. `2/2`
    pub fn display(&self) -> String {
        format!("{}/{}", self.ready, self.desired)
    }
}

/// Extract readiness from a deployment object
pub fn readiness(deployment: &Deployment) -> Readiness {
    let desired = deployment
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1);

    let status = deployment.status.as_ref();
    let observed = match (
        deployment.metadata.generation,
        status.and_then(|s| s.observed_generation),
    ) {
        (Some(generation), Some(observed)) => observed >= generation,
        // no generation info: trust the replica counters alone
        _ => true,
    };

    Readiness {
        desired,
        updated: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        ready: status.and_then(|s| s.ready_replicas).unwrap_or(0),
        available: status.and_then(|s| s.available_replicas).unwrap_or(0),
        observed,
    }
}

/// Wait for the named deployments in a namespace to become ready
///
/// `progress` is called once per poll round with (name, readiness) for any
/// deployment that is not yet ready, so callers can surface progress.
pub async fn wait_for_deployments<F>(
    client: &ClusterClient,
    namespace: &str,
    names: &[String],
    wait: &WaitConfig,
    mut progress: F,
) -> Result<()>
where
    F: FnMut(&str, &Readiness),
{
    let api = client.deployments_in(namespace);
    let started = Instant::now();

    loop {
        let mut pending = Vec::new();

        for name in names {
            let state = match api.get_opt(name).await? {
                Some(deployment) => readiness(&deployment),
                // not created yet counts as pending, not an error
                None => Readiness {
                    desired: 1,
                    updated: 0,
                    ready: 0,
                    available: 0,
                    observed: false,
                },
            };

            if !state.is_ready() {
                progress(name, &state);
                pending.push(name.clone());
            }
        }

        if pending.is_empty() {
            debug!(?names, "all rollouts complete");
            return Ok(());
        }

        if started.elapsed() >= wait.timeout {
            return Err(KubeError::Timeout {
                what: format!("rollout of {}", pending.join(", ")),
                after: format!("{}s", wait.timeout.as_secs()),
            });
        }

        tokio::time::sleep(wait.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::{DeploymentSpec, DeploymentStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn deployment(desired: i32, updated: i32, ready: i32, available: i32) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some("vista3d-server".into()),
                generation: Some(2),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(desired),
                ..Default::default()
            }),
            status: Some(DeploymentStatus {
                observed_generation: Some(2),
                updated_replicas: Some(updated),
                ready_replicas: Some(ready),
                available_replicas: Some(available),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_ready_when_all_counters_match() {
        let r = readiness(&deployment(2, 2, 2, 2));
        assert!(r.is_ready());
        assert_eq!(r.display(), "2/2");
    }

    #[test]
    fn test_not_ready_when_replicas_lag() {
        assert!(!readiness(&deployment(2, 2, 1, 1)).is_ready());
        assert!(!readiness(&deployment(1, 0, 0, 0)).is_ready());
    }

    #[test]
    fn test_not_ready_on_stale_generation() {
        let mut d = deployment(1, 1, 1, 1);
        d.metadata.generation = Some(3);
        assert!(!readiness(&d).is_ready());
    }

    #[test]
    fn test_missing_status_defaults_pending() {
        let d = Deployment {
            metadata: ObjectMeta::default(),
            spec: Some(DeploymentSpec {
                replicas: Some(1),
                ..Default::default()
            }),
            status: None,
        };
        let r = readiness(&d);
        assert!(!r.is_ready());
        assert_eq!(r.desired, 1);
    }
}
