//! Best-effort diagnostics battery
//!
//! Every probe is isolated: a failing check is recorded inline and the rest
//! of the battery still runs, so a partially-broken environment yields a
//! partial report instead of an error. Nothing here mutates cluster state.

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, LogParams};
use serde::Serialize;
use std::time::Duration;

use crate::client::ClusterClient;
use crate::error::{KubeError, Result};
use crate::pvc;
use crate::rollout;

/// Timeout for a single HTTP connectivity probe
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a single check
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub success: bool,
    pub detail: String,
}

/// A collected battery of check outcomes
#[derive(Debug, Serialize)]
pub struct DiagReport {
    pub checks: Vec<CheckOutcome>,
    pub collected_at: DateTime<Utc>,
}

impl DiagReport {
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            collected_at: Utc::now(),
        }
    }

    /// Record a check result, folding errors into the report
    pub fn record(&mut self, name: &str, result: Result<String>) {
        match result {
            Ok(detail) => self.checks.push(CheckOutcome {
                name: name.to_string(),
                success: true,
                detail,
            }),
            Err(e) => self.checks.push(CheckOutcome {
                name: name.to_string(),
                success: false,
                detail: e.to_string(),
            }),
        }
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.success).count()
    }
}

impl Default for DiagReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Diagnostics collector for one release
pub struct Diagnostics<'a> {
    client: &'a ClusterClient,
    release: String,
    http: reqwest::Client,
}

impl<'a> Diagnostics<'a> {
    pub fn new(client: &'a ClusterClient, release: &str) -> Self {
        Self {
            client,
            release: release.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn instance_selector(&self) -> String {
        format!("app.kubernetes.io/instance={}", self.release)
    }

    /// Pod phases, restarts, and readiness
    pub async fn pod_summary(&self) -> Result<String> {
        let params = ListParams::default().labels(&self.instance_selector());
        let pods = self.client.pods().list(&params).await?;

        if pods.items.is_empty() {
            return Ok("no pods found for this release".to_string());
        }

        let mut lines = Vec::new();
        for pod in &pods.items {
            lines.push(describe_pod(pod));
        }
        Ok(lines.join("\n"))
    }

    /// Deployment replica counters
    pub async fn deployment_summary(&self) -> Result<String> {
        let params = ListParams::default().labels(&self.instance_selector());
        let deployments = self.client.deployments().list(&params).await?;

        if deployments.items.is_empty() {
            return Ok("no deployments found for this release".to_string());
        }

        let mut lines = Vec::new();
        for deployment in &deployments.items {
            let name = deployment.metadata.name.as_deref().unwrap_or("unnamed");
            let state = rollout::readiness(deployment);
            lines.push(format!(
                "{}: {} ready ({} updated, {} available)",
                name,
                state.display(),
                state.updated,
                state.available
            ));
        }
        Ok(lines.join("\n"))
    }

    /// Services and their cluster IPs
    pub async fn service_summary(&self) -> Result<String> {
        let params = ListParams::default().labels(&self.instance_selector());
        let services = self.client.services().list(&params).await?;

        if services.items.is_empty() {
            return Ok("no services found for this release".to_string());
        }

        let mut lines = Vec::new();
        for service in &services.items {
            let name = service.metadata.name.as_deref().unwrap_or("unnamed");
            let spec = service.spec.as_ref();
            let cluster_ip = spec
                .and_then(|s| s.cluster_ip.as_deref())
                .unwrap_or("<none>");
            let ports = spec
                .and_then(|s| s.ports.as_ref())
                .map(|ports| {
                    ports
                        .iter()
                        .map(|p| p.port.to_string())
                        .collect::<Vec<_>>()
                        .join(",")
                })
                .unwrap_or_default();
            lines.push(format!("{}: {} [{}]", name, cluster_ip, ports));
        }
        Ok(lines.join("\n"))
    }

    /// Claims with bound storage class; flags class mismatches
    pub async fn claim_summary(&self, expected_class: &str) -> Result<String> {
        let claims = pvc::list_claims(self.client, &self.release).await?;

        if claims.is_empty() {
            return Ok("no claims found for this release".to_string());
        }

        let mut lines = Vec::new();
        for claim in &claims {
            let class = claim.storage_class.as_deref().unwrap_or("<none>");
            let mismatch = if class != expected_class {
                " (storage class differs from configuration)"
            } else {
                ""
            };
            lines.push(format!(
                "{}: {} class={}{}{}",
                claim.name,
                claim.phase.as_deref().unwrap_or("Unknown"),
                class,
                claim
                    .capacity
                    .as_ref()
                    .map(|c| format!(" capacity={}", c))
                    .unwrap_or_default(),
                mismatch
            ));
        }
        Ok(lines.join("\n"))
    }

    /// Recent warning events in the namespace
    pub async fn warning_events(&self, limit: usize) -> Result<String> {
        let events = self.client.events().list(&ListParams::default()).await?;

        let mut warnings: Vec<_> = events
            .items
            .iter()
            .filter(|e| e.type_.as_deref() == Some("Warning"))
            .collect();
        warnings.sort_by_key(|e| e.last_timestamp.as_ref().map(|t| t.0));
        warnings.reverse();

        if warnings.is_empty() {
            return Ok("no warning events".to_string());
        }

        let lines: Vec<String> = warnings
            .iter()
            .take(limit)
            .map(|e| {
                format!(
                    "{} {}/{}: {}",
                    e.reason.as_deref().unwrap_or("Unknown"),
                    e.involved_object.kind.as_deref().unwrap_or("?"),
                    e.involved_object.name.as_deref().unwrap_or("?"),
                    e.message.as_deref().unwrap_or("").trim()
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }

    /// Tail of the newest pod's log for one component
    pub async fn log_tail(&self, component: &str, lines: i64) -> Result<String> {
        let selector = format!(
            "{},app.kubernetes.io/component={}",
            self.instance_selector(),
            component
        );
        let pods = self
            .client
            .pods()
            .list(&ListParams::default().labels(&selector))
            .await?;

        let pod_name = pods
            .items
            .first()
            .and_then(|p| p.metadata.name.clone())
            .ok_or_else(|| KubeError::Probe(format!("no pod found for component {}", component)))?;

        let params = LogParams {
            tail_lines: Some(lines),
            ..Default::default()
        };
        let log = self.client.pods().logs(&pod_name, &params).await?;

        if log.trim().is_empty() {
            Ok(format!("{}: log empty", pod_name))
        } else {
            Ok(log)
        }
    }

    /// HTTP GET a health endpoint and compare the status code
    pub async fn http_probe(&self, url: &str, expected_status: u16) -> Result<String> {
        let response = self
            .http
            .get(url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| KubeError::Probe(format!("{}: {}", url, e)))?;

        let status = response.status().as_u16();
        if status == expected_status {
            Ok(format!("{} -> {}", url, status))
        } else {
            Err(KubeError::Probe(format!(
                "{} returned {} (expected {})",
                url, status, expected_status
            )))
        }
    }
}

fn describe_pod(pod: &Pod) -> String {
    let name = pod.metadata.name.as_deref().unwrap_or("unnamed");
    let phase = pod
        .status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .unwrap_or("Unknown");

    let (ready, total, restarts) = pod
        .status
        .as_ref()
        .and_then(|s| s.container_statuses.as_ref())
        .map(|statuses| {
            let ready = statuses.iter().filter(|c| c.ready).count();
            let restarts: i32 = statuses.iter().map(|c| c.restart_count).sum();
            (ready, statuses.len(), restarts)
        })
        .unwrap_or((0, 0, 0));

    format!(
        "{}: {} ({}/{} ready, {} restarts)",
        name, phase, ready, total, restarts
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{ContainerStatus, PodStatus};
    use kube::api::ObjectMeta;

    #[test]
    fn test_record_folds_errors_inline() {
        let mut report = DiagReport::new();
        report.record("pods", Ok("fine".into()));
        report.record(
            "events",
            Err(KubeError::Probe("connection refused".into())),
        );

        assert_eq!(report.checks.len(), 2);
        assert_eq!(report.failed_count(), 1);
        assert!(report.checks[1].detail.contains("connection refused"));
    }

    #[test]
    fn test_describe_pod() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("vista3d-server-abc".into()),
                ..Default::default()
            },
            status: Some(PodStatus {
                phase: Some("Running".into()),
                container_statuses: Some(vec![ContainerStatus {
                    name: "server".into(),
                    ready: true,
                    restart_count: 2,
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert_eq!(
            describe_pod(&pod),
            "vista3d-server-abc: Running (1/1 ready, 2 restarts)"
        );
    }
}
