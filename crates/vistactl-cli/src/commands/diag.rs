//! Diag command - extended best-effort troubleshooting battery
//!
//! Runs the status battery plus log tails and HTTP connectivity probes.
//! Failed probes are reported inline; the battery always runs to the end.

use vistactl_kube::{ClusterClient, DiagReport, Diagnostics};

use super::{COMPONENTS, TargetArgs};
use crate::display;
use crate::error::Result;

const EVENT_LIMIT: usize = 20;

/// Options for the diag command
pub struct DiagOptions {
    pub storage_class: String,
    pub log_lines: i64,
    pub components: Vec<String>,
    pub probes: Vec<String>,
}

/// Run the diag command
pub async fn run(target: &TargetArgs, opts: &DiagOptions) -> Result<()> {
    let client =
        ClusterClient::from_kubeconfig(&target.kubeconfig_path(), &target.namespace).await?;
    let diagnostics = Diagnostics::new(&client, &target.release);

    let mut report = DiagReport::new();
    report.record("deployments", diagnostics.deployment_summary().await);
    report.record("pods", diagnostics.pod_summary().await);
    report.record("services", diagnostics.service_summary().await);
    report.record(
        "claims",
        diagnostics.claim_summary(&opts.storage_class).await,
    );
    report.record("warning events", diagnostics.warning_events(EVENT_LIMIT).await);

    let components: Vec<&str> = if opts.components.is_empty() {
        COMPONENTS.to_vec()
    } else {
        opts.components.iter().map(String::as_str).collect()
    };
    for component in components {
        report.record(
            &format!("logs ({})", component),
            diagnostics.log_tail(component, opts.log_lines).await,
        );
    }

    for url in &opts.probes {
        report.record(
            &format!("probe {}", url),
            diagnostics.http_probe(url, 200).await,
        );
    }

    display::section(&format!(
        "DIAGNOSTICS {}/{} at {}",
        target.namespace,
        target.release,
        report.collected_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    for check in &report.checks {
        display::check(&check.name, check.success, &check.detail);
    }

    display::warn(&format!(
        "{} of {} checks failed",
        report.failed_count(),
        report.checks.len()
    ));

    Ok(())
}
