//! Status command - read-only state report for a release

use vistactl_kube::{ClusterClient, DiagReport, Diagnostics};

use super::TargetArgs;
use crate::display;
use crate::error::Result;

/// Number of warning events shown
const EVENT_LIMIT: usize = 10;

/// Run the status command
pub async fn run(target: &TargetArgs, storage_class: &str, json: bool) -> Result<()> {
    let client =
        ClusterClient::from_kubeconfig(&target.kubeconfig_path(), &target.namespace).await?;
    let diagnostics = Diagnostics::new(&client, &target.release);

    let mut report = DiagReport::new();
    report.record("deployments", diagnostics.deployment_summary().await);
    report.record("pods", diagnostics.pod_summary().await);
    report.record("services", diagnostics.service_summary().await);
    report.record("claims", diagnostics.claim_summary(storage_class).await);
    report.record("warning events", diagnostics.warning_events(EVENT_LIMIT).await);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report)
                .map_err(|e| crate::error::CliError::Other { message: e.to_string() })?
        );
        return Ok(());
    }

    display::section(&format!(
        "STATUS {}/{} at {}",
        target.namespace,
        target.release,
        report.collected_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    for check in &report.checks {
        display::check(&check.name, check.success, &check.detail);
    }

    if report.failed_count() > 0 {
        display::warn(&format!(
            "{} of {} checks could not be collected",
            report.failed_count(),
            report.checks.len()
        ));
    }

    Ok(())
}
