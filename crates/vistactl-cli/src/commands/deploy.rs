//! Deploy command - render the bundle and make cluster state match it

use std::path::PathBuf;

use vistactl_core::DeployConfig;
use vistactl_kube::{Applier, ClusterClient, delete_claims, rollout};

use super::{ResolvedInputs, render_manifest, workload_names, write_manifest};
use crate::display;
use crate::error::{CliError, Result};

/// Options for the deploy stage
pub struct DeployOptions {
    pub output: PathBuf,
    pub show_values_path: Option<PathBuf>,
    pub render_only: bool,
}

/// Run the deploy command with already-resolved inputs
pub async fn run(config: &DeployConfig, inputs: &ResolvedInputs, opts: &DeployOptions) -> Result<()> {
    // The merged values hit disk for inspection; the file is ephemeral
    // unless the caller asked for a persistent path.
    let values_file = inputs
        .values
        .write_to_disk(opts.show_values_path.as_deref())?;
    tracing::debug!(path = %values_file.path().display(), "merged values written");

    let result = render_manifest(inputs, &config.release, &config.namespace)?;
    write_manifest(&result, &opts.output)?;
    display::done(&format!(
        "rendered {} manifests to {}",
        result.manifests.len(),
        opts.output.display()
    ));

    if opts.render_only {
        return Ok(());
    }

    let claims = config.stateful_claims();

    if config.dry_run {
        display::step("dry run - no cluster changes will be made");
        if config.preserve_pvcs {
            println!("  would preserve existing claims");
        } else {
            println!("  would delete claims: {}", claims.join(", "));
        }
        println!(
            "  would run: kubectl --kubeconfig {} -n {} apply -f {}",
            config.kubeconfig.display(),
            config.namespace,
            opts.output.display()
        );
        return Ok(());
    }

    let client = ClusterClient::from_kubeconfig(&config.kubeconfig, &config.namespace).await?;

    // Bound claims keep their storage class forever, so stale claims are
    // dropped before apply unless explicitly preserved.
    if config.preserve_pvcs {
        display::skipped("preserving existing claims (--preserve-pvcs)");
    } else {
        let deleted = delete_claims(&client, &claims).await?;
        if deleted.is_empty() {
            display::skipped("no existing claims to delete");
        } else {
            display::done(&format!("deleted claims: {}", deleted.join(", ")));
        }
    }

    let applier = Applier::new(client.kube_client().clone()).await?;
    let summary = applier
        .apply_manifest(&config.namespace, &result.manifest_text())
        .await?;
    if !summary.is_success() {
        let detail: Vec<String> = summary
            .failed
            .iter()
            .map(|(name, err)| format!("{}: {}", name, err))
            .collect();
        return Err(CliError::cluster(format!(
            "apply failed for {} resource(s):\n{}",
            summary.failed.len(),
            detail.join("\n")
        )));
    }
    display::done(&format!("applied manifest ({})", summary.summary()));

    if config.wait {
        let names = workload_names(&config.release);
        let bar = display::spinner("waiting for rollouts");
        let wait_result = rollout::wait_for_deployments(
            &client,
            &config.namespace,
            &names,
            &inputs.wait,
            |name, state| bar.set_message(format!("waiting for {} {}", name, state.display())),
        )
        .await;
        bar.finish_and_clear();
        wait_result?;
        display::done("all workloads rolled out");
    }

    print_follow_up(config);
    Ok(())
}

/// Inspection commands for the operator to run next
fn print_follow_up(config: &DeployConfig) {
    display::section("NEXT STEPS");
    println!(
        "  kubectl --kubeconfig {} -n {} get pods",
        config.kubeconfig.display(),
        config.namespace
    );
    println!(
        "  vistactl status -n {} --release {}",
        config.namespace, config.release
    );
    println!(
        "  vistactl port-forward -n {} --release {} --component frontend",
        config.namespace, config.release
    );
}
