//! Teardown command - remove the deployed stack
//!
//! The one utility that mutates primary deployment state, so it confirms
//! interactively unless told otherwise. Claims survive unless --delete-pvcs
//! is passed.

use vistactl_core::DeployConfig;
use vistactl_kube::{Applier, ClusterClient, delete_claims};

use super::{ResolvedInputs, render_manifest};
use crate::display;
use crate::error::{CliError, Result};
use crate::prompt;

/// Options for the teardown command
pub struct TeardownOptions {
    pub delete_pvcs: bool,
    pub yes: bool,
}

/// Run the teardown command
pub async fn run(
    config: &DeployConfig,
    inputs: &ResolvedInputs,
    opts: &TeardownOptions,
) -> Result<()> {
    // the same render that deployed the stack tells us what to delete
    let result = render_manifest(inputs, &config.release, &config.namespace)?;

    if config.dry_run {
        display::step("dry run - no cluster changes will be made");
        println!(
            "  would delete {} manifest documents from namespace {}",
            result.manifests.len(),
            config.namespace
        );
        if opts.delete_pvcs {
            println!(
                "  would delete claims: {}",
                config.stateful_claims().join(", ")
            );
        }
        return Ok(());
    }

    if !opts.yes {
        if config.non_interactive {
            return Err(CliError::config_with_help(
                "teardown requires confirmation",
                "pass --yes to tear down without a prompt",
            ));
        }
        let question = format!(
            "Delete the {} release from namespace {}?",
            config.release, config.namespace
        );
        if !prompt::confirm(&question)? {
            return Err(CliError::Aborted);
        }
    }

    let client = ClusterClient::from_kubeconfig(&config.kubeconfig, &config.namespace).await?;
    let applier = Applier::new(client.kube_client().clone()).await?;

    let summary = applier
        .delete_manifest(&config.namespace, &result.manifest_text())
        .await?;
    display::done(&format!("deleted release resources ({})", summary.summary()));

    if opts.delete_pvcs {
        let deleted = delete_claims(&client, &config.stateful_claims()).await?;
        if deleted.is_empty() {
            display::skipped("no claims to delete");
        } else {
            display::done(&format!("deleted claims: {}", deleted.join(", ")));
        }
    } else {
        display::skipped("claims preserved (pass --delete-pvcs to remove them)");
    }

    Ok(())
}
