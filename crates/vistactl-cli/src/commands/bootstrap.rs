//! Bootstrap command - prepare, render, and deploy in one run
//!
//! Rerunning with identical inputs converges: the kubeconfig is reused, a
//! healthy storage provisioner stays untouched, the manifest is regenerated
//! at the same path, and server-side apply leaves unchanged resources alone.

use vistactl_core::DeployConfig;

use super::{ResolvedInputs, deploy, prepare};
use crate::error::Result;

/// Run the bootstrap chain
pub async fn run(
    config: &DeployConfig,
    inputs: &ResolvedInputs,
    creds: &prepare::CredentialArgs,
    deploy_opts: &deploy::DeployOptions,
) -> Result<()> {
    // render-only asks for no cluster contact at all
    if deploy_opts.render_only {
        return deploy::run(config, inputs, deploy_opts).await;
    }

    prepare::run(config, creds).await?;
    deploy::run(config, inputs, deploy_opts).await
}
