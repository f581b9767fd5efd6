//! Prepare command - authenticate, credential file, namespace, storage, secrets

use std::path::PathBuf;

use vistactl_core::{DeployConfig, NgcCredentials, RegistryCredentials};
use vistactl_kube::{
    Applier, ClusterClient, RancherCli, ensure_namespace, ngc_secret_data, rancher,
    recreate_opaque_secret, recreate_registry_secret, rollout, storage,
};

use crate::display;
use crate::error::{CliError, Result};
use crate::prompt;

/// Credential inputs for the prepare stage
pub struct CredentialArgs {
    pub ngc_key: Option<String>,
    pub ngc_key_file: Option<PathBuf>,
    pub ngc_org: Option<String>,
    pub registry_server: String,
    pub registry_username: String,
    pub registry_password: Option<String>,
    pub registry_email: Option<String>,
}

/// Run the prepare command
pub async fn run(config: &DeployConfig, creds: &CredentialArgs) -> Result<()> {
    let ngc = resolve_ngc_credentials(creds, config.non_interactive)?;
    let registry = RegistryCredentials {
        server: creds.registry_server.clone(),
        username: creds.registry_username.clone(),
        // nvcr.io authenticates $oauthtoken with the NGC key itself
        password: creds
            .registry_password
            .clone()
            .unwrap_or_else(|| ngc.api_key.clone()),
        email: creds.registry_email.clone(),
    };

    if config.dry_run {
        display::step("dry run - no cluster changes will be made");
        if config.rancher.is_some() {
            println!("  would log in to Rancher and resolve the cluster");
            println!("  would write kubeconfig to {}", config.kubeconfig.display());
        }
        println!("  would ensure namespace {}", config.namespace);
        println!(
            "  would check storage provisioner for class {}",
            config.storage_class
        );
        println!(
            "  would recreate secrets {} and {}",
            config.ngc_secret_name(),
            config.registry_secret_name()
        );
        return Ok(());
    }

    // Credential file
    if let Some(rancher_config) = &config.rancher {
        if config.kubeconfig.exists() && !config.refresh_kubeconfig {
            display::skipped(&format!(
                "reusing kubeconfig at {} (use --refresh-kubeconfig to re-fetch)",
                config.kubeconfig.display()
            ));
        } else {
            display::step(&format!("logging in to {}", rancher_config.server));
            let cli = RancherCli::new(rancher_config)?;
            cli.login().await?;

            let clusters = cli.list_clusters().await?;
            let cluster_id = rancher::resolve_cluster(&clusters, &rancher_config.cluster)?;
            display::done(&format!(
                "resolved cluster '{}' to {}",
                rancher_config.cluster, cluster_id
            ));

            let contents = cli.fetch_kubeconfig(&cluster_id).await?;
            rancher::write_kubeconfig(&config.kubeconfig, &contents)?;
            display::done(&format!("wrote kubeconfig to {}", config.kubeconfig.display()));
        }
    } else if !config.kubeconfig.exists() {
        return Err(CliError::config_with_help(
            format!("no kubeconfig at {}", config.kubeconfig.display()),
            "pass --rancher-server/--rancher-token/--cluster to retrieve one, \
             or point --kubeconfig at an existing credential file",
        ));
    }

    let client = ClusterClient::from_kubeconfig(&config.kubeconfig, &config.namespace).await?;

    // Namespace
    if ensure_namespace(&client, &config.namespace).await? {
        display::done(&format!("created namespace {}", config.namespace));
    } else {
        display::skipped(&format!("namespace {} already exists", config.namespace));
    }

    // Storage provisioner
    ensure_storage(&client, config).await?;

    // Secrets: always delete-then-create
    let ngc_secret = config.ngc_secret_name();
    recreate_opaque_secret(&client, &ngc_secret, ngc_secret_data(&ngc)).await?;
    display::done(&format!("recreated secret {}", ngc_secret));

    let registry_secret = config.registry_secret_name();
    recreate_registry_secret(&client, &registry_secret, &registry).await?;
    display::done(&format!("recreated secret {}", registry_secret));

    Ok(())
}

/// Resolve the NGC API key from flag, key file, or interactive prompt
fn resolve_ngc_credentials(creds: &CredentialArgs, non_interactive: bool) -> Result<NgcCredentials> {
    let api_key = if let Some(key) = &creds.ngc_key {
        key.clone()
    } else if let Some(path) = &creds.ngc_key_file {
        std::fs::read_to_string(path)
            .map_err(|e| {
                CliError::config(format!(
                    "failed to read NGC key file {}: {}",
                    path.display(),
                    e
                ))
            })?
            .trim()
            .to_string()
    } else if !non_interactive {
        prompt::secret("NGC API key")?
    } else {
        return Err(CliError::config_with_help(
            "NGC API key not provided",
            "pass --ngc-key, --ngc-key-file, or set NGC_API_KEY",
        ));
    };

    if api_key.is_empty() {
        return Err(CliError::config("NGC API key is empty"));
    }

    Ok(NgcCredentials {
        api_key,
        org_id: creds.ngc_org.clone(),
    })
}

/// Decide provisioner health from the three signals and reinstall only when
/// needed (or forced)
async fn ensure_storage(client: &ClusterClient, config: &DeployConfig) -> Result<()> {
    let signals = storage::observe(client, &config.storage_class).await?;
    let status = storage::StorageStatus::evaluate(signals);

    let reason = match (&status, config.force_storage_install) {
        (storage::StorageStatus::Healthy, false) => {
            display::skipped(&format!(
                "storage provisioner for class {} is healthy",
                config.storage_class
            ));
            return Ok(());
        }
        (_, true) => "--force-storage-install".to_string(),
        (storage::StorageStatus::NeedsReinstall(reason), _) => reason.clone(),
    };

    display::step(&format!("installing storage provisioner ({})", reason));

    let applier = Applier::new(client.kube_client().clone()).await?;
    let summary = applier
        .apply_manifest(storage::PROVISIONER_NAMESPACE, storage::PROVISIONER_MANIFEST)
        .await?;
    if !summary.is_success() {
        return Err(CliError::cluster(format!(
            "storage provisioner install failed: {:?}",
            summary.failed
        )));
    }

    let bar = display::spinner("waiting for storage provisioner rollout");
    let result = rollout::wait_for_deployments(
        client,
        storage::PROVISIONER_NAMESPACE,
        &[storage::PROVISIONER_DEPLOYMENT.to_string()],
        &config.wait_config,
        |name, state| bar.set_message(format!("{} {}", name, state.display())),
    )
    .await;
    bar.finish_and_clear();
    result?;

    display::done("storage provisioner installed");
    Ok(())
}
