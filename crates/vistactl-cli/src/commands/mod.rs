//! CLI commands

pub mod bootstrap;
pub mod deploy;
pub mod diag;
pub mod port_forward;
pub mod prepare;
pub mod render;
pub mod status;
pub mod teardown;

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use vistactl_core::{
    Bundle, DEFAULT_NAMESPACE, DEFAULT_RELEASE, DEFAULT_STORAGE_CLASS, RancherConfig,
    ReleaseInfo, RenderContext, Values, WaitConfig, default_kubeconfig_path,
};
use vistactl_engine::{Engine, RenderResult};

use crate::error::{CliError, Result};
use crate::prompt;

/// Release / namespace / credential-file selection shared by all commands
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Release name; resource names derive from it
    #[arg(long, env = "VISTACTL_RELEASE", default_value = DEFAULT_RELEASE)]
    pub release: String,

    /// Target namespace
    #[arg(
        short = 'n',
        long,
        env = "VISTACTL_NAMESPACE",
        default_value = DEFAULT_NAMESPACE
    )]
    pub namespace: String,

    /// Path of the cluster credential file
    #[arg(long, env = "VISTACTL_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,
}

impl TargetArgs {
    pub fn kubeconfig_path(&self) -> PathBuf {
        self.kubeconfig
            .clone()
            .unwrap_or_else(default_kubeconfig_path)
    }
}

/// Rancher endpoint settings
#[derive(Args, Debug, Clone)]
pub struct RancherArgs {
    /// Rancher server URL
    #[arg(long, env = "VISTACTL_RANCHER_SERVER")]
    pub rancher_server: Option<String>,

    /// Rancher API bearer token
    #[arg(long, env = "VISTACTL_RANCHER_TOKEN", hide_env_values = true)]
    pub rancher_token: Option<String>,

    /// Cluster name to resolve (exact match only)
    #[arg(long, env = "VISTACTL_CLUSTER")]
    pub cluster: Option<String>,

    /// Re-fetch the kubeconfig even when the file already exists
    #[arg(long)]
    pub refresh_kubeconfig: bool,
}

impl RancherArgs {
    /// All three Rancher settings together, or none of them
    pub fn to_config(&self) -> Result<Option<RancherConfig>> {
        match (&self.rancher_server, &self.rancher_token, &self.cluster) {
            (None, None, None) => Ok(None),
            (Some(server), Some(token), Some(cluster)) => Ok(Some(RancherConfig {
                server: server.clone(),
                token: token.clone(),
                cluster: cluster.clone(),
            })),
            _ => Err(CliError::config_with_help(
                "incomplete Rancher settings",
                "provide --rancher-server, --rancher-token and --cluster together, \
                 or none of them to use an existing kubeconfig",
            )),
        }
    }
}

/// Values layering flags
#[derive(Args, Debug, Clone, Default)]
pub struct ValuesArgs {
    /// Bundle directory (defaults to the builtin Vista3D bundle)
    #[arg(long, env = "VISTACTL_BUNDLE")]
    pub bundle: Option<PathBuf>,

    /// Values file(s) to merge, in order
    #[arg(short = 'f', long = "values")]
    pub values: Vec<PathBuf>,

    /// Set values on the command line (key=value, typed)
    #[arg(long = "set")]
    pub set: Vec<String>,

    /// Set string values on the command line (key=value, never coerced)
    #[arg(long = "set-string")]
    pub set_string: Vec<String>,

    /// Storage class for the application's claims
    #[arg(long, env = "VISTACTL_STORAGE_CLASS")]
    pub storage_class: Option<String>,
}

/// Ingress flags
#[derive(Args, Debug, Clone, Default)]
pub struct IngressArgs {
    /// Hostname to expose the frontend on (enables the ingress)
    #[arg(long, env = "VISTACTL_INGRESS_HOST")]
    pub ingress_host: Option<String>,

    /// Ingress class name
    #[arg(long, env = "VISTACTL_INGRESS_CLASS")]
    pub ingress_class: Option<String>,

    /// TLS secret name for the ingress host
    #[arg(long, env = "VISTACTL_INGRESS_TLS_SECRET")]
    pub ingress_tls_secret: Option<String>,
}

/// Fully-resolved render inputs
pub struct ResolvedInputs {
    pub bundle: Bundle,
    pub values: Values,
    pub wait: WaitConfig,
    pub storage_class: String,
}

/// Resolve bundle + values layers + flag overrides into render inputs
///
/// Interactive mode may prompt once for a missing ingress host; an empty
/// answer (or non-interactive mode) leaves the ingress disabled.
pub fn resolve_inputs(
    values_args: &ValuesArgs,
    ingress: &IngressArgs,
    non_interactive: bool,
    timeout_secs: Option<u64>,
) -> Result<ResolvedInputs> {
    let bundle = match &values_args.bundle {
        Some(dir) => Bundle::load(dir)?,
        None => Bundle::builtin(),
    };

    let mut values = Values::resolve_layers(
        bundle.defaults.clone(),
        &values_args.values,
        &values_args.set,
        &values_args.set_string,
    )?;

    if let Some(class) = &values_args.storage_class {
        values.set(
            "persistence.storageClass",
            serde_json::Value::String(class.clone()),
        )?;
    }

    if let Some(host) = &ingress.ingress_host {
        values.set("ingress.enabled", serde_json::Value::Bool(true))?;
        values.set("ingress.host", serde_json::Value::String(host.clone()))?;
    }
    if let Some(class) = &ingress.ingress_class {
        values.set(
            "ingress.className",
            serde_json::Value::String(class.clone()),
        )?;
    }
    if let Some(secret) = &ingress.ingress_tls_secret {
        values.set(
            "ingress.tlsSecret",
            serde_json::Value::String(secret.clone()),
        )?;
    }

    // one optional prompt; omission means "ingress disabled", never an error
    let host_missing = values.get_str("ingress.host").unwrap_or("").is_empty();
    if host_missing && !non_interactive {
        if let Some(host) = prompt::optional("Ingress hostname (empty to disable)")? {
            values.set("ingress.enabled", serde_json::Value::Bool(true))?;
            values.set("ingress.host", serde_json::Value::String(host))?;
        }
    }

    let mut wait: WaitConfig = values
        .get("wait")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| CliError::config(format!("invalid wait settings: {}", e)))?
        .unwrap_or_default();
    if let Some(secs) = timeout_secs {
        wait.timeout = Duration::from_secs(secs);
    }
    wait.validate()?;

    let storage_class = values
        .get_str("persistence.storageClass")
        .unwrap_or(DEFAULT_STORAGE_CLASS)
        .to_string();

    Ok(ResolvedInputs {
        bundle,
        values,
        wait,
        storage_class,
    })
}

/// Render the bundle for a release
pub fn render_manifest(
    inputs: &ResolvedInputs,
    release: &str,
    namespace: &str,
) -> Result<RenderResult> {
    let context = RenderContext::new(
        inputs.values.clone(),
        ReleaseInfo::new(release, namespace),
    );
    Ok(Engine::builder().build().render_bundle(&inputs.bundle, &context)?)
}

/// Write a rendered manifest to its output path ("-" prints to stdout)
pub fn write_manifest(result: &RenderResult, output: &std::path::Path) -> Result<()> {
    let text = result.manifest_text();
    if output.as_os_str() == "-" {
        println!("{}", text);
    } else {
        std::fs::write(output, text)?;
    }
    Ok(())
}

/// Deployment names of the stack's workloads
pub fn workload_names(release: &str) -> Vec<String> {
    vec![
        format!("{}-server", release),
        format!("{}-image-server", release),
        format!("{}-frontend", release),
    ]
}

/// The components the stack consists of
pub const COMPONENTS: &[&str] = &["server", "image-server", "frontend"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_inputs_defaults() {
        let inputs = resolve_inputs(&ValuesArgs::default(), &IngressArgs::default(), true, None)
            .unwrap();

        assert_eq!(inputs.storage_class, "local-path");
        assert_eq!(inputs.wait.timeout, Duration::from_secs(300));
        assert_eq!(inputs.values.get_str("ingress.host"), Some(""));
    }

    #[test]
    fn test_resolve_inputs_flag_overrides() {
        let values_args = ValuesArgs {
            storage_class: Some("longhorn".into()),
            set: vec!["server.replicas=2".into()],
            ..Default::default()
        };
        let ingress = IngressArgs {
            ingress_host: Some("vista3d.example.com".into()),
            ingress_tls_secret: Some("vista3d-tls".into()),
            ..Default::default()
        };

        let inputs = resolve_inputs(&values_args, &ingress, true, Some(60)).unwrap();

        assert_eq!(inputs.storage_class, "longhorn");
        assert_eq!(
            inputs.values.get_str("persistence.storageClass"),
            Some("longhorn")
        );
        assert_eq!(inputs.values.get("ingress.enabled").unwrap(), true);
        assert_eq!(
            inputs.values.get_str("ingress.host"),
            Some("vista3d.example.com")
        );
        assert_eq!(inputs.wait.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_workload_names() {
        assert_eq!(
            workload_names("vista3d"),
            vec![
                "vista3d-server",
                "vista3d-image-server",
                "vista3d-frontend"
            ]
        );
    }
}
