//! vistactl - deploy the Vista3D medical-imaging stack onto Kubernetes

use clap::{Parser, Subcommand};
use console::style;
use miette::Diagnostic;
use std::path::PathBuf;

use vistactl_core::{DEFAULT_STORAGE_CLASS, DeployConfig, WaitConfig};

mod commands;
mod display;
mod error;
mod exit_codes;
mod prompt;

use commands::{IngressArgs, RancherArgs, TargetArgs, ValuesArgs};
use error::Result;

/// Default path the rendered manifest is written to
const DEFAULT_OUTPUT: &str = "vista3d-rendered.yaml";

#[derive(Parser)]
#[command(name = "vistactl")]
#[command(author = "vistactl contributors")]
#[command(version)]
#[command(about = "Deploy the Vista3D medical-imaging stack onto Kubernetes", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Prepare the cluster environment (credentials, namespace, storage, secrets)
    Prepare {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        rancher: RancherArgs,

        /// Storage class for the application's claims
        #[arg(long, env = "VISTACTL_STORAGE_CLASS", default_value = DEFAULT_STORAGE_CLASS)]
        storage_class: String,

        /// Reinstall the storage provisioner even when it looks healthy
        #[arg(long)]
        force_storage_install: bool,

        /// NGC API key
        #[arg(long, env = "NGC_API_KEY", hide_env_values = true)]
        ngc_key: Option<String>,

        /// File containing the NGC API key
        #[arg(long, env = "VISTACTL_NGC_KEY_FILE")]
        ngc_key_file: Option<PathBuf>,

        /// NGC organization ID
        #[arg(long, env = "NGC_ORG_ID")]
        ngc_org: Option<String>,

        /// Image registry host for the pull secret
        #[arg(long, env = "VISTACTL_REGISTRY_SERVER", default_value = "nvcr.io")]
        registry_server: String,

        /// Registry username
        #[arg(long, env = "VISTACTL_REGISTRY_USERNAME", default_value = "$oauthtoken")]
        registry_username: String,

        /// Registry password (defaults to the NGC API key)
        #[arg(long, env = "VISTACTL_REGISTRY_PASSWORD", hide_env_values = true)]
        registry_password: Option<String>,

        /// Registry account email
        #[arg(long, env = "VISTACTL_REGISTRY_EMAIL")]
        registry_email: Option<String>,

        /// Never prompt; missing required values become fatal
        #[arg(long, env = "VISTACTL_NON_INTERACTIVE")]
        non_interactive: bool,

        /// Print the would-be operations without executing them
        #[arg(long)]
        dry_run: bool,

        /// Rollout wait timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Render the deployment manifest locally
    Render {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        values: ValuesArgs,

        #[command(flatten)]
        ingress: IngressArgs,

        /// Output path for the rendered manifest ("-" for stdout)
        #[arg(short, long, env = "VISTACTL_OUTPUT", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Persist the merged values to this path
        #[arg(long)]
        show_values: Option<PathBuf>,

        /// Never prompt; missing optional values disable their feature
        #[arg(long, env = "VISTACTL_NON_INTERACTIVE")]
        non_interactive: bool,

        /// Print what would be rendered without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Apply the rendered manifest to the cluster
    Deploy {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        values: ValuesArgs,

        #[command(flatten)]
        ingress: IngressArgs,

        /// Output path for the rendered manifest
        #[arg(short, long, env = "VISTACTL_OUTPUT", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Persist the merged values to this path
        #[arg(long)]
        show_values: Option<PathBuf>,

        /// Keep existing persistent volume claims
        #[arg(long, env = "VISTACTL_PRESERVE_PVCS")]
        preserve_pvcs: bool,

        /// Stop after writing the rendered manifest
        #[arg(long)]
        render_only: bool,

        /// Print the would-be operations without executing them
        #[arg(long)]
        dry_run: bool,

        /// Wait for workload rollouts after apply
        #[arg(long)]
        wait: bool,

        /// Rollout wait timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Never prompt; missing optional values disable their feature
        #[arg(long, env = "VISTACTL_NON_INTERACTIVE")]
        non_interactive: bool,
    },

    /// Prepare, render, and deploy in one run
    Bootstrap {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        rancher: RancherArgs,

        #[command(flatten)]
        values: ValuesArgs,

        #[command(flatten)]
        ingress: IngressArgs,

        /// Reinstall the storage provisioner even when it looks healthy
        #[arg(long)]
        force_storage_install: bool,

        /// NGC API key
        #[arg(long, env = "NGC_API_KEY", hide_env_values = true)]
        ngc_key: Option<String>,

        /// File containing the NGC API key
        #[arg(long, env = "VISTACTL_NGC_KEY_FILE")]
        ngc_key_file: Option<PathBuf>,

        /// NGC organization ID
        #[arg(long, env = "NGC_ORG_ID")]
        ngc_org: Option<String>,

        /// Image registry host for the pull secret
        #[arg(long, env = "VISTACTL_REGISTRY_SERVER", default_value = "nvcr.io")]
        registry_server: String,

        /// Registry username
        #[arg(long, env = "VISTACTL_REGISTRY_USERNAME", default_value = "$oauthtoken")]
        registry_username: String,

        /// Registry password (defaults to the NGC API key)
        #[arg(long, env = "VISTACTL_REGISTRY_PASSWORD", hide_env_values = true)]
        registry_password: Option<String>,

        /// Registry account email
        #[arg(long, env = "VISTACTL_REGISTRY_EMAIL")]
        registry_email: Option<String>,

        /// Output path for the rendered manifest
        #[arg(short, long, env = "VISTACTL_OUTPUT", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Persist the merged values to this path
        #[arg(long)]
        show_values: Option<PathBuf>,

        /// Keep existing persistent volume claims
        #[arg(long, env = "VISTACTL_PRESERVE_PVCS")]
        preserve_pvcs: bool,

        /// Stop after writing the rendered manifest
        #[arg(long)]
        render_only: bool,

        /// Print the would-be operations without executing them
        #[arg(long)]
        dry_run: bool,

        /// Wait for workload rollouts after apply
        #[arg(long)]
        wait: bool,

        /// Rollout wait timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Never prompt; missing required values become fatal
        #[arg(long, env = "VISTACTL_NON_INTERACTIVE")]
        non_interactive: bool,
    },

    /// Show a read-only status report for the release
    Status {
        #[command(flatten)]
        target: TargetArgs,

        /// Storage class the claims are expected to be bound to
        #[arg(long, env = "VISTACTL_STORAGE_CLASS", default_value = DEFAULT_STORAGE_CLASS)]
        storage_class: String,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Collect an extended troubleshooting report
    Diag {
        #[command(flatten)]
        target: TargetArgs,

        /// Storage class the claims are expected to be bound to
        #[arg(long, env = "VISTACTL_STORAGE_CLASS", default_value = DEFAULT_STORAGE_CLASS)]
        storage_class: String,

        /// Log lines to tail per component
        #[arg(long, default_value_t = 50)]
        log_lines: i64,

        /// Component(s) to tail logs for (default: all)
        #[arg(long = "component")]
        components: Vec<String>,

        /// Extra HTTP health endpoints to probe
        #[arg(long = "probe")]
        probes: Vec<String>,
    },

    /// Forward a local port to a component (blocks until Ctrl-C)
    PortForward {
        #[command(flatten)]
        target: TargetArgs,

        /// Component to forward to
        #[arg(long, value_enum, default_value = "frontend")]
        component: commands::port_forward::Component,

        /// Local port (defaults to the component port)
        #[arg(long)]
        local_port: Option<u16>,

        /// Remote service port (defaults to the component port)
        #[arg(long)]
        remote_port: Option<u16>,
    },

    /// Delete the deployed stack
    Teardown {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        values: ValuesArgs,

        #[command(flatten)]
        ingress: IngressArgs,

        /// Also delete the persistent volume claims
        #[arg(long)]
        delete_pvcs: bool,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,

        /// Never prompt (requires --yes)
        #[arg(long, env = "VISTACTL_NON_INTERACTIVE")]
        non_interactive: bool,

        /// Print the would-be operations without executing them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        if let Some(help) = e.help() {
            eprintln!("  {} {}", style("hint:").cyan(), help);
        }
        std::process::exit(e.exit_code());
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "vistactl=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Wait settings for commands that do not go through the values layers
fn wait_config_with(timeout: Option<u64>) -> WaitConfig {
    let mut wait = WaitConfig::default();
    if let Some(secs) = timeout {
        wait.timeout = std::time::Duration::from_secs(secs);
    }
    wait
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Prepare {
            target,
            rancher,
            storage_class,
            force_storage_install,
            ngc_key,
            ngc_key_file,
            ngc_org,
            registry_server,
            registry_username,
            registry_password,
            registry_email,
            non_interactive,
            dry_run,
            timeout,
        } => {
            let config = DeployConfig {
                release: target.release.clone(),
                namespace: target.namespace.clone(),
                kubeconfig: target.kubeconfig_path(),
                rancher: rancher.to_config()?,
                storage_class,
                force_storage_install,
                refresh_kubeconfig: rancher.refresh_kubeconfig,
                preserve_pvcs: false,
                non_interactive,
                dry_run,
                wait: false,
                wait_config: wait_config_with(timeout),
            };
            config.validate()?;

            let creds = commands::prepare::CredentialArgs {
                ngc_key,
                ngc_key_file,
                ngc_org,
                registry_server,
                registry_username,
                registry_password,
                registry_email,
            };
            commands::prepare::run(&config, &creds).await
        }

        Commands::Render {
            target,
            values,
            ingress,
            output,
            show_values,
            non_interactive,
            dry_run,
        } => {
            let inputs = commands::resolve_inputs(&values, &ingress, non_interactive, None)?;
            let opts = commands::render::RenderOptions {
                release: target.release,
                namespace: target.namespace,
                output,
                show_values_path: show_values,
                dry_run,
            };
            commands::render::run(&inputs, &opts)
        }

        Commands::Deploy {
            target,
            values,
            ingress,
            output,
            show_values,
            preserve_pvcs,
            render_only,
            dry_run,
            wait,
            timeout,
            non_interactive,
        } => {
            let inputs = commands::resolve_inputs(&values, &ingress, non_interactive, timeout)?;
            let config = DeployConfig {
                release: target.release.clone(),
                namespace: target.namespace.clone(),
                kubeconfig: target.kubeconfig_path(),
                rancher: None,
                storage_class: inputs.storage_class.clone(),
                force_storage_install: false,
                refresh_kubeconfig: false,
                preserve_pvcs,
                non_interactive,
                dry_run,
                wait,
                wait_config: inputs.wait.clone(),
            };
            config.validate()?;

            let opts = commands::deploy::DeployOptions {
                output,
                show_values_path: show_values,
                render_only,
            };
            commands::deploy::run(&config, &inputs, &opts).await
        }

        Commands::Bootstrap {
            target,
            rancher,
            values,
            ingress,
            force_storage_install,
            ngc_key,
            ngc_key_file,
            ngc_org,
            registry_server,
            registry_username,
            registry_password,
            registry_email,
            output,
            show_values,
            preserve_pvcs,
            render_only,
            dry_run,
            wait,
            timeout,
            non_interactive,
        } => {
            let inputs = commands::resolve_inputs(&values, &ingress, non_interactive, timeout)?;
            let config = DeployConfig {
                release: target.release.clone(),
                namespace: target.namespace.clone(),
                kubeconfig: target.kubeconfig_path(),
                rancher: rancher.to_config()?,
                storage_class: inputs.storage_class.clone(),
                force_storage_install,
                refresh_kubeconfig: rancher.refresh_kubeconfig,
                preserve_pvcs,
                non_interactive,
                dry_run,
                wait,
                wait_config: inputs.wait.clone(),
            };
            config.validate()?;

            let creds = commands::prepare::CredentialArgs {
                ngc_key,
                ngc_key_file,
                ngc_org,
                registry_server,
                registry_username,
                registry_password,
                registry_email,
            };
            let deploy_opts = commands::deploy::DeployOptions {
                output,
                show_values_path: show_values,
                render_only,
            };
            commands::bootstrap::run(&config, &inputs, &creds, &deploy_opts).await
        }

        Commands::Status {
            target,
            storage_class,
            json,
        } => commands::status::run(&target, &storage_class, json).await,

        Commands::Diag {
            target,
            storage_class,
            log_lines,
            components,
            probes,
        } => {
            let opts = commands::diag::DiagOptions {
                storage_class,
                log_lines,
                components,
                probes,
            };
            commands::diag::run(&target, &opts).await
        }

        Commands::PortForward {
            target,
            component,
            local_port,
            remote_port,
        } => commands::port_forward::run(&target, component, local_port, remote_port).await,

        Commands::Teardown {
            target,
            values,
            ingress,
            delete_pvcs,
            yes,
            non_interactive,
            dry_run,
        } => {
            // teardown never prompts for render inputs
            let inputs = commands::resolve_inputs(&values, &ingress, true, None)?;
            let config = DeployConfig {
                release: target.release.clone(),
                namespace: target.namespace.clone(),
                kubeconfig: target.kubeconfig_path(),
                rancher: None,
                storage_class: inputs.storage_class.clone(),
                force_storage_install: false,
                refresh_kubeconfig: false,
                preserve_pvcs: !delete_pvcs,
                non_interactive,
                dry_run,
                wait: false,
                wait_config: inputs.wait.clone(),
            };
            config.validate()?;

            let opts = commands::teardown::TeardownOptions { delete_pvcs, yes };
            commands::teardown::run(&config, &inputs, &opts).await
        }
    }
}
