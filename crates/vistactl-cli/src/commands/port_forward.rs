//! Port-forward command - supervised access to one component

use clap::ValueEnum;

use vistactl_kube::PortForward;

use super::TargetArgs;
use crate::display;
use crate::error::Result;

/// The stack component to forward to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Component {
    Server,
    ImageServer,
    Frontend,
}

impl Component {
    /// Service name suffix for this component
    pub fn service_suffix(self) -> &'static str {
        match self {
            Component::Server => "server",
            Component::ImageServer => "image-server",
            Component::Frontend => "frontend",
        }
    }

    /// The port the component's service listens on
    pub fn default_port(self) -> u16 {
        match self {
            Component::Server => 8000,
            Component::ImageServer => 8888,
            Component::Frontend => 8501,
        }
    }
}

/// Run the port-forward command; blocks until Ctrl-C
pub async fn run(
    target: &TargetArgs,
    component: Component,
    local_port: Option<u16>,
    remote_port: Option<u16>,
) -> Result<()> {
    let remote = remote_port.unwrap_or_else(|| component.default_port());
    let local = local_port.unwrap_or(remote);

    let forward = PortForward {
        kubeconfig: target.kubeconfig_path(),
        namespace: target.namespace.clone(),
        target: format!("svc/{}-{}", target.release, component.service_suffix()),
        local_port: local,
        remote_port: remote,
    };

    display::step(&format!(
        "forwarding localhost:{} -> {} (Ctrl-C to stop)",
        local, forward.target
    ));
    if component == Component::Frontend {
        println!("  open http://localhost:{} in your browser", local);
    }

    forward.run().await?;
    display::done("port-forward stopped");
    Ok(())
}
