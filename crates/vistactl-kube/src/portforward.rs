//! Port-forward supervision
//!
//! Wraps `kubectl port-forward` in a supervised child process: a tracking
//! file records the child PID while the forward is up, Ctrl-C terminates
//! the child, and the tracking file is removed on every exit path so no
//! orphaned forwards are left behind.

use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{KubeError, Result};

/// A port-forward target
#[derive(Debug, Clone)]
pub struct PortForward {
    /// Credential file to hand to kubectl
    pub kubeconfig: PathBuf,

    /// Namespace of the target
    pub namespace: String,

    /// kubectl target, e.g. `svc/vista3d-frontend`
    pub target: String,

    pub local_port: u16,
    pub remote_port: u16,
}

/// Location of the PID tracking file for a local port
pub fn pid_file_path(local_port: u16) -> PathBuf {
    std::env::temp_dir().join(format!("vistactl-port-forward-{}.pid", local_port))
}

impl PortForward {
    /// The kubectl invocation this forward runs
    pub fn command_line(&self) -> Vec<String> {
        vec![
            "kubectl".to_string(),
            "--kubeconfig".to_string(),
            self.kubeconfig.display().to_string(),
            "-n".to_string(),
            self.namespace.clone(),
            "port-forward".to_string(),
            self.target.clone(),
            format!("{}:{}", self.local_port, self.remote_port),
        ]
    }

    /// Run the forward until Ctrl-C or child exit
    pub async fn run(&self) -> Result<()> {
        let args = self.command_line();

        let mut child = Command::new(&args[0])
            .args(&args[1..])
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    KubeError::MissingBinary {
                        binary: "kubectl".into(),
                        hint: "install kubectl or add it to PATH".into(),
                    }
                } else {
                    KubeError::Io(e)
                }
            })?;

        let pid_file = pid_file_path(self.local_port);
        if let Some(pid) = child.id() {
            std::fs::write(&pid_file, pid.to_string())?;
            debug!(pid, pid_file = %pid_file.display(), "port-forward started");
        }

        let result = tokio::select! {
            status = child.wait() => {
                let status = status?;
                if status.success() {
                    Ok(())
                } else {
                    Err(KubeError::CommandFailed {
                        command: "kubectl port-forward".into(),
                        status: status
                            .code()
                            .map(|c| c.to_string())
                            .unwrap_or_else(|| "signal".into()),
                        stderr: "port-forward exited unexpectedly".into(),
                    })
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupt received, stopping port-forward");
                let _ = child.kill().await;
                Ok(())
            }
        };

        // tracking file must not outlive the forward
        let _ = std::fs::remove_file(&pid_file);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let forward = PortForward {
            kubeconfig: PathBuf::from("/home/op/.kube/vista3d.yaml"),
            namespace: "vista3d".into(),
            target: "svc/vista3d-frontend".into(),
            local_port: 8501,
            remote_port: 8501,
        };

        let args = forward.command_line();
        assert_eq!(args[0], "kubectl");
        assert!(args.contains(&"port-forward".to_string()));
        assert!(args.contains(&"svc/vista3d-frontend".to_string()));
        assert!(args.contains(&"8501:8501".to_string()));
    }

    #[test]
    fn test_pid_file_path_per_port() {
        assert_ne!(pid_file_path(8501), pid_file_path(8000));
        assert!(
            pid_file_path(8501)
                .to_string_lossy()
                .contains("vistactl-port-forward-8501")
        );
    }
}
