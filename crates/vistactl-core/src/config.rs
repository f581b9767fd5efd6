//! Deployment configuration
//!
//! Everything the orchestration stages need is resolved once, up front, into
//! an immutable [`DeployConfig`] that is passed explicitly to every stage.
//! Environment-variable overrides are handled at the CLI layer (clap `env`),
//! so nothing below the binary reads process state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Namespace the Vista3D stack deploys into unless overridden
pub const DEFAULT_NAMESPACE: &str = "vista3d";

/// Release name used for resource naming unless overridden
pub const DEFAULT_RELEASE: &str = "vista3d";

/// The single supported storage provisioner's class name
pub const DEFAULT_STORAGE_CLASS: &str = "local-path";

/// Default bounded wait for workload rollouts
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default poll interval while waiting for rollouts
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_secs(5);

/// Immutable configuration for one orchestration run
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Release name; resource names derive from it
    pub release: String,

    /// Target namespace (created if absent, never deleted)
    pub namespace: String,

    /// Path the cluster credential file is written to and read from
    pub kubeconfig: PathBuf,

    /// Rancher endpoint settings; absent when a kubeconfig already exists
    pub rancher: Option<RancherConfig>,

    /// Storage class the application's claims bind to
    pub storage_class: String,

    /// Reinstall the storage provisioner even when it looks healthy
    pub force_storage_install: bool,

    /// Re-fetch the kubeconfig even when the file already exists
    pub refresh_kubeconfig: bool,

    /// Keep existing persistent volume claims across redeploys
    pub preserve_pvcs: bool,

    /// Never prompt; missing required values become fatal
    pub non_interactive: bool,

    /// Print mutating commands instead of executing them
    pub dry_run: bool,

    /// Wait for workload rollouts after apply
    pub wait: bool,

    /// Rollout wait bounds
    pub wait_config: WaitConfig,
}

impl DeployConfig {
    /// Names of the application's stateful claims
    ///
    /// These are the claims deleted before a redeploy unless preserved; the
    /// claim list and the storage class must stay paired because a bound
    /// claim's storage class is immutable.
    pub fn stateful_claims(&self) -> Vec<String> {
        vec![
            format!("{}-models", self.release),
            format!("{}-output", self.release),
        ]
    }

    /// Name of the Opaque secret holding the NGC API key
    pub fn ngc_secret_name(&self) -> String {
        format!("{}-ngc-key", self.release)
    }

    /// Name of the dockerconfigjson pull secret
    pub fn registry_secret_name(&self) -> String {
        format!("{}-registry", self.release)
    }

    /// Validate cross-field constraints that clap cannot express
    pub fn validate(&self) -> Result<()> {
        if self.release.is_empty() {
            return Err(CoreError::MissingValue {
                field: "release".into(),
            });
        }
        if self.namespace.is_empty() {
            return Err(CoreError::MissingValue {
                field: "namespace".into(),
            });
        }
        if self.storage_class.is_empty() {
            return Err(CoreError::MissingValue {
                field: "storage-class".into(),
            });
        }
        self.wait_config.validate()
    }
}

/// Default location of the credential file: `~/.kube/vista3d.yaml`
pub fn default_kubeconfig_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kube")
        .join("vista3d.yaml")
}

/// Rancher endpoint and cluster selection
#[derive(Debug, Clone)]
pub struct RancherConfig {
    /// Rancher server URL
    pub server: String,

    /// Bearer API token
    pub token: String,

    /// Human-given cluster name, resolved to a cluster ID by exact match
    pub cluster: String,
}

/// Bounded-wait settings, overridable through the values layers
///
/// ```yaml
/// wait:
///   timeout: 5m
///   interval: 5s
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct WaitConfig {
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            interval: DEFAULT_WAIT_INTERVAL,
        }
    }
}

impl WaitConfig {
    /// Reject degenerate bounds; waits are fatal on expiry, so a zero
    /// timeout would make every rollout wait fail immediately.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(CoreError::InvalidConfig {
                message: "wait timeout must be non-zero".into(),
            });
        }
        if self.interval.is_zero() || self.interval > self.timeout {
            return Err(CoreError::InvalidConfig {
                message: "wait interval must be non-zero and not exceed the timeout".into(),
            });
        }
        Ok(())
    }
}

/// Registry credentials for the image pull secret
#[derive(Debug, Clone)]
pub struct RegistryCredentials {
    /// Registry server, e.g. `nvcr.io`
    pub server: String,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

/// NGC credentials consumed by the Vista3D server container
#[derive(Debug, Clone)]
pub struct NgcCredentials {
    pub api_key: String,
    pub org_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeployConfig {
        DeployConfig {
            release: DEFAULT_RELEASE.into(),
            namespace: DEFAULT_NAMESPACE.into(),
            kubeconfig: default_kubeconfig_path(),
            rancher: None,
            storage_class: DEFAULT_STORAGE_CLASS.into(),
            force_storage_install: false,
            refresh_kubeconfig: false,
            preserve_pvcs: false,
            non_interactive: true,
            dry_run: false,
            wait: false,
            wait_config: WaitConfig::default(),
        }
    }

    #[test]
    fn test_stateful_claims_follow_release() {
        let mut cfg = config();
        cfg.release = "imaging".into();
        assert_eq!(cfg.stateful_claims(), vec!["imaging-models", "imaging-output"]);
        assert_eq!(cfg.ngc_secret_name(), "imaging-ngc-key");
        assert_eq!(cfg.registry_secret_name(), "imaging-registry");
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut cfg = config();
        cfg.namespace = String::new();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_wait_config_bounds() {
        let ok = WaitConfig::default();
        assert!(ok.validate().is_ok());

        let zero = WaitConfig {
            timeout: Duration::ZERO,
            ..WaitConfig::default()
        };
        assert!(zero.validate().is_err());

        let inverted = WaitConfig {
            timeout: Duration::from_secs(1),
            interval: Duration::from_secs(10),
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_wait_config_from_yaml() {
        let wait: WaitConfig = serde_yaml::from_str("timeout: 2m\ninterval: 10s").unwrap();
        assert_eq!(wait.timeout, Duration::from_secs(120));
        assert_eq!(wait.interval, Duration::from_secs(10));
    }
}
