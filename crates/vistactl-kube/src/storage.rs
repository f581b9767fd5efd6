//! Storage provisioner health and installation
//!
//! The stack's claims bind to the `local-path` storage class served by
//! Rancher's local-path-provisioner, the one provisioner this tooling knows
//! how to install. Health is decided from three observed signals; the
//! provisioner is reinstalled only when a signal reports unhealthy state, so
//! repeated runs leave a working provisioner untouched while partial
//! installs self-heal.

use tracing::debug;

use crate::client::ClusterClient;
use crate::error::Result;

/// Namespace the provisioner runs in
pub const PROVISIONER_NAMESPACE: &str = "local-path-storage";

/// Provisioner workload name
pub const PROVISIONER_DEPLOYMENT: &str = "local-path-provisioner";

/// Configuration object the provisioner requires
pub const PROVISIONER_CONFIGMAP: &str = "local-path-config";

/// Installation manifest for the provisioner (upstream local-path-provisioner,
/// pinned)
pub const PROVISIONER_MANIFEST: &str = include_str!("storage/local-path-storage.yaml");

/// Observed state of the storage provisioner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageSignals {
    /// The storage class object exists
    pub class_exists: bool,

    /// Ready replicas of the provisioner deployment
    pub available_replicas: i32,

    /// The provisioner's ConfigMap exists
    pub config_present: bool,
}

/// Outcome of the storage health decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageStatus {
    Healthy,
    NeedsReinstall(String),
}

impl StorageStatus {
    /// Decide health from the observed signals
    ///
    /// Any single unhealthy signal triggers a reinstall; the reason names
    /// the first failing signal for the operator.
    pub fn evaluate(signals: StorageSignals) -> Self {
        if !signals.class_exists {
            return StorageStatus::NeedsReinstall("storage class missing".into());
        }
        if signals.available_replicas < 1 {
            return StorageStatus::NeedsReinstall(format!(
                "provisioner deployment has {} available replicas",
                signals.available_replicas
            ));
        }
        if !signals.config_present {
            return StorageStatus::NeedsReinstall("provisioner ConfigMap missing".into());
        }
        StorageStatus::Healthy
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, StorageStatus::Healthy)
    }
}

/// Read the three health signals from the cluster
pub async fn observe(client: &ClusterClient, class_name: &str) -> Result<StorageSignals> {
    let class_exists = client.storage_classes().get_opt(class_name).await?.is_some();

    let available_replicas = client
        .deployments_in(PROVISIONER_NAMESPACE)
        .get_opt(PROVISIONER_DEPLOYMENT)
        .await?
        .and_then(|d| d.status)
        .and_then(|s| s.available_replicas)
        .unwrap_or(0);

    let config_present = client
        .config_maps_in(PROVISIONER_NAMESPACE)
        .get_opt(PROVISIONER_CONFIGMAP)
        .await?
        .is_some();

    let signals = StorageSignals {
        class_exists,
        available_replicas,
        config_present,
    };
    debug!(?signals, class = class_name, "observed storage signals");
    Ok(signals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn healthy() -> StorageSignals {
        StorageSignals {
            class_exists: true,
            available_replicas: 1,
            config_present: true,
        }
    }

    #[test]
    fn test_healthy_signals_skip_reinstall() {
        assert_eq!(StorageStatus::evaluate(healthy()), StorageStatus::Healthy);
    }

    #[test]
    fn test_zero_replicas_triggers_reinstall() {
        let signals = StorageSignals {
            available_replicas: 0,
            ..healthy()
        };
        match StorageStatus::evaluate(signals) {
            StorageStatus::NeedsReinstall(reason) => {
                assert!(reason.contains("0 available replicas"));
            }
            StorageStatus::Healthy => panic!("expected reinstall"),
        }
    }

    #[test]
    fn test_missing_class_triggers_reinstall() {
        let signals = StorageSignals {
            class_exists: false,
            ..healthy()
        };
        assert!(!StorageStatus::evaluate(signals).is_healthy());
    }

    #[test]
    fn test_missing_config_triggers_reinstall() {
        let signals = StorageSignals {
            config_present: false,
            ..healthy()
        };
        assert_eq!(
            StorageStatus::evaluate(signals),
            StorageStatus::NeedsReinstall("provisioner ConfigMap missing".into())
        );
    }

    #[test]
    fn test_manifest_contains_expected_objects() {
        // the embedded manifest must provide every object the signals check
        assert!(PROVISIONER_MANIFEST.contains("kind: StorageClass"));
        assert!(PROVISIONER_MANIFEST.contains(&format!("name: {}", PROVISIONER_DEPLOYMENT)));
        assert!(PROVISIONER_MANIFEST.contains(&format!("name: {}", PROVISIONER_CONFIGMAP)));
        assert!(PROVISIONER_MANIFEST.contains(&format!("name: {}", PROVISIONER_NAMESPACE)));
    }
}
