//! vistactl Kube - cluster plumbing for the Vista3D deployer
//!
//! This crate provides:
//! - **Rancher CLI wrapper**: login, exact-match cluster resolution, and
//!   kubeconfig retrieval through the `rancher` binary
//! - **Applier**: server-side apply / delete of rendered manifests
//! - **Storage health**: the three-signal provisioner decision and the
//!   embedded local-path-provisioner install manifest
//! - **Rollout waiting**: bounded polling of Deployment readiness
//! - **Diagnostics**: a best-effort, read-only check battery
//! - **Port-forward supervision**: tracked `kubectl port-forward` children

pub mod apply;
pub mod client;
pub mod diag;
pub mod error;
pub mod namespace;
pub mod portforward;
pub mod pvc;
pub mod rancher;
pub mod rollout;
pub mod secrets;
pub mod storage;

pub use apply::{Applier, OperationSummary, parse_objects, split_documents};
pub use client::ClusterClient;
pub use diag::{CheckOutcome, DiagReport, Diagnostics};
pub use error::{KubeError, Result};
pub use namespace::ensure_namespace;
pub use portforward::{PortForward, pid_file_path};
pub use pvc::{ClaimInfo, delete_claims, list_claims};
pub use rancher::{ClusterEntry, RancherCli, parse_cluster_list, resolve_cluster, write_kubeconfig};
pub use rollout::{Readiness, readiness, wait_for_deployments};
pub use secrets::{
    dockerconfigjson, ngc_secret_data, recreate_opaque_secret, recreate_registry_secret,
};
pub use storage::{
    PROVISIONER_CONFIGMAP, PROVISIONER_DEPLOYMENT, PROVISIONER_MANIFEST, PROVISIONER_NAMESPACE,
    StorageSignals, StorageStatus,
};
