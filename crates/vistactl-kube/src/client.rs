//! Cluster client construction
//!
//! All API access goes through a client built from the explicit credential
//! file the preparer wrote; the ambient `KUBECONFIG`/in-cluster lookup chain
//! is deliberately not used.

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{
    ConfigMap, Event, Namespace, PersistentVolumeClaim, Pod, Secret, Service,
};
use k8s_openapi::api::storage::v1::StorageClass;
use kube::Api;
use kube::config::{KubeConfigOptions, Kubeconfig};
use std::path::Path;

use crate::error::{KubeError, Result};

/// Kubernetes client scoped to the deployment namespace
#[derive(Clone)]
pub struct ClusterClient {
    client: kube::Client,
    namespace: String,
}

impl ClusterClient {
    /// Build a client from a kubeconfig file path
    pub async fn from_kubeconfig(path: &Path, namespace: &str) -> Result<Self> {
        let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
            KubeError::Kubeconfig(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| KubeError::Kubeconfig(e.to_string()))?;

        let client = kube::Client::try_from(config)?;

        Ok(Self {
            client,
            namespace: namespace.to_string(),
        })
    }

    /// The underlying kube client
    pub fn kube_client(&self) -> &kube::Client {
        &self.client
    }

    /// The deployment namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // ========== Typed API accessors ==========

    pub fn namespaces(&self) -> Api<Namespace> {
        Api::all(self.client.clone())
    }

    pub fn storage_classes(&self) -> Api<StorageClass> {
        Api::all(self.client.clone())
    }

    pub fn deployments(&self) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    pub fn deployments_in(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }

    pub fn pods(&self) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    pub fn services(&self) -> Api<Service> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    pub fn secrets(&self) -> Api<Secret> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    pub fn claims(&self) -> Api<PersistentVolumeClaim> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    pub fn events(&self) -> Api<Event> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    pub fn config_maps_in(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }
}
