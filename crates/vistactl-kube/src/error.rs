//! Error types for vistactl-kube

use thiserror::Error;

/// Result type for vistactl-kube operations
pub type Result<T> = std::result::Result<T, KubeError>;

/// Errors that can occur during cluster operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KubeError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Required external binary is not installed
    #[error("required binary '{binary}' not found on PATH\nHint: {hint}")]
    MissingBinary { binary: String, hint: String },

    /// A wrapped external command exited non-zero
    #[error("'{command}' failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Cluster name did not match any known cluster
    #[error("no cluster named '{name}' found{}", .suggestion.as_ref().map(|s| format!("\nHint: did you mean '{}'?", s)).unwrap_or_default())]
    ClusterNotFound {
        name: String,
        suggestion: Option<String>,
    },

    /// Cluster name matched more than one cluster
    #[error("cluster name '{name}' is ambiguous: matches {}", .matches.join(", "))]
    ClusterAmbiguous { name: String, matches: Vec<String> },

    /// Credential file problems
    #[error("kubeconfig error: {0}")]
    Kubeconfig(String),

    /// Invalid endpoint configuration
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Invalid manifest
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Bounded wait expired
    #[error("timed out after {after} waiting for {what}")]
    Timeout { what: String, after: String },

    /// HTTP probe failure
    #[error("HTTP probe failed: {0}")]
    Probe(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for KubeError {
    fn from(e: serde_json::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for KubeError {
    fn from(e: serde_yaml::Error) -> Self {
        KubeError::Serialization(e.to_string())
    }
}

impl KubeError {
    /// Check if this is a Kubernetes 404 Not Found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, KubeError::Api(kube::Error::Api(resp)) if resp.code == 404)
    }

    /// Check if this is a conflict error (409)
    pub fn is_conflict(&self) -> bool {
        matches!(self, KubeError::Api(kube::Error::Api(resp)) if resp.code == 409)
    }
}
