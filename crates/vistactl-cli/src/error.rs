//! CLI error types with exit code handling
//!
//! Every fatal condition funnels through `CliError` so the binary can map
//! error families onto stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Missing or invalid input values / prerequisites
    #[error("{message}")]
    #[diagnostic(code(vistactl::cli::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Manifest rendering failed
    #[error("{message}")]
    #[diagnostic(code(vistactl::cli::template))]
    Template { message: String },

    /// Cluster resolution, apply, or rollout failure
    #[error("{message}")]
    #[diagnostic(code(vistactl::cli::cluster))]
    Cluster {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(vistactl::cli::io))]
    Io { message: String },

    /// User declined an interactive confirmation
    #[error("aborted by user")]
    #[diagnostic(code(vistactl::cli::aborted))]
    Aborted,

    /// Anything else
    #[error("{message}")]
    #[diagnostic(code(vistactl::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config { .. } => exit_codes::CONFIG_ERROR,
            CliError::Template { .. } => exit_codes::TEMPLATE_ERROR,
            CliError::Cluster { .. } => exit_codes::CLUSTER_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Aborted => exit_codes::ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a configuration error with help text
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a cluster error
    pub fn cluster(message: impl Into<String>) -> Self {
        Self::Cluster {
            message: message.into(),
            help: None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<vistactl_core::CoreError> for CliError {
    fn from(err: vistactl_core::CoreError) -> Self {
        match err {
            vistactl_core::CoreError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
            other => CliError::config(other.to_string()),
        }
    }
}

impl From<vistactl_engine::EngineError> for CliError {
    fn from(err: vistactl_engine::EngineError) -> Self {
        CliError::Template {
            message: err.to_string(),
        }
    }
}

impl From<vistactl_kube::KubeError> for CliError {
    fn from(err: vistactl_kube::KubeError) -> Self {
        use vistactl_kube::KubeError;
        match err {
            KubeError::MissingBinary { .. } => CliError::config(err.to_string()),
            KubeError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
            other => CliError::cluster(other.to_string()),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
