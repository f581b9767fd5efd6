//! vistactl Core - Configuration and bundle types for the Vista3D deployer
//!
//! This crate provides the foundational types used throughout vistactl:
//! - `DeployConfig`: The immutable per-run configuration
//! - `Values`: Layered configuration values with deep merge support
//! - `Bundle`: The deploy bundle (templates + defaults), builtin or on-disk
//! - `RenderContext`: Template rendering context

pub mod builtin;
pub mod bundle;
pub mod config;
pub mod context;
pub mod error;
pub mod values;

pub use bundle::{Bundle, BundleManifest, BundleMetadata, TemplateFile};
pub use config::{
    DEFAULT_NAMESPACE, DEFAULT_RELEASE, DEFAULT_STORAGE_CLASS, DeployConfig, NgcCredentials,
    RancherConfig, RegistryCredentials, WaitConfig, default_kubeconfig_path,
};
pub use context::{ReleaseInfo, RenderContext};
pub use error::CoreError;
pub use values::{MergedValuesFile, Values, parse_set_string_values, parse_set_values};
