//! vistactl Engine - renders the deploy bundle into concrete manifests
//!
//! A thin, strict MiniJinja environment with the Kubernetes filters the
//! Vista3D templates use. Rendering is pure: no cluster contact, no
//! filesystem writes.

pub mod engine;
pub mod error;
pub mod filters;

pub use engine::{Engine, EngineBuilder, RenderResult};
pub use error::EngineError;
