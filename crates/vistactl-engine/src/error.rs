//! Engine error types

use miette::Diagnostic;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors from manifest rendering
#[derive(Error, Debug, Diagnostic)]
pub enum EngineError {
    /// A template failed to render
    #[error("Template '{template}' failed to render: {message}")]
    #[diagnostic(code(vistactl::engine::render))]
    Render {
        template: String,
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The render context could not be serialized
    #[error("Invalid render context: {0}")]
    #[diagnostic(code(vistactl::engine::context))]
    Context(String),
}

impl EngineError {
    /// Build a render error from a minijinja error, keeping its detail chain
    pub fn from_minijinja(err: minijinja::Error, template: &str) -> Self {
        let mut message = err.to_string();

        // minijinja nests the root cause; surface it
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(&format!("\ncaused by: {}", cause));
            source = cause.source();
        }

        let help = match err.kind() {
            minijinja::ErrorKind::UndefinedError => Some(
                "the template references a value not present in the merged values; \
                 check your --values files and --set overrides"
                    .to_string(),
            ),
            _ => None,
        };

        Self::Render {
            template: template.to_string(),
            message,
            help,
        }
    }
}
