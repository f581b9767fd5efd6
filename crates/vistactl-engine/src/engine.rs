//! Template engine based on MiniJinja

use indexmap::IndexMap;
use minijinja::Environment;
use tracing::debug;
use vistactl_core::{Bundle, RenderContext};

use crate::error::{EngineError, Result};
use crate::filters;

/// Result of rendering a bundle
#[derive(Debug)]
pub struct RenderResult {
    /// Rendered manifests by output filename, in bundle order
    pub manifests: IndexMap<String, String>,
}

impl RenderResult {
    /// Concatenate all documents into one multi-doc YAML manifest
    #[must_use]
    pub fn manifest_text(&self) -> String {
        self.manifests
            .values()
            .map(|doc| doc.trim_end())
            .collect::<Vec<_>>()
            .join("\n---\n")
    }

    /// True when a rendered document with the given kind exists
    #[must_use]
    pub fn contains_kind(&self, kind: &str) -> bool {
        let marker = format!("kind: {}", kind);
        self.manifests.values().any(|doc| doc.contains(&marker))
    }
}

/// Template engine builder
pub struct EngineBuilder {
    strict_mode: bool,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self { strict_mode: true }
    }

    /// Set strict mode (fail on undefined variables)
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Build the engine
    pub fn build(self) -> Engine {
        Engine::new(self.strict_mode)
    }
}

/// The template engine
pub struct Engine {
    strict_mode: bool,
}

impl Engine {
    /// Create a new engine with default settings
    pub fn new(strict_mode: bool) -> Self {
        Self { strict_mode }
    }

    /// Create a builder
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Create a configured MiniJinja environment
    fn create_environment(&self) -> Environment<'static> {
        let mut env = Environment::new();

        if self.strict_mode {
            env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);
        } else {
            env.set_undefined_behavior(minijinja::UndefinedBehavior::Lenient);
        }

        env.add_filter("toyaml", filters::toyaml);
        env.add_filter("tojson", filters::tojson);
        env.add_filter("b64encode", filters::b64encode);
        env.add_filter("quote", filters::quote);
        env.add_filter("nindent", filters::nindent);
        env.add_filter("indent", filters::indent);
        env.add_filter("required", filters::required);
        env.add_filter("sha256", filters::sha256sum);
        env.add_filter("trunc", filters::trunc);

        env
    }

    /// Render every template of a bundle against the context
    ///
    /// Templates whose output is whitespace-only are dropped; a disabled
    /// feature renders to nothing instead of producing an empty document.
    pub fn render_bundle(&self, bundle: &Bundle, context: &RenderContext) -> Result<RenderResult> {
        let mut env = self.create_environment();

        for template in &bundle.templates {
            env.add_template_owned(template.name.clone(), template.source.clone())
                .map_err(|e| EngineError::from_minijinja(e, &template.name))?;
        }

        let ctx_value = minijinja::Value::from_serialize(context.to_json());

        let mut manifests = IndexMap::new();
        for template in &bundle.templates {
            let tmpl = env
                .get_template(&template.name)
                .map_err(|e| EngineError::from_minijinja(e, &template.name))?;

            let rendered = tmpl
                .render(&ctx_value)
                .map_err(|e| EngineError::from_minijinja(e, &template.name))?;

            if rendered.trim().is_empty() {
                debug!(template = %template.name, "template rendered empty, skipping");
                continue;
            }

            let output_name = template
                .name
                .strip_suffix(".j2")
                .unwrap_or(&template.name)
                .to_string();
            manifests.insert(output_name, rendered);
        }

        Ok(RenderResult { manifests })
    }

    /// Render a single template string
    pub fn render_string(
        &self,
        template: &str,
        context: &RenderContext,
        template_name: &str,
    ) -> Result<String> {
        let mut env = self.create_environment();
        env.add_template_owned(template_name.to_string(), template.to_string())
            .map_err(|e| EngineError::from_minijinja(e, template_name))?;

        let tmpl = env
            .get_template(template_name)
            .map_err(|e| EngineError::from_minijinja(e, template_name))?;

        tmpl.render(minijinja::Value::from_serialize(context.to_json()))
            .map_err(|e| EngineError::from_minijinja(e, template_name))
    }
}
