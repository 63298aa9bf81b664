//! Template rendering for scaffold.
//! Paths, file contents and rename rules are all rendered through one
//! [`TemplateRenderer`], backed by MiniJinja with a fixed set of string helpers.
use crate::error::{Error, Result};
use cruet::Inflector;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};

/// Trait for template rendering engines.
pub trait TemplateRenderer: Send + Sync {
    /// Renders a template string with the given context.
    ///
    /// # Arguments
    /// * `name` - Name reported in errors, usually the relative file path
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `Result<String>` - Rendered template string
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String>;
}

fn replace_all(value: String, from: String, to: String) -> String {
    value.replace(&from, &to)
}

fn to_lower(value: String) -> String {
    value.to_lowercase()
}

fn to_upper(value: String) -> String {
    value.to_uppercase()
}

// going through the snake form keeps acronym boundaries, `HTTPServer` -> `HttpServer`
fn to_pascal_case(value: String) -> String {
    value.to_snake_case().to_pascal_case()
}

fn to_camel_case(value: String) -> String {
    value.to_snake_case().to_camel_case()
}

fn to_snake_case(value: String) -> String {
    value.to_snake_case()
}

fn to_compressed_case(value: String) -> String {
    value.to_snake_case().replace('_', "")
}

/// MiniJinja-based template rendering engine.
///
/// Every helper is available both as a function, `{{ ToSnakeCase(Input.name) }}`,
/// and as a filter, `{{ Input.name | ToSnakeCase }}`.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a new MiniJinjaRenderer with strict undefined handling and the
    /// scaffold helpers registered.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        // file names like `package.json` must not switch on escaping
        env.set_auto_escape_callback(|_: &str| AutoEscape::None);

        env.add_function("ReplaceAll", replace_all);
        env.add_filter("ReplaceAll", replace_all);
        env.add_function("ToLower", to_lower);
        env.add_filter("ToLower", to_lower);
        env.add_function("ToUpper", to_upper);
        env.add_filter("ToUpper", to_upper);
        env.add_function("ToPascalCase", to_pascal_case);
        env.add_filter("ToPascalCase", to_pascal_case);
        env.add_function("ToCamelCase", to_camel_case);
        env.add_filter("ToCamelCase", to_camel_case);
        env.add_function("ToSnakeCase", to_snake_case);
        env.add_filter("ToSnakeCase", to_snake_case);
        env.add_function("ToCompressedCase", to_compressed_case);
        env.add_filter("ToCompressedCase", to_compressed_case);

        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// Renders a template string using MiniJinja.
    ///
    /// # Errors
    /// * `Error::RenderError` naming `name` if the template fails to parse,
    ///   references an undefined variable or a helper fails
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String> {
        self.env
            .render_named_str(name, template, context)
            .map_err(|source| Error::RenderError {
                path: name.to_string(),
                source,
            })
    }
}
