//! Handlebars template registry
//!
//! The built-in templates are compiled into the binary. An override
//! directory replaces all of them; it must provide every file.

use crate::diagnostics::{GenError, GenResult};
use crate::utils::naming::xml_safe;
use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde::Serialize;
use serde_json::Value as Json;
use std::path::Path;

pub const MAIN: &str = "csharp-main";
pub const CATEGORY: &str = "csharp-category-partial";
pub const API: &str = "csharp-api";
pub const CORE: &str = "csharp-core";
pub const TYPES: &str = "csharp-types";
pub const CLASS: &str = "csharp-class";
pub const ENUM: &str = "csharp-enum";
pub const UNION_RESULT: &str = "csharp-union-result";
#[cfg(feature = "jslib")]
pub const JSLIB: &str = "jslib";

/// Name and built-in source of every template
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (MAIN, include_str!("../../templates/csharp-main.hbs")),
    (CATEGORY, include_str!("../../templates/csharp-category-partial.hbs")),
    (API, include_str!("../../templates/csharp-api.hbs")),
    (CORE, include_str!("../../templates/csharp-core.hbs")),
    (TYPES, include_str!("../../templates/csharp-types.hbs")),
    (CLASS, include_str!("../../templates/csharp-class.hbs")),
    (ENUM, include_str!("../../templates/csharp-enum.hbs")),
    (UNION_RESULT, include_str!("../../templates/csharp-union-result.hbs")),
    #[cfg(feature = "jslib")]
    (JSLIB, include_str!("../../templates/jslib.hbs")),
];

fn truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Json::String(s) => !s.is_empty(),
        Json::Array(a) => !a.is_empty(),
        Json::Object(_) => true,
    }
}

handlebars_helper!(eq: |a: Json, b: Json| a == b);
handlebars_helper!(or: |*args| args.iter().any(|v| truthy(v)));
handlebars_helper!(xml_safe_helper: |text: str| xml_safe(text));
handlebars_helper!(is_array: |type_name: str| type_name.ends_with("[]"));
handlebars_helper!(array_element_type: |type_name: str| {
    type_name.strip_suffix("[]").unwrap_or(type_name).to_string()
});
handlebars_helper!(is_nullable: |type_name: str| type_name.ends_with('?'));

/// Compiled templates plus helpers
pub struct TemplateSet {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateSet")
            .field("templates", &self.registry.get_templates().len())
            .finish()
    }
}

impl TemplateSet {
    /// Built-in templates
    pub fn builtin() -> GenResult<Self> {
        let mut set = Self::empty();
        for (name, source) in BUILTIN_TEMPLATES {
            set.register(name, source)?;
        }
        Ok(set)
    }

    /// Templates read from `dir/<name>.hbs`
    pub fn from_dir(dir: &Path) -> GenResult<Self> {
        if !dir.is_dir() {
            return Err(GenError::InvalidPath(format!(
                "template directory does not exist: {}",
                dir.display()
            )));
        }
        let mut set = Self::empty();
        for (name, _) in BUILTIN_TEMPLATES {
            let path = dir.join(format!("{}.hbs", name));
            if !path.is_file() {
                return Err(GenError::TemplateNotFound(path));
            }
            let source = std::fs::read_to_string(&path)?;
            set.register(name, &source)?;
        }
        tracing::debug!(dir = %dir.display(), "loaded template overrides");
        Ok(set)
    }

    /// Built-ins, or the override directory when one is given
    pub fn load(override_dir: Option<&Path>) -> GenResult<Self> {
        match override_dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::builtin(),
        }
    }

    fn empty() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(no_escape);
        registry.register_helper("eq", Box::new(eq));
        registry.register_helper("or", Box::new(or));
        registry.register_helper("xmlSafe", Box::new(xml_safe_helper));
        registry.register_helper("isArray", Box::new(is_array));
        registry.register_helper("arrayElementType", Box::new(array_element_type));
        registry.register_helper("isNullable", Box::new(is_nullable));
        Self { registry }
    }

    fn register(&mut self, name: &str, source: &str) -> GenResult<()> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| GenError::Template(format!("{}: {}", name, e)))
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> GenResult<String> {
        self.registry
            .render(name, data)
            .map_err(|e| GenError::render(name, e))
    }
}
