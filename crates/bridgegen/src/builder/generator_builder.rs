//! GeneratorBuilder - Main API for binding generation
//!
//! Configures and runs a generation from code or from a
//! [`GeneratorConfig`].

use crate::api_parser::{parse_apis, ApiParserOptions};
use crate::collector::{ExternalResolver, NoExternalResolver, SharedModuleResolver, TypeCollector};
use crate::config::GeneratorConfig;
use crate::csharp::{is_type_supported, validate_apis, CSharpGenerator, PreparedApi, TemplateSet};
use crate::diagnostics::{GenError, GenResult, GenerationReport};
use crate::source_set::SourceSet;
use crate::type_defs::parse_type_definitions;
use crate::types::{GeneratedFile, ParsedApi};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Rendered files plus what went into them, nothing written yet
#[derive(Debug)]
pub struct Generation {
    pub apis: Vec<ParsedApi>,
    pub csharp_files: Vec<GeneratedFile>,
    pub jslib_files: Vec<GeneratedFile>,
    pub report: GenerationReport,
}

/// Files written by [`GeneratorBuilder::build`]
#[derive(Debug)]
pub struct BuildOutput {
    pub csharp_files: Vec<PathBuf>,
    pub jslib_files: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub jslib_dir: PathBuf,
    pub report: GenerationReport,
}

impl BuildOutput {
    pub fn new(output_dir: impl Into<PathBuf>, jslib_dir: impl Into<PathBuf>) -> Self {
        Self {
            csharp_files: vec![],
            jslib_files: vec![],
            output_dir: output_dir.into(),
            jslib_dir: jslib_dir.into(),
            report: GenerationReport::new(),
        }
    }

    /// Get all generated files
    pub fn all_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.csharp_files.iter().chain(self.jslib_files.iter())
    }
}

/// Builder for configuring a generation run
///
/// # Example
///
/// ```no_run
/// use bridgegen::GeneratorBuilder;
///
/// GeneratorBuilder::new("node_modules/@apps-in-toss/web-bridge/built")
///     .output_dir("Runtime/SDK")
///     .web_framework_tag("1.4.0")
///     .build()
///     .expect("Failed to generate bindings");
/// ```
#[derive(Debug, Clone)]
pub struct GeneratorBuilder {
    /// Directory (or single file) of `.d.ts` declarations
    pub source_dir: PathBuf,
    /// Directory for the C# files
    pub output_dir: PathBuf,
    /// Directory for the `.jslib` files, `<output_dir>/Plugins` when unset
    pub jslib_dir: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
    /// Second declaration tree for external type lookups
    pub shared_module: Option<PathBuf>,
    pub web_framework_tag: String,
    pub generate_jslib: bool,
    pub scan_namespaces: bool,
    /// Unsupported types abort the run
    pub strict: bool,
    pub excluded_apis: Vec<String>,
    pub category_order: Vec<String>,
    /// API name to category
    pub category_overrides: IndexMap<String, String>,
}

impl GeneratorBuilder {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: PathBuf::from("Generated"),
            jslib_dir: None,
            template_dir: None,
            shared_module: None,
            web_framework_tag: "latest".to_string(),
            generate_jslib: cfg!(feature = "jslib"),
            scan_namespaces: true,
            strict: false,
            excluded_apis: vec![],
            category_order: vec![],
            category_overrides: IndexMap::new(),
        }
    }

    /// Builder seeded from a config file; `source_dir` is required
    pub fn from_config(config: &GeneratorConfig) -> GenResult<Self> {
        let source_dir = config
            .source_dir
            .clone()
            .ok_or_else(|| GenError::config("source_dir is not set"))?;
        let mut builder = Self::new(source_dir);
        if let Some(dir) = &config.output_dir {
            builder.output_dir = dir.clone();
        }
        builder.jslib_dir = config.jslib_dir.clone();
        builder.template_dir = config.template_dir.clone();
        builder.shared_module = config.shared_module.clone();
        if let Some(tag) = &config.web_framework_tag {
            builder.web_framework_tag = tag.clone();
        }
        if let Some(enable) = config.generate_jslib {
            builder.generate_jslib = enable;
        }
        if let Some(enable) = config.scan_namespaces {
            builder.scan_namespaces = enable;
        }
        builder.strict = config.strict.unwrap_or(false);
        builder.excluded_apis = config.excluded_apis.clone();
        builder.category_order = config.category_order.clone();
        builder.category_overrides = config.category_overrides()?;
        Ok(builder)
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    pub fn jslib_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.jslib_dir = Some(path.into());
        self
    }

    pub fn template_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(path.into());
        self
    }

    pub fn shared_module(mut self, path: impl Into<PathBuf>) -> Self {
        self.shared_module = Some(path.into());
        self
    }

    pub fn web_framework_tag(mut self, tag: impl Into<String>) -> Self {
        self.web_framework_tag = tag.into();
        self
    }

    pub fn generate_jslib(mut self, enable: bool) -> Self {
        self.generate_jslib = enable;
        self
    }

    pub fn scan_namespaces(mut self, enable: bool) -> Self {
        self.scan_namespaces = enable;
        self
    }

    pub fn strict(mut self, enable: bool) -> Self {
        self.strict = enable;
        self
    }

    pub fn exclude_api(mut self, name: impl Into<String>) -> Self {
        self.excluded_apis.push(name.into());
        self
    }

    pub fn category_order(mut self, order: Vec<String>) -> Self {
        self.category_order = order;
        self
    }

    /// Put one API in a category regardless of its file
    pub fn category_override(mut self, api: impl Into<String>, category: impl Into<String>) -> Self {
        self.category_overrides.insert(api.into(), category.into());
        self
    }

    fn resolved_jslib_dir(&self) -> PathBuf {
        self.jslib_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join("Plugins"))
    }

    /// Run the pipeline and keep the output in memory
    ///
    /// 1. Load and parse every declaration file
    /// 2. Scan APIs and type definitions
    /// 3. Check type support (fatal in strict mode)
    /// 4. Collect and name every referenced type
    /// 5. Render C# and jslib files
    pub fn generate(&self) -> GenResult<Generation> {
        let mut report = GenerationReport::new();

        // Load failures come back through the scan as FileParse skips
        let sources = SourceSet::load(&self.source_dir)?;
        let scan = parse_apis(
            &sources,
            ApiParserOptions {
                excluded_apis: self.excluded_apis.clone(),
                category_overrides: self.category_overrides.clone(),
                scan_namespaces: self.scan_namespaces,
            },
        );
        for skipped in scan.skipped {
            report.skip(skipped);
        }
        let apis = scan.apis;
        let definitions = parse_type_definitions(&sources);
        tracing::info!(
            files = sources.modules.len(),
            apis = apis.len(),
            definitions = definitions.len(),
            "parsed declarations"
        );

        if self.strict {
            let unsupported: Vec<&str> = apis
                .iter()
                .filter(|api| {
                    !is_type_supported(&api.return_type)
                        || api.parameters.iter().any(|p| !is_type_supported(&p.ty))
                })
                .map(|api| api.name.as_str())
                .collect();
            if !unsupported.is_empty() {
                return Err(GenError::UnsupportedTypes {
                    count: unsupported.len(),
                    apis: unsupported.join(", "),
                });
            }
        }
        report.extend_diagnostics(validate_apis(&apis));

        let shared;
        let resolver: &dyn ExternalResolver = match &self.shared_module {
            Some(path) => {
                shared = SharedModuleResolver::load(path)?;
                &shared
            }
            None => &NoExternalResolver,
        };
        let collection = TypeCollector::collect(&apis, &definitions, resolver);
        report.extend_diagnostics(collection.diagnostics.iter().cloned());

        let templates = TemplateSet::load(self.template_dir.as_deref())?;
        let prepared: Vec<PreparedApi> = apis
            .iter()
            .map(|api| PreparedApi::new(api, &collection))
            .collect();

        let csharp_files = CSharpGenerator::new(&templates)
            .category_order(self.category_order.clone())
            .web_framework_tag(self.web_framework_tag.clone())
            .generate(&prepared, &collection, &definitions)?;
        let jslib_files = self.render_jslib(&templates, &prepared)?;

        report.api_count = apis.len();
        report.type_count = collection.inline_enums.len()
            + collection.union_results.len()
            + collection.types.len()
            + definitions.len();

        Ok(Generation {
            apis,
            csharp_files,
            jslib_files,
            report,
        })
    }

    #[cfg(feature = "jslib")]
    fn render_jslib(
        &self,
        templates: &TemplateSet,
        prepared: &[PreparedApi],
    ) -> GenResult<Vec<GeneratedFile>> {
        if !self.generate_jslib {
            return Ok(vec![]);
        }
        crate::jslib::JslibGenerator::new(templates)
            .category_order(self.category_order.clone())
            .web_framework_tag(self.web_framework_tag.clone())
            .generate(prepared)
    }

    #[cfg(not(feature = "jslib"))]
    fn render_jslib(
        &self,
        _templates: &TemplateSet,
        _prepared: &[PreparedApi],
    ) -> GenResult<Vec<GeneratedFile>> {
        if self.generate_jslib {
            tracing::warn!("built without the jslib feature, skipping .jslib output");
        }
        Ok(vec![])
    }

    /// Run the pipeline and write every file
    pub fn build(self) -> GenResult<BuildOutput> {
        let generation = self.generate()?;
        let mut output = BuildOutput::new(&self.output_dir, self.resolved_jslib_dir());

        output.csharp_files = write_files(&output.output_dir, &generation.csharp_files)?;
        if !generation.jslib_files.is_empty() {
            output.jslib_files = write_files(&output.jslib_dir, &generation.jslib_files)?;
        }
        output.report = generation.report;

        tracing::info!(
            csharp = output.csharp_files.len(),
            jslib = output.jslib_files.len(),
            output = %output.output_dir.display(),
            "generation complete"
        );
        Ok(output)
    }
}

fn write_files(dir: &Path, files: &[GeneratedFile]) -> GenResult<Vec<PathBuf>> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.file_name);
        std::fs::write(&path, &file.content)?;
        tracing::debug!(path = %path.display(), bytes = file.content.len(), "wrote file");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_creation() {
        let builder = GeneratorBuilder::new("bridge");
        assert_eq!(builder.source_dir, PathBuf::from("bridge"));
        assert_eq!(builder.output_dir, PathBuf::from("Generated"));
        assert_eq!(builder.resolved_jslib_dir(), PathBuf::from("Generated/Plugins"));
        assert!(builder.scan_namespaces);
        assert!(!builder.strict);
    }

    #[test]
    fn test_builder_configuration() {
        let builder = GeneratorBuilder::new("bridge")
            .output_dir("Runtime/SDK")
            .jslib_dir("Plugins")
            .web_framework_tag("1.4.0")
            .strict(true)
            .exclude_api("internalApi")
            .category_override("getLocation", "Device");

        assert_eq!(builder.resolved_jslib_dir(), PathBuf::from("Plugins"));
        assert_eq!(builder.web_framework_tag, "1.4.0");
        assert!(builder.strict);
        assert_eq!(builder.excluded_apis, vec!["internalApi"]);
        assert_eq!(
            builder.category_overrides.get("getLocation").map(String::as_str),
            Some("Device")
        );
    }

    #[test]
    fn test_from_config() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            source_dir = "bridge"
            generate_jslib = false
            category_order = ["Device"]

            [categories]
            Device = ["getLocation"]
            "#,
        )
        .unwrap();
        let builder = GeneratorBuilder::from_config(&config).unwrap();
        assert!(!builder.generate_jslib);
        assert_eq!(builder.category_order, vec!["Device"]);
        assert_eq!(builder.category_overrides.len(), 1);

        let missing = GeneratorConfig::default();
        assert!(matches!(
            GeneratorBuilder::from_config(&missing),
            Err(GenError::Config(_))
        ));
    }

    #[test]
    fn test_missing_source_dir() {
        let err = GeneratorBuilder::new("/nonexistent/bridgegen/source")
            .generate()
            .unwrap_err();
        assert!(matches!(err, GenError::InvalidPath(_)));
    }
}
