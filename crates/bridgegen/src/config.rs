//! `bridgegen.toml` configuration
//!
//! Every key is optional; the builder fills in defaults. Relative paths are
//! resolved against the directory holding the config file.
//!
//! ```toml
//! source_dir = "node_modules/@apps-in-toss/web-bridge/built"
//! output_dir = "Runtime/SDK"
//! category_order = ["Authentication", "Payment"]
//!
//! [categories]
//! Device = ["setDeviceOrientation"]
//! ```

use crate::diagnostics::{GenError, GenResult};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "bridgegen.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub jslib_dir: Option<PathBuf>,
    /// Directory replacing the built-in templates
    pub template_dir: Option<PathBuf>,
    /// Declaration tree used to resolve external type references
    pub shared_module: Option<PathBuf>,
    pub web_framework_tag: Option<String>,
    pub generate_jslib: Option<bool>,
    pub scan_namespaces: Option<bool>,
    /// Unsupported types fail the run instead of being reported
    pub strict: Option<bool>,
    #[serde(default)]
    pub excluded_apis: Vec<String>,
    #[serde(default)]
    pub category_order: Vec<String>,
    /// Category to API names
    #[serde(default)]
    pub categories: IndexMap<String, Vec<String>>,
}

impl GeneratorConfig {
    pub fn from_toml_str(content: &str) -> GenResult<Self> {
        toml::from_str(content).map_err(|e| GenError::config(e.to_string()))
    }

    /// Parse a config file, resolving its relative paths against the file's directory
    pub fn from_file(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GenError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| GenError::config(format!("{}: {}", path.display(), e)))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config.relative_to(base))
    }

    /// Explicit file, else `bridgegen.toml` in `dir` if present, else defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> GenResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::from_file(candidate)
        } else {
            Ok(Self::default())
        }
    }

    fn relative_to(mut self, base: &Path) -> Self {
        for path in [
            &mut self.source_dir,
            &mut self.output_dir,
            &mut self.jslib_dir,
            &mut self.template_dir,
            &mut self.shared_module,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// API name to category, inverted from `[categories]`
    pub fn category_overrides(&self) -> GenResult<IndexMap<String, String>> {
        let mut overrides: IndexMap<String, String> = IndexMap::new();
        for (category, apis) in &self.categories {
            for api in apis {
                if let Some(previous) = overrides.insert(api.clone(), category.clone()) {
                    return Err(GenError::config(format!(
                        "API '{}' is listed under both '{}' and '{}'",
                        api, previous, category
                    )));
                }
            }
        }
        Ok(overrides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config() {
        assert_eq!(GeneratorConfig::from_toml_str("").unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            source_dir = "bridge"
            web_framework_tag = "1.4.0"
            strict = true
            excluded_apis = ["internalApi"]
            category_order = ["Authentication", "Payment"]

            [categories]
            Device = ["setDeviceOrientation", "getLocation"]
            Payment = ["checkoutPayment"]
            "#,
        )
        .unwrap();
        assert_eq!(config.source_dir, Some(PathBuf::from("bridge")));
        assert_eq!(config.strict, Some(true));
        assert_eq!(config.generate_jslib, None);
        let overrides = config.category_overrides().unwrap();
        assert_eq!(overrides.get("getLocation").map(String::as_str), Some("Device"));
        assert_eq!(
            overrides.keys().collect::<Vec<_>>(),
            vec!["setDeviceOrientation", "getLocation", "checkoutPayment"]
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = GeneratorConfig::from_toml_str("sourcedir = \"x\"").unwrap_err();
        assert!(matches!(err, GenError::Config(_)));
    }

    #[test]
    fn test_duplicate_category_assignment() {
        let config = GeneratorConfig::from_toml_str(
            "[categories]\nDevice = [\"share\"]\nShare = [\"share\"]\n",
        )
        .unwrap();
        assert!(matches!(config.category_overrides(), Err(GenError::Config(_))));
    }

    #[test]
    fn test_paths_relative_to_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "source_dir = \"bridge\"\noutput_dir = \"/abs/out\"\n",
        )
        .unwrap();
        let config = GeneratorConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.source_dir, Some(dir.path().join("bridge")));
        assert_eq!(config.output_dir, Some(PathBuf::from("/abs/out")));

        let missing = GeneratorConfig::discover(None, &dir.path().join("nowhere")).unwrap();
        assert_eq!(missing, GeneratorConfig::default());
    }
}
