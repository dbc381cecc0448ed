//! Error types and diagnostics
//!
//! Hard failures (I/O, invalid templates, bad config) surface as [`GenError`].
//! Everything the generator can recover from is recorded instead: skipped
//! declarations as [`Skipped`] entries, and softer findings (stubbed types,
//! divergent merges, unsupported types) as [`Diagnostic`]s. Both end up in a
//! [`GenerationReport`].

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for bridgegen operations
pub type GenResult<T> = Result<T, GenError>;

/// Main error type for bridgegen
#[derive(Debug, Error)]
pub enum GenError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error in {file}: {message}")]
    Parse { file: PathBuf, message: String },

    /// TypeScript parse error
    #[error("TypeScript parse error: {0}")]
    TypeScriptParse(String),

    /// Template could not be compiled
    #[error("Template error: {0}")]
    Template(String),

    /// Template file missing from an override directory
    #[error("Template not found: {0}")]
    TemplateNotFound(PathBuf),

    /// Template rendering failed
    #[error("Render error in template '{template}': {message}")]
    Render { template: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Strict mode found types with no C# mapping
    #[error("{count} API(s) use unsupported types: {apis}")]
    UnsupportedTypes { count: usize, apis: String },
}

impl GenError {
    /// Create a parse error
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        GenError::Parse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        GenError::Config(message.into())
    }

    /// Create a render error
    pub fn render(template: impl Into<String>, message: impl fmt::Display) -> Self {
        GenError::Render {
            template: template.into(),
            message: message.to_string(),
        }
    }
}

/// Why a file or declaration did not produce an API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// The file failed to parse as TypeScript
    FileParse,
    /// Aggregator file, not scanned for plain exports
    BarrelFile,
    /// Declaration has no callable signature
    NoCallSignature,
    /// Listed in the configured exclusions
    ExcludedApi,
    /// Declaration binds no usable identifier
    UnnamedDeclaration,
}

impl SkipReason {
    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::FileParse => "file failed to parse",
            SkipReason::BarrelFile => "barrel file",
            SkipReason::NoCallSignature => "no call signature",
            SkipReason::ExcludedApi => "excluded by config",
            SkipReason::UnnamedDeclaration => "unnamed declaration",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A skipped file or declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Skipped {
    pub reason: SkipReason,
    /// Declaration name, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Skipped {
    pub fn new(reason: SkipReason, file: impl Into<PathBuf>) -> Self {
        Self {
            reason,
            name: None,
            file: file.into(),
            detail: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticSeverity {
    /// Error - output is incomplete or wrong
    Error,
    /// Warning - generation continues
    Warning,
    /// Info - informational message
    Info,
}

impl DiagnosticSeverity {
    /// Get display string
    pub fn display(&self) -> &'static str {
        match self {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        }
    }
}

/// A diagnostic message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// Message
    pub message: String,
    /// Source file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Diagnostic code (for categorization)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            file: None,
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Warning, message)
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(DiagnosticSeverity::Info, message)
    }

    /// Set the source file
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Format the diagnostic for display
    pub fn format(&self) -> String {
        let mut result = String::new();

        if let Some(ref file) = self.file {
            result.push_str(&file.display().to_string());
            result.push_str(": ");
        }

        result.push_str(self.severity.display());

        if let Some(ref code) = self.code {
            result.push('[');
            result.push_str(code);
            result.push(']');
        }

        result.push_str(": ");
        result.push_str(&self.message);

        result
    }
}

/// Diagnostic codes used across the pipeline
pub mod codes {
    /// Unresolved external type replaced by an empty class
    pub const STUB: &str = "stub";
    /// Same clean name collected twice with different shapes
    pub const DIVERGENT_MERGE: &str = "divergent-merge";
    /// Type with no C# mapping
    pub const UNSUPPORTED_TYPE: &str = "unsupported-type";
}

/// Aggregated outcome of a generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Number of APIs that made it into the output
    pub api_count: usize,
    /// Number of named types emitted (classes, stubs, enums)
    pub type_count: usize,
    pub skipped: Vec<Skipped>,
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a skipped item
    pub fn skip(&mut self, skipped: Skipped) {
        tracing::debug!(
            reason = %skipped.reason,
            name = skipped.name.as_deref().unwrap_or("-"),
            file = %skipped.file.display(),
            "skipped"
        );
        self.skipped.push(skipped);
    }

    /// Add a diagnostic
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Number of skipped items for one reason
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }

    /// Skip counts per reason, in first-seen order
    pub fn skip_counts(&self) -> IndexMap<SkipReason, usize> {
        let mut counts = IndexMap::new();
        for s in &self.skipped {
            *counts.entry(s.reason).or_insert(0) += 1;
        }
        counts
    }

    /// Number of diagnostics carrying a code
    pub fn count_code(&self, code: &str) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.code.as_deref() == Some(code))
            .count()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Get error count
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .count()
    }

    /// Get warning count
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_error() {
        let err = GenError::parse("appLogin.d.ts", "unexpected token");
        assert!(err.to_string().contains("appLogin.d.ts"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_diagnostic_format() {
        let diag = Diagnostic::warning("type 'Foo' collected twice")
            .in_file("foo.d.ts")
            .with_code(codes::DIVERGENT_MERGE);

        assert_eq!(diag.severity, DiagnosticSeverity::Warning);
        assert_eq!(
            diag.format(),
            "foo.d.ts: warning[divergent-merge]: type 'Foo' collected twice"
        );
    }

    #[test]
    fn test_report_counts() {
        let mut report = GenerationReport::new();
        report.skip(Skipped::new(SkipReason::BarrelFile, "index.d.ts"));
        report.skip(Skipped::new(SkipReason::NoCallSignature, "a.d.ts").named("VERSION"));
        report.skip(Skipped::new(SkipReason::BarrelFile, "types.d.ts"));
        report.add(Diagnostic::info("stubbed").with_code(codes::STUB));
        report.add(Diagnostic::error("bad type"));

        assert_eq!(report.skipped_for(SkipReason::BarrelFile), 2);
        assert_eq!(report.skipped_for(SkipReason::FileParse), 0);
        assert_eq!(report.skip_counts().get(&SkipReason::NoCallSignature), Some(&1));
        assert_eq!(report.count_code(codes::STUB), 1);
        assert!(report.has_errors());
        assert_eq!(report.warning_count(), 0);
    }
}
