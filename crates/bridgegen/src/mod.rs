//! bridgegen: Unity WebGL bindings generator for the Apps in Toss web bridge
//!
//! This crate turns the bridge's TypeScript declarations into Unity code by:
//! - Parsing `.d.ts` files using deno_ast/SWC
//! - Extracting every exported API, its JSDoc and its type tree
//! - Collecting and naming every type the APIs reference
//! - Rendering C# and `.jslib` files through Handlebars templates
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐
//! │ web-bridge      │    │ shared module    │
//! │ *.d.ts (SWC)    │    │ *.d.ts (lookups) │
//! └────────┬────────┘    └────────┬─────────┘
//!          │                      │
//!          ▼                      │
//!   ┌─────────────┐               │
//!   │  ParsedApi  │               │
//!   └──────┬──────┘               │
//!          └──────────┬───────────┘
//!                     ▼
//!             ┌────────────────┐
//!             │ TypeCollection │
//!             └───────┬────────┘
//!          ┌──────────┴──────────┐
//!          ▼                     ▼
//!    ┌──────────┐         ┌──────────┐
//!    │  C# (.cs)│         │  .jslib  │
//!    └──────────┘         └──────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use bridgegen::GeneratorBuilder;
//!
//! GeneratorBuilder::new("node_modules/@apps-in-toss/web-bridge/built")
//!     .output_dir("Runtime/SDK")
//!     .jslib_dir("Runtime/SDK/Plugins")
//!     .build()
//!     .expect("Failed to generate bindings");
//! ```

// Core types
pub mod js_doc;
pub mod types;

// Parsing
pub mod api_parser;
pub mod source_set;
pub mod type_defs;
pub mod type_parser;

// Type collection and output
pub mod collector;
pub mod csharp;
#[cfg(feature = "jslib")]
pub mod jslib;

// Pipeline and utilities
pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod printer;
pub mod utils;

// Re-exports for convenience
pub use api_parser::{parse_apis, ApiParser, ApiParserOptions, ApiScan};
pub use collector::{
    ExternalResolver, NoExternalResolver, SharedModuleResolver, TypeCollection, TypeCollector,
};
pub use config::{GeneratorConfig, CONFIG_FILE_NAME};
pub use diagnostics::{
    Diagnostic, DiagnosticSeverity, GenError, GenResult, GenerationReport, SkipReason, Skipped,
};
pub use source_set::SourceSet;
pub use type_defs::parse_type_definitions;
pub use types::{
    DiscriminatedUnion, EventInfo, GeneratedFile, ParsedApi, ParsedParameter, ParsedProperty,
    ParsedType, ParsedTypeDefinition, TypeKind,
};

// Output generators
pub use csharp::{CSharpGenerator, PreparedApi, TemplateSet};
#[cfg(feature = "jslib")]
pub use jslib::JslibGenerator;

// Terminal output
pub use printer::ReportPrinter;

// Builder API
pub use builder::{BuildOutput, Generation, GeneratorBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
