//! Utilities for bridgegen
//!
//! - SWC/deno_ast TypeScript parsing
//! - Identifier and type-name normalization

pub mod naming;
pub mod swc;

pub use swc::{parse_typescript_file, parse_typescript_source, ParsedModule, SourceInfo};
