//! SWC/deno_ast TypeScript parsing utilities
//!
//! Thin layer over deno_ast for declaration files:
//! - Parsing `.d.ts` sources into a module AST
//! - Leading JSDoc lookup for declarations and members
//! - Source text extraction for spans
//! - Walking top-level declarations with their export status

use crate::diagnostics::{GenError, GenResult};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::comments::{Comment, CommentKind};
use deno_ast::swc::common::{BytePos, Span, Spanned};
use deno_ast::{MediaType, ParseParams, ParsedSource, SourcePos, SourceRange, SourceTextInfo};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Information about the source file
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// The file path
    pub path: PathBuf,
    /// The source text
    pub text: Arc<str>,
    /// Source text info for span lookups
    pub text_info: SourceTextInfo,
}

impl SourceInfo {
    /// Create source info from a file path and content
    pub fn new(path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let text_info = SourceTextInfo::new(text.clone());
        Self {
            path: path.into(),
            text,
            text_info,
        }
    }

    /// Get the source text as a string slice
    pub fn source_text(&self) -> &str {
        &self.text
    }

    /// Extract source text for a span
    ///
    /// SWC positions are offset by the parser's start position, so the
    /// lookup goes through `SourceTextInfo` rather than slicing directly.
    pub fn text_for_span(&self, span: Span) -> &str {
        let range = SourceRange::new(
            SourcePos::unsafely_from_byte_pos(span.lo),
            SourcePos::unsafely_from_byte_pos(span.hi),
        );
        self.text_info.range_text(&range)
    }
}

/// A parsed TypeScript module with source information
#[derive(Debug)]
pub struct ParsedModule {
    /// The parsed source from deno_ast
    pub source: ParsedSource,
    /// Source information for text lookups
    pub source_info: SourceInfo,
}

impl ParsedModule {
    /// Get the module AST
    pub fn module(&self) -> GenResult<&swc_ast::Module> {
        match self.source.program_ref() {
            deno_ast::ProgramRef::Module(m) => Ok(m),
            deno_ast::ProgramRef::Script(_) => Err(GenError::parse(
                self.path(),
                "expected an ES module, got a script",
            )),
        }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.source_info.path
    }

    /// File name without the declaration suffix (`appLogin.d.ts` -> `appLogin`)
    pub fn stem(&self) -> String {
        declaration_stem(self.path())
    }

    /// Extract source text for a span
    pub fn text_for_span(&self, span: Span) -> &str {
        self.source_info.text_for_span(span)
    }

    /// Get leading comments for a position
    pub fn leading_comments(&self, pos: BytePos) -> Vec<Comment> {
        let source_pos = SourcePos::unsafely_from_byte_pos(pos);
        self.source
            .comments()
            .get_leading(source_pos)
            .map(|v| v.to_vec())
            .unwrap_or_default()
    }

    /// Get JSDoc comment for a span (looks for leading block comments)
    pub fn jsdoc_for_span(&self, span: Span) -> Option<String> {
        self.leading_comments(span.lo)
            .iter()
            .rev()
            .find(|c| c.kind == CommentKind::Block && c.text.starts_with('*'))
            .map(|c| c.text.to_string())
    }

    /// Top-level declarations in source order
    pub fn top_level_decls(&self) -> GenResult<Vec<TopLevelDecl<'_>>> {
        Ok(self
            .module()?
            .body
            .iter()
            .filter_map(TopLevelDecl::from_item)
            .collect())
    }
}

/// A top-level declaration together with its export status
#[derive(Debug, Clone, Copy)]
pub struct TopLevelDecl<'a> {
    pub decl: &'a swc_ast::Decl,
    pub exported: bool,
    /// Span of the whole item, including `export`; JSDoc attaches here
    pub span: Span,
}

impl<'a> TopLevelDecl<'a> {
    pub fn from_item(item: &'a swc_ast::ModuleItem) -> Option<Self> {
        match item {
            swc_ast::ModuleItem::ModuleDecl(swc_ast::ModuleDecl::ExportDecl(export)) => {
                Some(Self {
                    decl: &export.decl,
                    exported: true,
                    span: export.span,
                })
            }
            swc_ast::ModuleItem::Stmt(swc_ast::Stmt::Decl(decl)) => Some(Self {
                decl,
                exported: false,
                span: decl.span(),
            }),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<String> {
        get_decl_name(self.decl)
    }
}

/// Parse a TypeScript file from disk
pub fn parse_typescript_file(path: impl AsRef<Path>) -> GenResult<ParsedModule> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        GenError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })?;

    parse_typescript_source(path, text)
}

/// Parse TypeScript source code from a string
pub fn parse_typescript_source(
    path: impl AsRef<Path>,
    source: impl Into<Arc<str>>,
) -> GenResult<ParsedModule> {
    let path = path.as_ref();
    let source: Arc<str> = source.into();

    // `.d.ts` maps to MediaType::Dts, which enables ambient declarations
    let media_type = MediaType::from_path(path);

    let specifier = deno_ast::ModuleSpecifier::from_file_path(path)
        .map_err(|_| GenError::InvalidPath(path.display().to_string()))?;

    let parsed = deno_ast::parse_module(ParseParams {
        specifier,
        text: source.clone(),
        media_type,
        capture_tokens: true,
        scope_analysis: false,
        maybe_syntax: None,
    })
    .map_err(|e| GenError::TypeScriptParse(format!("{}: {}", path.display(), e)))?;

    let source_info = SourceInfo::new(path, source);

    Ok(ParsedModule {
        source: parsed,
        source_info,
    })
}

/// Strip `.d.ts` / `.d.cts` / `.ts` from a file name
pub fn declaration_stem(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    for suffix in [".d.ts", ".d.cts", ".d.mts", ".ts"] {
        if let Some(stem) = file_name.strip_suffix(suffix) {
            return stem.to_string();
        }
    }
    file_name
}

/// Helper to convert Wtf8Atom to String
pub fn wtf8_to_string(s: &swc_ast::Str) -> String {
    String::from_utf8_lossy(s.value.as_bytes()).into_owned()
}

/// Extract the identifier name from various declaration types
pub fn get_decl_name(decl: &swc_ast::Decl) -> Option<String> {
    match decl {
        swc_ast::Decl::Class(c) => Some(c.ident.sym.to_string()),
        swc_ast::Decl::Fn(f) => Some(f.ident.sym.to_string()),
        swc_ast::Decl::Var(v) => v.decls.first().and_then(|d| match &d.name {
            swc_ast::Pat::Ident(i) => Some(i.sym.to_string()),
            _ => None,
        }),
        swc_ast::Decl::TsInterface(i) => Some(i.id.sym.to_string()),
        swc_ast::Decl::TsTypeAlias(t) => Some(t.id.sym.to_string()),
        swc_ast::Decl::TsEnum(e) => Some(e.id.sym.to_string()),
        swc_ast::Decl::TsModule(m) => match &m.id {
            swc_ast::TsModuleName::Ident(i) => Some(i.sym.to_string()),
            swc_ast::TsModuleName::Str(s) => Some(wtf8_to_string(s)),
        },
        swc_ast::Decl::Using(_) => None,
    }
}

/// Get the name of an enum member
pub fn enum_member_name(id: &swc_ast::TsEnumMemberId) -> String {
    match id {
        swc_ast::TsEnumMemberId::Ident(i) => i.sym.to_string(),
        swc_ast::TsEnumMemberId::Str(s) => wtf8_to_string(s),
    }
}

/// Get the name from a property key expression
pub fn expr_to_name(expr: &swc_ast::Expr) -> Option<String> {
    match expr {
        swc_ast::Expr::Ident(i) => Some(i.sym.to_string()),
        swc_ast::Expr::Lit(swc_ast::Lit::Str(s)) => Some(wtf8_to_string(s)),
        swc_ast::Expr::Lit(swc_ast::Lit::Num(n)) => Some(n.value.to_string()),
        _ => None,
    }
}

/// Uniform view over a function parameter, from either a declaration
/// (`Pat`) or a signature in type position (`TsFnParam`)
#[derive(Debug, Clone, Copy)]
pub struct ParamView<'a> {
    /// Binding name, `None` for destructuring patterns
    pub name: Option<&'a str>,
    pub ty: Option<&'a swc_ast::TsType>,
    pub optional: bool,
}

impl<'a> ParamView<'a> {
    pub fn from_pat(pat: &'a swc_ast::Pat) -> Self {
        match pat {
            swc_ast::Pat::Ident(i) => Self {
                name: Some(&*i.id.sym),
                ty: i.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                optional: i.id.optional,
            },
            swc_ast::Pat::Object(o) => Self {
                name: None,
                ty: o.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                optional: o.optional,
            },
            swc_ast::Pat::Array(a) => Self {
                name: None,
                ty: a.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                optional: a.optional,
            },
            swc_ast::Pat::Rest(r) => {
                let inner = Self::from_pat(&r.arg);
                Self {
                    name: inner.name,
                    ty: r
                        .type_ann
                        .as_deref()
                        .map(|a| a.type_ann.as_ref())
                        .or(inner.ty),
                    optional: true,
                }
            }
            swc_ast::Pat::Assign(a) => Self {
                optional: true,
                ..Self::from_pat(&a.left)
            },
            _ => Self {
                name: None,
                ty: None,
                optional: false,
            },
        }
    }

    pub fn from_ts_fn_param(param: &'a swc_ast::TsFnParam) -> Self {
        match param {
            swc_ast::TsFnParam::Ident(i) => Self {
                name: Some(&*i.id.sym),
                ty: i.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                optional: i.id.optional,
            },
            swc_ast::TsFnParam::Array(a) => Self {
                name: None,
                ty: a.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                optional: a.optional,
            },
            swc_ast::TsFnParam::Rest(r) => Self {
                optional: true,
                ty: r
                    .type_ann
                    .as_deref()
                    .map(|a| a.type_ann.as_ref())
                    .or(Self::from_pat(&r.arg).ty),
                ..Self::from_pat(&r.arg)
            },
            swc_ast::TsFnParam::Object(o) => Self {
                name: None,
                ty: o.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                optional: o.optional,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declaration_source() {
        let source = r#"
            /**
             * Returns the user key
             */
            export declare function getUserKeyForGame(): Promise<string>;
        "#;

        // deno_ast requires absolute paths for file specifiers
        let parsed = parse_typescript_source("/tmp/test.d.ts", source).unwrap();
        let decls = parsed.top_level_decls().unwrap();
        assert_eq!(decls.len(), 1);
        assert!(decls[0].exported);
        assert_eq!(decls[0].name().as_deref(), Some("getUserKeyForGame"));
    }

    #[test]
    fn test_jsdoc_extraction() {
        let source = r#"
/**
 * This is a JSDoc comment
 * @param x - The input
 */
export declare function test(x: number): void;
"#;

        let parsed = parse_typescript_source("/tmp/test.d.ts", source).unwrap();
        let decls = parsed.top_level_decls().unwrap();
        let jsdoc = parsed.jsdoc_for_span(decls[0].span).unwrap();
        assert!(jsdoc.contains("This is a JSDoc comment"));
        assert!(jsdoc.contains("@param"));
    }

    #[test]
    fn test_text_for_span() {
        let source = "export type Orientation = 'portrait' | 'landscape';\n";
        let parsed = parse_typescript_source("/tmp/test.d.ts", source).unwrap();
        let decls = parsed.top_level_decls().unwrap();
        let swc_ast::Decl::TsTypeAlias(alias) = decls[0].decl else {
            panic!("expected type alias");
        };
        assert_eq!(
            parsed.text_for_span(alias.type_ann.span()),
            "'portrait' | 'landscape'"
        );
    }

    #[test]
    fn test_declaration_stem() {
        assert_eq!(declaration_stem(Path::new("/a/appLogin.d.ts")), "appLogin");
        assert_eq!(declaration_stem(Path::new("index.d.cts")), "index");
        assert_eq!(declaration_stem(Path::new("x.ts")), "x");
    }

    #[test]
    fn test_non_exported_decl() {
        let source = "declare enum Accuracy { Low = 1, High = 2 }\n";
        let parsed = parse_typescript_source("/tmp/test.d.ts", source).unwrap();
        let decls = parsed.top_level_decls().unwrap();
        assert!(!decls[0].exported);
        assert_eq!(decls[0].name().as_deref(), Some("Accuracy"));
    }
}
