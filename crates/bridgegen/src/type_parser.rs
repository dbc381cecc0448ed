//! TypeScript type annotation walker
//!
//! Maps SWC type nodes onto [`ParsedType`]. Parsing is total: shapes the
//! generator has no model for degrade to [`TypeKind::Unknown`] with the
//! source text preserved.
//!
//! Named references resolve through the [`SourceSet`] declaration index.
//! Two stacks travel with the walk:
//! - the names currently being resolved, so recursive types terminate in a
//!   bare named reference instead of looping
//! - generic parameter bindings, one frame per instantiated declaration

use crate::js_doc::ApiDoc;
use crate::source_set::{declarator_type, NamedDecl, SourceSet, ValueDecl};
use crate::types::{
    DiscriminatedUnion, ParsedProperty, ParsedType, TypeKind, ANONYMOUS, OBJECT,
};
use crate::utils::naming::{capitalize, collapse_whitespace, extract_clean_name, strip_quotes};
use crate::utils::swc::{self, expr_to_name, ParamView, ParsedModule};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::{Span, Spanned};
use indexmap::IndexMap;

/// Browser-only types with no meaning on the C# side
const DOM_TYPES: &[&str] = &[
    "HTMLElement",
    "Element",
    "Node",
    "Document",
    "Window",
    "Event",
    "EventTarget",
    "HTMLDivElement",
    "HTMLSpanElement",
    "HTMLInputElement",
    "HTMLButtonElement",
    "HTMLCanvasElement",
    "HTMLIFrameElement",
    "DocumentFragment",
    "ShadowRoot",
    "Text",
    "Comment",
    "Attr",
    "NamedNodeMap",
    "NodeList",
    "MessageEvent",
    "MouseEvent",
    "KeyboardEvent",
];

/// Global types with a direct C# counterpart, kept as named primitives
const BUILTIN_PRIMITIVES: &[&str] = &["Date", "ArrayBuffer", "Uint8Array", "Error"];

/// Guard against pathological nesting
const MAX_DEPTH: usize = 64;

/// Path used for types parsed from standalone text
const INLINE_TYPE_PATH: &str = "/__bridgegen__/inline.d.ts";

/// Generic bindings of one declaration or signature
#[derive(Debug, Default)]
struct Frame {
    bindings: IndexMap<String, ParsedType>,
    /// Declaration frames hide everything below them
    barrier: bool,
}

/// One parameter of a call signature
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureParam {
    /// `None` for destructuring patterns
    pub name: Option<String>,
    pub ty: ParsedType,
    pub optional: bool,
}

/// A callable shape with parameter names kept
#[derive(Debug, Clone, PartialEq)]
pub struct CallSignature {
    pub params: Vec<SignatureParam>,
    pub return_type: ParsedType,
}

impl CallSignature {
    /// Collapse into a function-kind [`ParsedType`]
    pub fn into_type(self, raw: impl Into<String>) -> ParsedType {
        let params = self.params.into_iter().map(|p| p.ty).collect();
        ParsedType::function(params, self.return_type, raw)
    }
}

/// Stateful walker over type annotations
pub struct TypeParser<'s> {
    sources: &'s SourceSet,
    resolving: Vec<String>,
    frames: Vec<Frame>,
    depth: usize,
}

impl<'s> TypeParser<'s> {
    pub fn new(sources: &'s SourceSet) -> Self {
        Self {
            sources,
            resolving: Vec::new(),
            frames: Vec::new(),
            depth: 0,
        }
    }

    pub fn sources(&self) -> &'s SourceSet {
        self.sources
    }

    /// Parse a type annotation found in `module`
    pub fn parse(&mut self, module: &ParsedModule, ty: &swc_ast::TsType) -> ParsedType {
        if self.depth >= MAX_DEPTH {
            let raw = raw_text(module, ty.span());
            tracing::warn!(%raw, "type nesting too deep, treating as unknown");
            return ParsedType::unknown(raw);
        }
        self.depth += 1;
        let parsed = self.parse_inner(module, ty);
        self.depth -= 1;
        parsed
    }

    /// Parse standalone type text, e.g. `Promise<Location | undefined>`
    ///
    /// Named references still resolve against the loaded sources.
    pub fn parse_type_str(&mut self, text: &str) -> ParsedType {
        let source = format!("type __Inline = {};\n", text);
        let module = match swc::parse_typescript_source(INLINE_TYPE_PATH, source) {
            Ok(module) => module,
            Err(e) => {
                tracing::debug!(text, error = %e, "type text did not parse");
                return ParsedType::unknown(collapse_whitespace(text));
            }
        };
        let alias = module.module().ok().and_then(|m| {
            m.body.iter().find_map(|item| match item {
                swc_ast::ModuleItem::Stmt(swc_ast::Stmt::Decl(swc_ast::Decl::TsTypeAlias(a))) => {
                    Some(a.type_ann.as_ref())
                }
                _ => None,
            })
        });
        match alias {
            Some(ty) => self.parse(&module, ty),
            None => ParsedType::unknown(collapse_whitespace(text)),
        }
    }

    /// Resolve a declared interface, alias or enum by name
    pub fn resolve_name(&mut self, name: &str) -> Option<ParsedType> {
        self.resolve_declared(None, name, &[], name.to_string())
    }

    /// Bind the type parameters of a signature for the duration of its walk
    ///
    /// Unbound parameters resolve to `unknown` named after the parameter.
    /// Returns whether a frame was pushed; pass it to [`Self::exit_signature`].
    pub fn enter_signature(&mut self, type_params: Option<&swc_ast::TsTypeParamDecl>) -> bool {
        let Some(decl) = type_params.filter(|d| !d.params.is_empty()) else {
            return false;
        };
        let bindings = decl
            .params
            .iter()
            .map(|p| {
                let name = p.name.sym.to_string();
                (name.clone(), ParsedType::unknown(name))
            })
            .collect();
        self.frames.push(Frame {
            bindings,
            barrier: false,
        });
        true
    }

    pub fn exit_signature(&mut self, pushed: bool) {
        if pushed {
            self.frames.pop();
        }
    }

    /// Properties of an interface body or type literal
    pub fn member_properties(
        &mut self,
        module: &ParsedModule,
        members: &[swc_ast::TsTypeElement],
    ) -> Vec<ParsedProperty> {
        let mut props: Vec<ParsedProperty> = Vec::new();
        for member in members {
            let prop = match member {
                swc_ast::TsTypeElement::TsPropertySignature(p) => {
                    let Some(name) = expr_to_name(&p.key) else {
                        continue;
                    };
                    let ty = match p.type_ann.as_deref() {
                        Some(ann) => self.parse(module, &ann.type_ann),
                        None => ParsedType::primitive("any"),
                    };
                    ParsedProperty {
                        name,
                        ty,
                        optional: p.optional,
                        description: member_doc(module, p.span),
                    }
                }
                swc_ast::TsTypeElement::TsMethodSignature(m) => {
                    let Some(name) = expr_to_name(&m.key) else {
                        continue;
                    };
                    let ty = self.parse_signature(
                        module,
                        m.type_params.as_deref(),
                        &m.params,
                        m.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                        raw_text(module, m.span),
                    );
                    ParsedProperty {
                        name,
                        ty,
                        optional: m.optional,
                        description: member_doc(module, m.span),
                    }
                }
                swc_ast::TsTypeElement::TsGetterSignature(g) => {
                    let Some(name) = expr_to_name(&g.key) else {
                        continue;
                    };
                    let ty = match g.type_ann.as_deref() {
                        Some(ann) => self.parse(module, &ann.type_ann),
                        None => ParsedType::primitive("any"),
                    };
                    ParsedProperty {
                        name,
                        ty,
                        optional: false,
                        description: member_doc(module, g.span),
                    }
                }
                _ => continue,
            };
            // Overloaded methods: first signature wins
            if !props.iter().any(|p| p.name == prop.name) {
                props.push(prop);
            }
        }
        props
    }

    fn parse_inner(&mut self, module: &ParsedModule, ty: &swc_ast::TsType) -> ParsedType {
        use swc_ast::{TsFnOrConstructorType as FnOrCtor, TsUnionOrIntersectionType as UnionOrInter};

        let raw = raw_text(module, ty.span());
        match ty {
            swc_ast::TsType::TsKeywordType(k) => keyword_type(k.kind),
            swc_ast::TsType::TsParenthesizedType(p) => self.parse(module, &p.type_ann),
            swc_ast::TsType::TsOptionalType(o) => self.parse(module, &o.type_ann),
            swc_ast::TsType::TsRestType(r) => self.parse(module, &r.type_ann),
            swc_ast::TsType::TsLitType(lit) => literal_type(&lit.lit, raw),
            swc_ast::TsType::TsArrayType(a) => {
                ParsedType::array(self.parse(module, &a.elem_type), raw)
            }
            swc_ast::TsType::TsTypeOperator(op) => match op.op {
                swc_ast::TsTypeOperatorOp::KeyOf => ParsedType::primitive_with_raw("string", raw),
                swc_ast::TsTypeOperatorOp::ReadOnly | swc_ast::TsTypeOperatorOp::Unique => {
                    self.parse(module, &op.type_ann)
                }
            },
            swc_ast::TsType::TsUnionOrIntersectionType(UnionOrInter::TsUnionType(u)) => {
                self.parse_union(module, &u.types, raw)
            }
            swc_ast::TsType::TsUnionOrIntersectionType(UnionOrInter::TsIntersectionType(i)) => {
                self.parse_intersection(module, &i.types, raw)
            }
            swc_ast::TsType::TsFnOrConstructorType(FnOrCtor::TsFnType(f)) => self.parse_signature(
                module,
                f.type_params.as_deref(),
                &f.params,
                Some(f.type_ann.type_ann.as_ref()),
                raw,
            ),
            swc_ast::TsType::TsTypeLit(lit) => self.parse_type_literal(module, &lit.members, raw),
            swc_ast::TsType::TsTypeRef(r) => {
                let args = type_args(r.type_params.as_deref());
                match &r.type_name {
                    swc_ast::TsEntityName::Ident(id) => self.parse_named(module, &id.sym, args, raw),
                    swc_ast::TsEntityName::TsQualifiedName(q) => self.parse_qualified(q, raw),
                }
            }
            swc_ast::TsType::TsImportType(i) => match &i.qualifier {
                Some(qualifier) => {
                    let full = entity_name(qualifier);
                    let last = full.rsplit('.').next().unwrap_or(&full).to_string();
                    self.parse_named(module, &last, type_args(i.type_args.as_deref()), raw)
                }
                None => ParsedType::unknown(raw),
            },
            swc_ast::TsType::TsIndexedAccessType(ia) => {
                let obj = self.parse(module, &ia.obj_type);
                let key = self.parse(module, &ia.index_type);
                if key.is_string_literal() {
                    if let Some(prop) = obj.property(&strip_quotes(&key.raw)) {
                        return prop.ty.clone();
                    }
                }
                ParsedType::unknown(raw)
            }
            swc_ast::TsType::TsTypePredicate(_) => ParsedType::primitive_with_raw("boolean", raw),
            swc_ast::TsType::TsTypeQuery(q) => match &q.expr_name {
                swc_ast::TsTypeQueryExpr::TsEntityName(swc_ast::TsEntityName::Ident(id)) => {
                    self.parse_value_type(&id.sym, raw)
                }
                _ => ParsedType::unknown(raw),
            },
            _ => ParsedType::unknown(raw),
        }
    }

    fn parse_union(
        &mut self,
        module: &ParsedModule,
        types: &[Box<swc_ast::TsType>],
        raw: String,
    ) -> ParsedType {
        let mut flat = Vec::new();
        flatten_union(types, &mut flat);

        let mut members: Vec<ParsedType> = flat.iter().map(|t| self.parse(module, t)).collect();
        let non_null_count = members.iter().filter(|m| !m.is_null_or_undefined()).count();

        // Aliased unions inside a wider union behave as if written inline
        if non_null_count > 1 {
            members = members
                .into_iter()
                .flat_map(|m| match m.kind {
                    TypeKind::Union {
                        union_types,
                        discriminated: None,
                    } if !m.is_nullable => union_types,
                    _ => vec![m],
                })
                .collect();
        }

        let (nulls, non_null): (Vec<ParsedType>, Vec<ParsedType>) =
            members.iter().cloned().partition(ParsedType::is_null_or_undefined);

        if let (false, [single]) = (nulls.is_empty(), non_null.as_slice()) {
            let mut inner = single.clone();
            inner.is_nullable = true;
            inner.raw = raw;
            return inner;
        }

        let objects: Vec<&ParsedType> = non_null.iter().filter(|t| t.is_object()).collect();
        let mut error_codes: Vec<String> = Vec::new();
        for literal in non_null.iter().filter(|t| t.is_string_literal()) {
            let code = strip_quotes(&literal.raw);
            if !error_codes.contains(&code) {
                error_codes.push(code);
            }
        }

        if objects.len() == 1 && !error_codes.is_empty() {
            let success_type = Box::new(objects[0].clone());
            let mut union = ParsedType::new(
                raw.clone(),
                raw,
                TypeKind::Union {
                    union_types: non_null,
                    discriminated: Some(DiscriminatedUnion {
                        success_type,
                        error_codes,
                    }),
                },
            );
            union.is_nullable = !nulls.is_empty();
            return union;
        }

        ParsedType::new(
            raw.clone(),
            raw,
            TypeKind::Union {
                union_types: members,
                discriminated: None,
            },
        )
    }

    fn parse_intersection(
        &mut self,
        module: &ParsedModule,
        types: &[Box<swc_ast::TsType>],
        raw: String,
    ) -> ParsedType {
        let mut properties = Vec::new();
        let mut name: Option<String> = None;

        for t in types {
            let parsed = self.parse(module, t);
            let named = matches!(parsed.kind, TypeKind::Object { .. } | TypeKind::Union { .. })
                && !parsed.is_anonymous()
                && !parsed.name.starts_with("__")
                && !parsed.name.contains('|');
            if name.is_none() && named {
                name = Some(parsed.name.clone());
            }
            match &parsed.kind {
                TypeKind::Union { union_types, .. } => {
                    for member in union_types {
                        merge_properties(&mut properties, member.properties().iter().cloned());
                    }
                }
                _ => merge_properties(&mut properties, parsed.properties().iter().cloned()),
            }
        }

        ParsedType::new(
            name.unwrap_or_else(|| ANONYMOUS.to_string()),
            raw,
            TypeKind::Object {
                properties,
                is_intersection: true,
            },
        )
    }

    fn parse_signature(
        &mut self,
        module: &ParsedModule,
        type_params: Option<&swc_ast::TsTypeParamDecl>,
        params: &[swc_ast::TsFnParam],
        ret: Option<&swc_ast::TsType>,
        raw: String,
    ) -> ParsedType {
        self.ts_signature(module, type_params, params, ret)
            .into_type(raw)
    }

    /// Signature written in type position
    pub fn ts_signature(
        &mut self,
        module: &ParsedModule,
        type_params: Option<&swc_ast::TsTypeParamDecl>,
        params: &[swc_ast::TsFnParam],
        ret: Option<&swc_ast::TsType>,
    ) -> CallSignature {
        let views: Vec<ParamView<'_>> = params.iter().map(ParamView::from_ts_fn_param).collect();
        self.signature_from_views(module, type_params, &views, ret)
    }

    /// Signature of a `declare function`
    pub fn function_signature(
        &mut self,
        module: &ParsedModule,
        function: &swc_ast::Function,
    ) -> CallSignature {
        let views: Vec<ParamView<'_>> = function
            .params
            .iter()
            .map(|p| ParamView::from_pat(&p.pat))
            .collect();
        self.signature_from_views(
            module,
            function.type_params.as_deref(),
            &views,
            function.return_type.as_deref().map(|a| a.type_ann.as_ref()),
        )
    }

    fn signature_from_views(
        &mut self,
        module: &ParsedModule,
        type_params: Option<&swc_ast::TsTypeParamDecl>,
        views: &[ParamView<'_>],
        ret: Option<&swc_ast::TsType>,
    ) -> CallSignature {
        let pushed = self.enter_signature(type_params);
        let params = views
            .iter()
            .map(|view| SignatureParam {
                name: view.name.map(str::to_string),
                ty: match view.ty {
                    Some(t) => self.parse(module, t),
                    None => ParsedType::primitive("any"),
                },
                optional: view.optional,
            })
            .collect();
        let return_type = match ret {
            Some(t) => self.parse(module, t),
            None => ParsedType::primitive("void"),
        };
        self.exit_signature(pushed);
        CallSignature {
            params,
            return_type,
        }
    }

    /// Find the call signature of a type, if it is callable
    ///
    /// Unlike [`Self::parse`], callable objects that also carry properties
    /// (`fn & { getPermission(): ... }`) still yield their signature.
    /// Aliases, interfaces and `typeof fn` are followed.
    pub fn call_signature(
        &mut self,
        module: &ParsedModule,
        ty: &swc_ast::TsType,
    ) -> Option<CallSignature> {
        use swc_ast::{TsFnOrConstructorType as FnOrCtor, TsUnionOrIntersectionType as UnionOrInter};

        match strip_parens(ty) {
            swc_ast::TsType::TsFnOrConstructorType(FnOrCtor::TsFnType(f)) => Some(self.ts_signature(
                module,
                f.type_params.as_deref(),
                &f.params,
                Some(f.type_ann.type_ann.as_ref()),
            )),
            swc_ast::TsType::TsTypeLit(lit) => {
                let call = first_call_signature(&lit.members)?;
                Some(self.ts_signature(
                    module,
                    call.type_params.as_deref(),
                    &call.params,
                    call.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                ))
            }
            swc_ast::TsType::TsUnionOrIntersectionType(UnionOrInter::TsIntersectionType(i)) => {
                i.types.iter().find_map(|t| self.call_signature(module, t))
            }
            swc_ast::TsType::TsTypeQuery(q) => match &q.expr_name {
                swc_ast::TsTypeQueryExpr::TsEntityName(swc_ast::TsEntityName::Ident(id)) => {
                    self.value_signature(&id.sym)
                }
                _ => None,
            },
            swc_ast::TsType::TsTypeRef(r) => match &r.type_name {
                swc_ast::TsEntityName::Ident(id) => {
                    self.declared_call_signature(module, &id.sym, type_args(r.type_params.as_deref()))
                }
                swc_ast::TsEntityName::TsQualifiedName(_) => None,
            },
            _ => None,
        }
    }

    fn value_signature(&mut self, name: &str) -> Option<CallSignature> {
        let key = format!("typeof {}", name);
        if self.resolving.contains(&key) {
            return None;
        }
        let sources = self.sources;
        self.resolving.push(key);
        let signature = match sources.lookup_value(name) {
            Some(ValueDecl::Function { module, function }) => {
                Some(self.function_signature(module, function))
            }
            Some(ValueDecl::Variable { module, declarator }) => {
                declarator_type(declarator).and_then(|t| self.call_signature(module, t))
            }
            None => None,
        };
        self.resolving.pop();
        signature
    }

    fn declared_call_signature(
        &mut self,
        caller: &ParsedModule,
        name: &str,
        args: &[Box<swc_ast::TsType>],
    ) -> Option<CallSignature> {
        if self.resolving.iter().any(|n| n == name) {
            return None;
        }
        let sources = self.sources;
        let first = sources.lookup_first(name)?;
        let arg_types: Vec<ParsedType> = args.iter().map(|a| self.parse(caller, a)).collect();

        self.resolving.push(name.to_string());
        let signature = match first.decl.decl {
            swc_ast::Decl::TsTypeAlias(alias) => {
                self.push_decl_frame(first.module, alias.type_params.as_deref(), &arg_types);
                let signature = self.call_signature(first.module, &alias.type_ann);
                self.frames.pop();
                signature
            }
            swc_ast::Decl::TsInterface(iface) => {
                self.push_decl_frame(first.module, iface.type_params.as_deref(), &arg_types);
                let signature = first_call_signature(&iface.body.body).map(|call| {
                    self.ts_signature(
                        first.module,
                        call.type_params.as_deref(),
                        &call.params,
                        call.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                    )
                });
                self.frames.pop();
                signature
            }
            _ => None,
        };
        self.resolving.pop();
        signature
    }

    /// Type of a value referenced through `typeof`
    fn parse_value_type(&mut self, name: &str, raw: String) -> ParsedType {
        let key = format!("typeof {}", name);
        if self.resolving.contains(&key) {
            return ParsedType::unknown(raw);
        }
        let sources = self.sources;
        self.resolving.push(key);
        let parsed = match sources.lookup_value(name) {
            Some(ValueDecl::Function { module, function }) => {
                self.function_signature(module, function).into_type(raw)
            }
            Some(ValueDecl::Variable { module, declarator }) => match declarator_type(declarator) {
                Some(t) => self.parse(module, t),
                None => ParsedType::unknown(raw),
            },
            None => ParsedType::unknown(raw),
        };
        self.resolving.pop();
        parsed
    }

    /// Object literal, or a function when it only has call signatures
    fn parse_type_literal(
        &mut self,
        module: &ParsedModule,
        members: &[swc_ast::TsTypeElement],
        raw: String,
    ) -> ParsedType {
        if let Some(call) = sole_call_signature(members) {
            return self.parse_signature(
                module,
                call.type_params.as_deref(),
                &call.params,
                call.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                raw,
            );
        }
        let properties = self.member_properties(module, members);
        ParsedType::object(OBJECT, raw, properties)
    }

    fn parse_qualified(&mut self, q: &swc_ast::TsQualifiedName, raw: String) -> ParsedType {
        let left = entity_name(&q.left);
        let is_enum = self
            .sources
            .lookup_first(&left)
            .is_some_and(|d| matches!(d.decl.decl, swc_ast::Decl::TsEnum(_)));
        if is_enum {
            return ParsedType::new(left, raw, TypeKind::Enum);
        }
        ParsedType::unknown(format!("{}.{}", left, q.right.sym))
    }

    /// Reference by simple name: bindings, builtins, then declarations
    fn parse_named(
        &mut self,
        module: &ParsedModule,
        name: &str,
        args: &[Box<swc_ast::TsType>],
        raw: String,
    ) -> ParsedType {
        if args.is_empty() {
            if let Some(bound) = self.lookup_binding(name) {
                return bound;
            }
        }
        if DOM_TYPES.contains(&name) {
            return ParsedType::primitive_with_raw(OBJECT, raw);
        }
        if BUILTIN_PRIMITIVES.contains(&name) {
            return ParsedType::primitive_with_raw(name, raw);
        }

        match name {
            "Array" | "ReadonlyArray" | "Set" | "ReadonlySet" => {
                let element = self.arg_or(module, args, 0, "any");
                return ParsedType::array(element, raw);
            }
            "Promise" | "PromiseLike" => {
                let inner = match args.first() {
                    Some(arg) => self.parse(module, arg),
                    None => match raw.find('<').zip(raw.rfind('>')) {
                        Some((start, end)) if start < end => {
                            self.parse_type_str(&raw[start + 1..end])
                        }
                        _ => ParsedType::primitive("any"),
                    },
                };
                return ParsedType::promise(inner, raw);
            }
            "Record" | "Map" | "ReadonlyMap" => {
                let (key_type, value_type) = if args.len() >= 2 {
                    (self.parse(module, &args[0]), self.parse(module, &args[1]))
                } else {
                    (ParsedType::primitive("string"), ParsedType::primitive(OBJECT))
                };
                return ParsedType::new(
                    "Record",
                    raw,
                    TypeKind::Record {
                        key_type: Box::new(key_type),
                        value_type: Box::new(value_type),
                    },
                );
            }
            "Function" => {
                return ParsedType::function(Vec::new(), ParsedType::primitive("void"), raw);
            }
            "Readonly" => return self.arg_or(module, args, 0, "any"),
            "NonNullable" => {
                let mut inner = self.arg_or(module, args, 0, "any");
                inner.is_nullable = false;
                return inner;
            }
            "Partial" | "Required" => {
                let optional = name == "Partial";
                let inner = self.arg_or(module, args, 0, "any");
                return reshape_object(inner, raw, |props| {
                    for p in props.iter_mut() {
                        p.optional = optional;
                    }
                });
            }
            "Pick" | "Omit" => {
                let inner = self.arg_or(module, args, 0, "any");
                let keys = literal_keys(&self.arg_or(module, args, 1, "never"));
                let keep = name == "Pick";
                return reshape_object(inner, raw, |props| {
                    props.retain(|p| keys.contains(&p.name) == keep);
                });
            }
            _ => {}
        }

        match self.resolve_declared(Some(module), name, args, raw.clone()) {
            Some(parsed) => parsed,
            None => {
                // Left for the collector's external resolution pass
                tracing::trace!(name, "unresolved type reference");
                ParsedType::object(name, raw, Vec::new())
            }
        }
    }

    fn arg_or(
        &mut self,
        module: &ParsedModule,
        args: &[Box<swc_ast::TsType>],
        index: usize,
        fallback: &str,
    ) -> ParsedType {
        match args.get(index) {
            Some(arg) => self.parse(module, arg),
            None => ParsedType::primitive(fallback),
        }
    }

    fn resolve_declared(
        &mut self,
        caller: Option<&ParsedModule>,
        name: &str,
        args: &[Box<swc_ast::TsType>],
        raw: String,
    ) -> Option<ParsedType> {
        let sources = self.sources;
        let decls = sources.lookup(name);
        let first = *decls.first()?;

        if self.resolving.iter().any(|n| n == name) {
            return Some(ParsedType::object(name, raw, Vec::new()));
        }

        // Type arguments belong to the referencing scope
        let arg_types: Vec<ParsedType> = match caller {
            Some(module) => args.iter().map(|a| self.parse(module, a)).collect(),
            None => Vec::new(),
        };
        let instance_name = instantiated_name(name, &arg_types);

        self.resolving.push(name.to_string());
        let resolved = match first.decl.decl {
            swc_ast::Decl::TsEnum(_) => ParsedType::new(name, raw, TypeKind::Enum),
            swc_ast::Decl::TsTypeAlias(alias) => {
                self.push_decl_frame(first.module, alias.type_params.as_deref(), &arg_types);
                let mut parsed = self.parse(first.module, &alias.type_ann);
                self.frames.pop();
                // Aliases of objects and unions are named types; the rest are transparent
                if matches!(parsed.kind, TypeKind::Object { .. } | TypeKind::Union { .. }) {
                    parsed.name = instance_name;
                    parsed.raw = raw;
                }
                parsed
            }
            _ => self.parse_interfaces(&decls, &instance_name, &arg_types, raw),
        };
        self.resolving.pop();
        Some(resolved)
    }

    /// Merge every interface declaration of a name, then its bases
    fn parse_interfaces(
        &mut self,
        decls: &[NamedDecl<'s>],
        name: &str,
        args: &[ParsedType],
        raw: String,
    ) -> ParsedType {
        let mut properties = Vec::new();
        let mut call_signature = None;

        for named in decls {
            let swc_ast::Decl::TsInterface(iface) = named.decl.decl else {
                continue;
            };
            let module = named.module;
            self.push_decl_frame(module, iface.type_params.as_deref(), args);

            let own = self.member_properties(module, &iface.body.body);
            merge_properties(&mut properties, own);

            if call_signature.is_none() {
                if let Some(call) = sole_call_signature(&iface.body.body) {
                    call_signature = Some(self.parse_signature(
                        module,
                        call.type_params.as_deref(),
                        &call.params,
                        call.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                        raw.clone(),
                    ));
                }
            }

            for base in &iface.extends {
                let Some(base_name) = expr_dotted_name(&base.expr) else {
                    continue;
                };
                let base_name = base_name.rsplit('.').next().unwrap_or(&base_name).to_string();
                let base_raw = raw_text(module, base.span);
                let parsed = self.parse_named(
                    module,
                    &base_name,
                    type_args(base.type_args.as_deref()),
                    base_raw,
                );
                merge_properties(&mut properties, parsed.properties().iter().cloned());
            }

            self.frames.pop();
        }

        match call_signature {
            Some(function) if properties.is_empty() => function,
            _ => ParsedType::object(name, raw, properties),
        }
    }

    fn push_decl_frame(
        &mut self,
        module: &ParsedModule,
        type_params: Option<&swc_ast::TsTypeParamDecl>,
        args: &[ParsedType],
    ) {
        let mut bindings = IndexMap::new();
        if let Some(decl) = type_params {
            for (i, param) in decl.params.iter().enumerate() {
                let name = param.name.sym.to_string();
                let bound = match (args.get(i), param.default.as_deref()) {
                    (Some(arg), _) => arg.clone(),
                    (None, Some(default)) => self.parse(module, default),
                    (None, None) => ParsedType::unknown(name.clone()),
                };
                bindings.insert(name, bound);
            }
        }
        self.frames.push(Frame {
            bindings,
            barrier: true,
        });
    }

    fn lookup_binding(&self, name: &str) -> Option<ParsedType> {
        for frame in self.frames.iter().rev() {
            if let Some(bound) = frame.bindings.get(name) {
                return Some(bound.clone());
            }
            if frame.barrier {
                break;
            }
        }
        None
    }
}

/// Source text of a span with whitespace collapsed
pub fn raw_text(module: &ParsedModule, span: Span) -> String {
    collapse_whitespace(module.text_for_span(span))
}

fn member_doc(module: &ParsedModule, span: Span) -> Option<String> {
    module
        .jsdoc_for_span(span)
        .and_then(|c| ApiDoc::parse(&c).description)
}

fn keyword_type(kind: swc_ast::TsKeywordTypeKind) -> ParsedType {
    use swc_ast::TsKeywordTypeKind as K;
    let name = match kind {
        K::TsStringKeyword => "string",
        K::TsNumberKeyword | K::TsBigIntKeyword => "number",
        K::TsBooleanKeyword => "boolean",
        K::TsVoidKeyword => "void",
        K::TsAnyKeyword => "any",
        K::TsUnknownKeyword => "unknown",
        K::TsUndefinedKeyword => "undefined",
        K::TsNullKeyword => "null",
        K::TsNeverKeyword => "never",
        K::TsObjectKeyword => OBJECT,
        K::TsSymbolKeyword => return ParsedType::unknown("symbol"),
        K::TsIntrinsicKeyword => return ParsedType::unknown("intrinsic"),
    };
    ParsedType::primitive(name)
}

fn literal_type(lit: &swc_ast::TsLit, raw: String) -> ParsedType {
    match lit {
        swc_ast::TsLit::Str(_) | swc_ast::TsLit::Tpl(_) => {
            ParsedType::primitive_with_raw("string", raw)
        }
        swc_ast::TsLit::Number(_) | swc_ast::TsLit::BigInt(_) => {
            ParsedType::primitive_with_raw("number", raw)
        }
        swc_ast::TsLit::Bool(_) => ParsedType::primitive_with_raw("boolean", raw),
    }
}

fn type_args(params: Option<&swc_ast::TsTypeParamInstantiation>) -> &[Box<swc_ast::TsType>] {
    params.map(|p| p.params.as_slice()).unwrap_or(&[])
}

fn strip_parens(ty: &swc_ast::TsType) -> &swc_ast::TsType {
    match ty {
        swc_ast::TsType::TsParenthesizedType(p) => strip_parens(&p.type_ann),
        other => other,
    }
}

fn flatten_union<'a>(types: &'a [Box<swc_ast::TsType>], out: &mut Vec<&'a swc_ast::TsType>) {
    for t in types {
        match strip_parens(t) {
            swc_ast::TsType::TsUnionOrIntersectionType(
                swc_ast::TsUnionOrIntersectionType::TsUnionType(u),
            ) => flatten_union(&u.types, out),
            other => out.push(other),
        }
    }
}

/// The one call signature of a member list with no properties
fn sole_call_signature(members: &[swc_ast::TsTypeElement]) -> Option<&swc_ast::TsCallSignatureDecl> {
    let has_props = members.iter().any(|m| {
        matches!(
            m,
            swc_ast::TsTypeElement::TsPropertySignature(_)
                | swc_ast::TsTypeElement::TsMethodSignature(_)
                | swc_ast::TsTypeElement::TsGetterSignature(_)
        )
    });
    if has_props {
        return None;
    }
    first_call_signature(members)
}

fn first_call_signature(members: &[swc_ast::TsTypeElement]) -> Option<&swc_ast::TsCallSignatureDecl> {
    members.iter().find_map(|m| match m {
        swc_ast::TsTypeElement::TsCallSignatureDecl(call) => Some(call),
        _ => None,
    })
}

/// First-seen-wins merge by property name
pub fn merge_properties(
    target: &mut Vec<ParsedProperty>,
    incoming: impl IntoIterator<Item = ParsedProperty>,
) {
    for prop in incoming {
        if !target.iter().any(|p| p.name == prop.name) {
            target.push(prop);
        }
    }
}

fn entity_name(name: &swc_ast::TsEntityName) -> String {
    match name {
        swc_ast::TsEntityName::Ident(i) => i.sym.to_string(),
        swc_ast::TsEntityName::TsQualifiedName(q) => {
            format!("{}.{}", entity_name(&q.left), q.right.sym)
        }
    }
}

fn expr_dotted_name(expr: &swc_ast::Expr) -> Option<String> {
    match expr {
        swc_ast::Expr::Ident(i) => Some(i.sym.to_string()),
        swc_ast::Expr::Member(m) => {
            let obj = expr_dotted_name(&m.obj)?;
            match &m.prop {
                swc_ast::MemberProp::Ident(i) => Some(format!("{}.{}", obj, i.sym)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// `Response<User>` -> `ResponseUser`
fn instantiated_name(name: &str, args: &[ParsedType]) -> String {
    let mut out = name.to_string();
    for arg in args {
        let part = if arg.is_anonymous() || matches!(arg.kind, TypeKind::Union { .. }) {
            "Object".to_string()
        } else {
            capitalize(&extract_clean_name(&arg.name))
        };
        out.push_str(&part);
    }
    out
}

/// Apply a property edit to an object type, making it anonymous
///
/// The result no longer matches the named declaration, so it gets a
/// synthesized name at its use site.
fn reshape_object(
    mut inner: ParsedType,
    raw: String,
    edit: impl FnOnce(&mut Vec<ParsedProperty>),
) -> ParsedType {
    match &mut inner.kind {
        TypeKind::Object { properties, .. } => {
            edit(properties);
            inner.name = ANONYMOUS.to_string();
            inner.raw = raw;
            inner
        }
        _ => inner,
    }
}

/// Property names named by a literal or literal union (`'a' | 'b'`)
fn literal_keys(keys: &ParsedType) -> Vec<String> {
    if keys.is_string_literal() {
        return vec![strip_quotes(&keys.raw)];
    }
    keys.union_types()
        .iter()
        .filter(|t| t.is_string_literal())
        .map(|t| strip_quotes(&t.raw))
        .collect()
}
