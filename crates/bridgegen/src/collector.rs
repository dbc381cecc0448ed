//! Type collection and deduplication
//!
//! Walks every API signature and type definition and decides which C#
//! classes and enums have to exist:
//!
//! ```text
//!   ParsedApi ──► parameters ──┐
//!             ──► return type ─┼──► GenerationContext ──► TypeCollection
//!   ParsedTypeDefinition ──────┘        │  ▲
//!                                       ▼  │
//!                                pending externals
//!                         (definitions, ExternalResolver, stubs)
//! ```
//!
//! Anonymous objects are named after where they appear (`SetDeviceOrientationOptions`,
//! `GetPendingOrdersResultOrder`). The clean name is the dedup key and the
//! first writer wins. Names declared in source are reserved before the walk,
//! so a synthesized name that would shadow one gets a numeric suffix instead.

use crate::diagnostics::{codes, Diagnostic, GenResult};
use crate::source_set::SourceSet;
use crate::type_defs::parse_type_definitions;
use crate::type_parser::TypeParser;
use crate::types::{
    DefinitionKind, ParsedApi, ParsedParameter, ParsedProperty, ParsedType, ParsedTypeDefinition,
    TypeKind,
};
use crate::utils::naming::{capitalize, extract_clean_name, singularize, strip_quotes};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Upper bound on external resolution rounds
const MAX_RESOLVE_PASSES: usize = 10;

/// How a field or signature slot is typed in the output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum FieldType {
    /// Mapped from the source type
    Source(ParsedType),
    /// A synthesized class or enum
    Named(String),
    /// Array of a synthesized class
    NamedArray(String),
}

/// One field of a collected class
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedField {
    /// Name as it appears in JSON
    pub name: String,
    pub field_type: FieldType,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CollectedKind {
    #[serde(rename_all = "camelCase")]
    Class {
        fields: Vec<CollectedField>,
        /// Return payloads carry an extra `error` field
        is_result_type: bool,
    },
    /// Placeholder for a name nothing could resolve
    Stub,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedType {
    pub name: String,
    #[serde(flatten)]
    pub kind: CollectedKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CollectedType {
    pub fn is_stub(&self) -> bool {
        matches!(self.kind, CollectedKind::Stub)
    }

    pub fn fields(&self) -> &[CollectedField] {
        match &self.kind {
            CollectedKind::Class { fields, .. } => fields,
            CollectedKind::Stub => &[],
        }
    }

    pub fn is_result_type(&self) -> bool {
        matches!(
            self.kind,
            CollectedKind::Class {
                is_result_type: true,
                ..
            }
        )
    }

    pub fn field(&self, name: &str) -> Option<&CollectedField> {
        self.fields().iter().find(|f| f.name == name)
    }
}

/// Wrapper class for a discriminated union return
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionResult {
    pub class_name: String,
    pub api_name: String,
    pub success: FieldType,
    pub error_codes: Vec<String>,
}

/// Output types of one API's signature
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTypes {
    /// One entry per parameter, in declaration order
    pub parameters: Vec<FieldType>,
    /// Return type with any promise unwrapped
    pub return_type: FieldType,
    /// Payload of `onEvent` for callback-based APIs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<FieldType>,
    /// Payload of an event subscription
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_data: Option<FieldType>,
}

/// Everything the type emitter needs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCollection {
    /// Enums synthesized from inline string-literal unions
    pub inline_enums: IndexMap<String, Vec<String>>,
    pub union_results: IndexMap<String, UnionResult>,
    /// Classes found or synthesized while walking APIs, plus stubs
    pub types: IndexMap<String, CollectedType>,
    /// Classes for interface type definitions
    pub definition_classes: IndexMap<String, CollectedType>,
    pub api_types: IndexMap<String, ApiTypes>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TypeCollection {
    pub fn get(&self, name: &str) -> Option<&CollectedType> {
        self.types
            .get(name)
            .or_else(|| self.definition_classes.get(name))
    }

    pub fn api(&self, name: &str) -> Option<&ApiTypes> {
        self.api_types.get(name)
    }

    pub fn stubs(&self) -> impl Iterator<Item = &CollectedType> {
        self.types.values().filter(|t| t.is_stub())
    }

    pub fn stub_count(&self) -> usize {
        self.stubs().count()
    }
}

/// Fallback lookup for names the loaded sources do not declare
pub trait ExternalResolver {
    fn resolve(&self, name: &str) -> Option<ParsedTypeDefinition>;
}

/// Resolves nothing; every external reference becomes a stub
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExternalResolver;

impl ExternalResolver for NoExternalResolver {
    fn resolve(&self, _name: &str) -> Option<ParsedTypeDefinition> {
        None
    }
}

/// Resolves names against a second declaration tree (the shared native module package)
#[derive(Debug)]
pub struct SharedModuleResolver {
    sources: SourceSet,
    definitions: Vec<ParsedTypeDefinition>,
}

impl SharedModuleResolver {
    pub fn load(path: impl AsRef<Path>) -> GenResult<Self> {
        let sources = SourceSet::load(path)?;
        Ok(Self::from_sources(sources))
    }

    pub fn from_sources(sources: SourceSet) -> Self {
        let definitions = parse_type_definitions(&sources);
        tracing::debug!(
            files = sources.modules.len(),
            definitions = definitions.len(),
            "loaded shared module"
        );
        Self {
            sources,
            definitions,
        }
    }
}

impl ExternalResolver for SharedModuleResolver {
    fn resolve(&self, name: &str) -> Option<ParsedTypeDefinition> {
        if let Some(def) = self.definitions.iter().find(|d| d.name == name) {
            return Some(def.clone());
        }
        // Non-exported interfaces and aliases
        let parsed = TypeParser::new(&self.sources).resolve_name(name)?;
        let module = self.sources.lookup_first(name)?.module;
        parsed.has_properties().then(|| ParsedTypeDefinition {
            name: name.to_string(),
            kind: DefinitionKind::Interface,
            file: module.path().to_path_buf(),
            description: None,
            enum_values: Vec::new(),
            properties: parsed.properties().to_vec(),
        })
    }
}

/// Run-scoped collection state
#[derive(Default)]
struct GenerationContext {
    collection: TypeCollection,
    /// Names emitted from type definitions
    exclude: HashSet<String>,
    /// Every name declared in source; synthesized names avoid these
    reserved: HashSet<String>,
    pending: IndexSet<String>,
    /// Classes whose fields are still being computed
    building: HashSet<String>,
    warned: HashSet<String>,
}

/// Entry point for type collection
pub struct TypeCollector;

impl TypeCollector {
    pub fn collect(
        apis: &[ParsedApi],
        definitions: &[ParsedTypeDefinition],
        resolver: &dyn ExternalResolver,
    ) -> TypeCollection {
        let mut ctx = GenerationContext::default();

        for def in definitions {
            let emitted = match def.kind {
                DefinitionKind::Enum => !def.enum_values.is_empty(),
                DefinitionKind::Interface => !def.properties.is_empty(),
            };
            if emitted {
                ctx.exclude.insert(def.name.clone());
            }
        }
        ctx.reserve_source_names(apis, definitions);

        for def in definitions {
            if def.kind != DefinitionKind::Interface || def.properties.is_empty() {
                continue;
            }
            if ctx.collection.definition_classes.contains_key(&def.name) {
                continue;
            }
            let fields = ctx.class_fields(Some(&def.name), &def.properties);
            ctx.collection.definition_classes.insert(
                def.name.clone(),
                CollectedType {
                    name: def.name.clone(),
                    kind: CollectedKind::Class {
                        fields,
                        is_result_type: false,
                    },
                    description: def.description.clone(),
                },
            );
        }

        for api in apis {
            let types = ctx.collect_api(api);
            ctx.collection.api_types.insert(api.name.clone(), types);
        }

        ctx.resolve_pending(definitions, resolver);

        tracing::debug!(
            types = ctx.collection.types.len(),
            inline_enums = ctx.collection.inline_enums.len(),
            union_results = ctx.collection.union_results.len(),
            stubs = ctx.collection.stub_count(),
            "type collection finished"
        );
        ctx.collection
    }
}

impl GenerationContext {
    fn reserve_source_names(&mut self, apis: &[ParsedApi], definitions: &[ParsedTypeDefinition]) {
        self.reserved.extend(self.exclude.iter().cloned());
        for def in definitions {
            self.reserved.insert(def.name.clone());
            for prop in &def.properties {
                self.reserve_names_in(&prop.ty);
            }
        }
        for api in apis {
            for param in &api.parameters {
                self.reserve_names_in(&param.ty);
            }
            self.reserve_names_in(&api.return_type);
            if let Some(data) = api.event.as_ref().and_then(|e| e.data_type.as_ref()) {
                self.reserve_names_in(data);
            }
        }
    }

    fn reserve_names_in(&mut self, ty: &ParsedType) {
        match &ty.kind {
            TypeKind::Object { properties, .. } => {
                if !ty.is_anonymous() {
                    self.reserve(&ty.name);
                }
                for prop in properties {
                    self.reserve_names_in(&prop.ty);
                }
            }
            TypeKind::Union {
                union_types,
                discriminated,
            } => {
                // discriminated returns are always renamed to `{Api}Result`
                if is_named_alias(ty) && discriminated.is_none() {
                    self.reserve(&ty.name);
                }
                for member in union_types {
                    self.reserve_names_in(member);
                }
            }
            TypeKind::Array { element_type } => self.reserve_names_in(element_type),
            TypeKind::Promise { promise_type } => self.reserve_names_in(promise_type),
            TypeKind::Record {
                key_type,
                value_type,
            } => {
                self.reserve_names_in(key_type);
                self.reserve_names_in(value_type);
            }
            TypeKind::Function {
                function_params,
                function_return_type,
            } => {
                for param in function_params {
                    self.reserve_names_in(param);
                }
                self.reserve_names_in(function_return_type);
            }
            TypeKind::Enum => self.reserve(&ty.name),
            TypeKind::Unknown if ty.name.contains('.') || is_named_alias(ty) => {
                self.reserve(&ty.name)
            }
            TypeKind::Unknown | TypeKind::Primitive => {}
        }
    }

    fn reserve(&mut self, name: &str) {
        let clean = extract_clean_name(name);
        if !clean.is_empty() && clean != "__type" {
            self.reserved.insert(clean);
        }
    }

    /// `base`, or `base2`, `base3`, ... when source already declares `base`
    fn synthesized_name(&self, base: String) -> String {
        if !self.reserved.contains(&base) {
            return base;
        }
        let name = (2..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !self.reserved.contains(candidate))
            .unwrap_or_default();
        tracing::debug!(
            declared = %base,
            synthesized = %name,
            "synthesized name taken by a source type"
        );
        name
    }

    fn collect_api(&mut self, api: &ParsedApi) -> ApiTypes {
        let api_prefix = capitalize(&api.name);

        let parameters = api
            .parameters
            .iter()
            .map(|p| self.parameter_type(&api_prefix, p))
            .collect();

        let return_type = self.collect_return(api, &api_prefix);

        let callback_data = if api.is_callback_based {
            api.parameters
                .first()
                .and_then(|p| p.ty.property("onEvent"))
                .and_then(|on_event| match &on_event.ty.kind {
                    TypeKind::Function {
                        function_params, ..
                    } => function_params.first(),
                    _ => None,
                })
                .map(|data| self.payload_type(data, &format!("{}Event", api_prefix)))
        } else {
            None
        };

        let event_data = api
            .event
            .as_ref()
            .and_then(|e| e.data_type.as_ref())
            .map(|data| self.payload_type(data, &format!("{}Data", api_prefix)));

        ApiTypes {
            parameters,
            return_type,
            callback_data,
            event_data,
        }
    }

    fn collect_return(&mut self, api: &ParsedApi, api_prefix: &str) -> FieldType {
        let inner = api.return_type.unwrap_promise();
        let result_name = format!("{}Result", api_prefix);

        if let Some(union) = inner.discriminated() {
            let class_name = self.synthesized_name(format!("{}Result", api.pascal_name));
            let success = &union.success_type;
            let success = if success.is_anonymous() && success.has_properties() {
                let name = self.synthesized_name(format!("{}Success", api.pascal_name));
                self.collect_class(&name, success.properties(), false);
                FieldType::Named(name)
            } else {
                self.walk_referenced(success);
                FieldType::Source(success.as_ref().clone())
            };
            self.collection
                .union_results
                .entry(class_name.clone())
                .or_insert_with(|| UnionResult {
                    class_name: class_name.clone(),
                    api_name: api.pascal_name.clone(),
                    success,
                    error_codes: union.error_codes.clone(),
                });
            return FieldType::Named(class_name);
        }

        match &inner.kind {
            TypeKind::Object { properties, .. } if !properties.is_empty() => {
                if inner.is_anonymous() {
                    let name = self.synthesized_name(result_name);
                    self.collect_class(&name, properties, true);
                    FieldType::Named(name)
                } else {
                    self.ensure_named(inner, true);
                    FieldType::Source(inner.clone())
                }
            }
            TypeKind::Union { union_types, .. } => {
                let with_props: Vec<&ParsedType> =
                    union_types.iter().filter(|t| t.has_properties()).collect();
                if with_props.is_empty() {
                    self.walk_referenced(inner);
                    FieldType::Source(inner.clone())
                } else if is_named_alias(inner) {
                    self.collect_class(&inner.name, &merge_members(&with_props), true);
                    FieldType::Source(inner.clone())
                } else if with_props.iter().all(|t| !t.is_anonymous()) {
                    for member in with_props {
                        self.ensure_named(member, true);
                    }
                    FieldType::Source(inner.clone())
                } else {
                    let name = self.synthesized_name(result_name);
                    self.collect_class(&name, &merge_members(&with_props), true);
                    FieldType::Named(name)
                }
            }
            TypeKind::Array { element_type }
                if element_type.is_anonymous() && element_type.has_properties() =>
            {
                let name = self.synthesized_name(format!("{}Item", result_name));
                self.collect_class(&name, element_type.properties(), false);
                FieldType::NamedArray(name)
            }
            _ => {
                self.walk_referenced(inner);
                FieldType::Source(inner.clone())
            }
        }
    }

    /// Event and callback payloads: anonymous shapes get `fallback_name`
    fn payload_type(&mut self, data: &ParsedType, fallback_name: &str) -> FieldType {
        if data.is_object() && data.has_properties() {
            if data.is_anonymous() {
                let name = self.synthesized_name(fallback_name.to_string());
                self.collect_class(&name, data.properties(), false);
                return FieldType::Named(name);
            }
            self.ensure_named(data, false);
            return FieldType::Source(data.clone());
        }
        self.walk_referenced(data);
        FieldType::Source(data.clone())
    }

    fn class_fields(&mut self, parent: Option<&str>, props: &[ParsedProperty]) -> Vec<CollectedField> {
        props
            .iter()
            .map(|prop| CollectedField {
                name: prop.name.clone(),
                field_type: self.field_type(parent, &prop.name, &prop.ty),
                optional: prop.optional,
                description: prop.description.clone(),
            })
            .collect()
    }

    /// Literal unions stay strings at the top level of a signature
    fn parameter_type(&mut self, api_prefix: &str, param: &ParsedParameter) -> FieldType {
        if literal_values(&param.ty).is_some() {
            let clean = extract_clean_name(&param.ty.name);
            if is_named_alias(&param.ty) && self.is_known(&clean) {
                return FieldType::Named(clean);
            }
            return FieldType::Source(param.ty.clone());
        }
        self.field_type(Some(api_prefix), &param.name, &param.ty)
    }

    /// Type of a property or parameter named `slot` inside `parent`
    fn field_type(&mut self, parent: Option<&str>, slot: &str, ty: &ParsedType) -> FieldType {
        if let Some(values) = literal_values(ty) {
            let clean = extract_clean_name(&ty.name);
            if is_named_alias(ty) && self.is_known(&clean) {
                return FieldType::Named(clean);
            }
            let enum_name = self.synthesized_name(nested_name(parent, slot, "Type"));
            self.collection
                .inline_enums
                .entry(enum_name.clone())
                .or_insert(values);
            return FieldType::Named(enum_name);
        }

        match &ty.kind {
            TypeKind::Object { properties, .. } if ty.is_anonymous() => {
                if properties.is_empty() {
                    return FieldType::Source(ty.clone());
                }
                let name = self.synthesized_name(nested_name(parent, slot, "Type"));
                self.collect_class(&name, properties, false);
                FieldType::Named(name)
            }
            TypeKind::Object { .. } => {
                self.ensure_named(ty, false);
                FieldType::Source(ty.clone())
            }
            TypeKind::Array { element_type }
                if element_type.is_object()
                    && element_type.is_anonymous()
                    && element_type.has_properties() =>
            {
                let name = self.synthesized_name(nested_name(parent, &singularize(slot), "Item"));
                self.collect_class(&name, element_type.properties(), false);
                FieldType::NamedArray(name)
            }
            TypeKind::Union { union_types, .. } => {
                let with_props: Vec<&ParsedType> =
                    union_types.iter().filter(|t| t.has_properties()).collect();
                if with_props.is_empty() {
                    self.walk_referenced(ty);
                    return FieldType::Source(ty.clone());
                }
                let name = if is_named_alias(ty) {
                    let clean = extract_clean_name(&ty.name);
                    if self.is_known(&clean) {
                        return FieldType::Named(clean);
                    }
                    clean
                } else {
                    self.synthesized_name(nested_name(parent, slot, "Type"))
                };
                self.collect_class(&name, &merge_members(&with_props), false);
                FieldType::Named(name)
            }
            _ => {
                self.walk_referenced(ty);
                FieldType::Source(ty.clone())
            }
        }
    }

    /// Collect named types reachable from `ty` without naming anything after a slot
    fn walk_referenced(&mut self, ty: &ParsedType) {
        match &ty.kind {
            TypeKind::Object { properties, .. } => {
                if !ty.is_anonymous() {
                    self.ensure_named(ty, false);
                } else if !properties.is_empty() {
                    let _ = self.class_fields(None, properties);
                }
            }
            TypeKind::Array { element_type } => self.walk_referenced(element_type),
            TypeKind::Promise { promise_type } => self.walk_referenced(promise_type),
            TypeKind::Record { value_type, .. } => self.walk_referenced(value_type),
            TypeKind::Function {
                function_params,
                function_return_type,
            } => {
                for param in function_params {
                    self.walk_referenced(param);
                }
                self.walk_referenced(function_return_type);
            }
            TypeKind::Union { union_types, .. } => {
                if is_named_alias(ty) {
                    let with_props: Vec<&ParsedType> =
                        union_types.iter().filter(|t| t.has_properties()).collect();
                    if !with_props.is_empty() {
                        self.collect_class(&ty.name, &merge_members(&with_props), false);
                    }
                }
                for member in union_types {
                    self.walk_referenced(member);
                }
            }
            TypeKind::Unknown => self.queue_external(&ty.name),
            TypeKind::Primitive | TypeKind::Enum => {}
        }
    }

    fn ensure_named(&mut self, ty: &ParsedType, is_result_type: bool) {
        if ty.has_properties() {
            self.collect_class(&ty.name, ty.properties(), is_result_type);
            return;
        }
        let clean = extract_clean_name(&ty.name);
        if !clean.is_empty() && !self.is_known(&clean) {
            self.pending.insert(clean);
        }
    }

    /// `import("x").Name` style references the parser could not resolve
    fn queue_external(&mut self, name: &str) {
        if !name.contains('.') {
            return;
        }
        let clean = extract_clean_name(name);
        if clean.is_empty() || clean == "__type" || clean == "undefined" || self.is_known(&clean) {
            return;
        }
        self.pending.insert(clean);
    }

    fn collect_class(&mut self, name: &str, props: &[ParsedProperty], is_result_type: bool) {
        let key = extract_clean_name(name);
        if self.exclude.contains(&key) {
            return;
        }
        if let Some(existing) = self.collection.types.get(&key) {
            let diverges = !self.building.contains(&key)
                && !existing.is_stub()
                && !same_shape(existing.fields(), props);
            if diverges && self.warned.insert(key.clone()) {
                tracing::warn!(name = %key, "type collected twice with different shapes, keeping first");
                self.collection.diagnostics.push(
                    Diagnostic::warning(format!(
                        "{} is declared with different shapes; the first one is kept",
                        key
                    ))
                    .with_code(codes::DIVERGENT_MERGE),
                );
            }
            return;
        }

        // Placeholder first so recursive references see the name as taken
        self.collection.types.insert(
            key.clone(),
            CollectedType {
                name: key.clone(),
                kind: CollectedKind::Class {
                    fields: Vec::new(),
                    is_result_type,
                },
                description: None,
            },
        );
        self.building.insert(key.clone());
        let fields = self.class_fields(Some(&key), props);
        self.building.remove(&key);

        if let Some(entry) = self.collection.types.get_mut(&key) {
            entry.kind = CollectedKind::Class {
                fields,
                is_result_type,
            };
        }
    }

    fn is_known(&self, clean: &str) -> bool {
        self.exclude.contains(clean) || self.collection.types.contains_key(clean)
    }

    fn resolve_pending(
        &mut self,
        definitions: &[ParsedTypeDefinition],
        resolver: &dyn ExternalResolver,
    ) {
        let mut unresolved: IndexSet<String> = IndexSet::new();

        for pass in 0..MAX_RESOLVE_PASSES {
            if self.pending.is_empty() {
                break;
            }
            let batch = std::mem::take(&mut self.pending);
            tracing::debug!(pass, pending = batch.len(), "resolving external types");

            for name in batch {
                if self.is_known(&name) {
                    continue;
                }
                let local = definitions
                    .iter()
                    .find(|d| d.name == name && d.kind == DefinitionKind::Interface)
                    .filter(|d| !d.properties.is_empty())
                    .cloned();
                let found = local.or_else(|| {
                    resolver
                        .resolve(&name)
                        .filter(|d| d.kind == DefinitionKind::Interface && !d.properties.is_empty())
                });
                match found {
                    Some(def) => {
                        tracing::debug!(name = %name, file = %def.file.display(), "resolved external type");
                        self.collect_class(&name, &def.properties, false);
                        unresolved.shift_remove(&name);
                    }
                    None => {
                        unresolved.insert(name);
                    }
                }
            }
        }
        unresolved.extend(std::mem::take(&mut self.pending));

        for name in unresolved {
            if self.is_known(&name) {
                continue;
            }
            tracing::info!(name = %name, "generating stub for unresolved type");
            self.collection.diagnostics.push(
                Diagnostic::info(format!("{} could not be resolved; emitted an empty stub", name))
                    .with_code(codes::STUB),
            );
            self.collection.types.insert(
                name.clone(),
                CollectedType {
                    name,
                    kind: CollectedKind::Stub,
                    description: None,
                },
            );
        }
    }
}

/// `Parent` + `Slot`, or `Slot` + `suffix` at the top level
fn nested_name(parent: Option<&str>, slot: &str, suffix: &str) -> String {
    match parent {
        Some(parent) => format!("{}{}", parent, capitalize(slot)),
        None => format!("{}{}", capitalize(slot), suffix),
    }
}

/// A union written under an alias name rather than inline
fn is_named_alias(ty: &ParsedType) -> bool {
    let mut chars = ty.name.chars();
    !ty.is_anonymous()
        && chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Values of a string-literal union, ignoring `null`/`undefined` members
fn literal_values(ty: &ParsedType) -> Option<Vec<String>> {
    let members: Vec<&ParsedType> = ty
        .union_types()
        .iter()
        .filter(|t| !t.is_null_or_undefined())
        .collect();
    if members.is_empty() || !members.iter().all(|t| t.is_string_literal()) {
        return None;
    }
    let mut values: Vec<String> = Vec::with_capacity(members.len());
    for member in members {
        let value = strip_quotes(&member.raw);
        if !values.contains(&value) {
            values.push(value);
        }
    }
    Some(values)
}

/// First-seen-wins union of member properties; absent-somewhere means optional
fn merge_members(members: &[&ParsedType]) -> Vec<ParsedProperty> {
    let mut merged: Vec<ParsedProperty> = Vec::new();
    for member in members {
        for prop in member.properties() {
            if !merged.iter().any(|p| p.name == prop.name) {
                merged.push(prop.clone());
            }
        }
    }
    if members.len() > 1 {
        for prop in &mut merged {
            if !members.iter().all(|m| m.property(&prop.name).is_some()) {
                prop.optional = true;
            }
        }
    }
    merged
}

fn same_shape(fields: &[CollectedField], props: &[ParsedProperty]) -> bool {
    let existing: HashSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let incoming: HashSet<&str> = props.iter().map(|p| p.name.as_str()).collect();
    existing == incoming
}
