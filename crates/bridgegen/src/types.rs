//! Type model
//!
//! A [`ParsedType`] is the generator's view of one TypeScript type
//! annotation after resolution. The variant set is closed: every consumer
//! matches on [`TypeKind`] exhaustively.
//!
//! Names carry meaning. `"__type"` and `"object"` mark anonymous shapes that
//! need a synthesized name before emission; anything else is a source name
//! (possibly dotted or with a `$N` suffix, see [`crate::utils::naming`]).

use serde::Serialize;
use std::path::PathBuf;

/// Name given to anonymous object shapes
pub const ANONYMOUS: &str = "__type";

/// Name given to object literals and opaque object-ish types
pub const OBJECT: &str = "object";

/// A resolved source type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedType {
    /// Display name
    pub name: String,
    /// Original source text, whitespace-normalized
    pub raw: String,
    /// Source union carried `null` or `undefined`
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_nullable: bool,
    #[serde(flatten)]
    pub kind: TypeKind,
}

/// Variant payloads
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeKind {
    Primitive,
    #[serde(rename_all = "camelCase")]
    Array { element_type: Box<ParsedType> },
    #[serde(rename_all = "camelCase")]
    Promise { promise_type: Box<ParsedType> },
    #[serde(rename_all = "camelCase")]
    Record {
        key_type: Box<ParsedType>,
        value_type: Box<ParsedType>,
    },
    #[serde(rename_all = "camelCase")]
    Union {
        union_types: Vec<ParsedType>,
        #[serde(skip_serializing_if = "Option::is_none")]
        discriminated: Option<DiscriminatedUnion>,
    },
    #[serde(rename_all = "camelCase")]
    Object {
        properties: Vec<ParsedProperty>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        is_intersection: bool,
    },
    #[serde(rename_all = "camelCase")]
    Function {
        function_params: Vec<ParsedType>,
        function_return_type: Box<ParsedType>,
    },
    /// Reference to a named enum or one of its members
    Enum,
    Unknown,
}

/// Success payload plus error codes of a discriminated union
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscriminatedUnion {
    pub success_type: Box<ParsedType>,
    /// Unquoted string literals, source order, no duplicates
    pub error_codes: Vec<String>,
}

impl ParsedType {
    pub fn new(name: impl Into<String>, raw: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
            is_nullable: false,
            kind,
        }
    }

    /// Primitive whose raw text equals its name
    pub fn primitive(name: &str) -> Self {
        Self::new(name, name, TypeKind::Primitive)
    }

    /// Primitive with distinct raw text (literals keep their quotes in `raw`)
    pub fn primitive_with_raw(name: &str, raw: impl Into<String>) -> Self {
        Self::new(name, raw, TypeKind::Primitive)
    }

    pub fn unknown(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self::new(raw.clone(), raw, TypeKind::Unknown)
    }

    pub fn object(name: impl Into<String>, raw: impl Into<String>, properties: Vec<ParsedProperty>) -> Self {
        Self::new(
            name,
            raw,
            TypeKind::Object {
                properties,
                is_intersection: false,
            },
        )
    }

    pub fn array(element: ParsedType, raw: impl Into<String>) -> Self {
        Self::new(
            "Array",
            raw,
            TypeKind::Array {
                element_type: Box::new(element),
            },
        )
    }

    pub fn promise(inner: ParsedType, raw: impl Into<String>) -> Self {
        Self::new(
            "Promise",
            raw,
            TypeKind::Promise {
                promise_type: Box::new(inner),
            },
        )
    }

    pub fn function(params: Vec<ParsedType>, ret: ParsedType, raw: impl Into<String>) -> Self {
        Self::new(
            "Function",
            raw,
            TypeKind::Function {
                function_params: params,
                function_return_type: Box::new(ret),
            },
        )
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    /// Short variant label for logs and diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            TypeKind::Primitive => "primitive",
            TypeKind::Array { .. } => "array",
            TypeKind::Promise { .. } => "promise",
            TypeKind::Record { .. } => "record",
            TypeKind::Union { .. } => "union",
            TypeKind::Object { .. } => "object",
            TypeKind::Function { .. } => "function",
            TypeKind::Enum => "enum",
            TypeKind::Unknown => "unknown",
        }
    }

    /// No source name: needs a synthesized one before emission
    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
            || self.name == ANONYMOUS
            || self.name == OBJECT
            || self.name.starts_with('{')
            || self.name.starts_with("__type$")
    }

    pub fn is_primitive(&self, name: &str) -> bool {
        matches!(self.kind, TypeKind::Primitive) && self.name == name
    }

    pub fn is_void(&self) -> bool {
        self.is_primitive("void") || self.is_primitive("undefined")
    }

    pub fn is_null_or_undefined(&self) -> bool {
        self.is_primitive("null") || self.is_primitive("undefined")
    }

    /// `"foo"` / `'foo'` literal, parsed as primitive string
    pub fn is_string_literal(&self) -> bool {
        self.is_primitive("string") && self.raw.starts_with(['"', '\''])
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Object { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, TypeKind::Function { .. })
    }

    /// Object properties, empty for non-objects
    pub fn properties(&self) -> &[ParsedProperty] {
        match &self.kind {
            TypeKind::Object { properties, .. } => properties,
            _ => &[],
        }
    }

    pub fn has_properties(&self) -> bool {
        !self.properties().is_empty()
    }

    pub fn property(&self, name: &str) -> Option<&ParsedProperty> {
        self.properties().iter().find(|p| p.name == name)
    }

    pub fn union_types(&self) -> &[ParsedType] {
        match &self.kind {
            TypeKind::Union { union_types, .. } => union_types,
            _ => &[],
        }
    }

    pub fn discriminated(&self) -> Option<&DiscriminatedUnion> {
        match &self.kind {
            TypeKind::Union { discriminated, .. } => discriminated.as_ref(),
            _ => None,
        }
    }

    pub fn is_discriminated_union(&self) -> bool {
        self.discriminated().is_some()
    }

    /// Inner type of a promise, or self
    pub fn unwrap_promise(&self) -> &ParsedType {
        match &self.kind {
            TypeKind::Promise { promise_type } => promise_type,
            _ => self,
        }
    }

    /// Return type of a function type
    pub fn function_return(&self) -> Option<&ParsedType> {
        match &self.kind {
            TypeKind::Function {
                function_return_type,
                ..
            } => Some(function_return_type),
            _ => None,
        }
    }

    /// Every member is a string literal
    pub fn is_string_literal_union(&self) -> bool {
        let members = self.union_types();
        !members.is_empty() && members.iter().all(ParsedType::is_string_literal)
    }
}

/// Property of an object type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParsedType,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParsedProperty {
    pub fn new(name: impl Into<String>, ty: ParsedType, optional: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            optional,
            description: None,
        }
    }
}

/// Parameter of an API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParsedType,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Event subscription metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub event_name: String,
    /// Payload delivered to `onEvent`, `None` for payload-less events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<ParsedType>,
}

/// One bridge API
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedApi {
    pub name: String,
    pub pascal_name: String,
    /// Name on the JS side (`window.AppsInToss.<original_name>`)
    pub original_name: String,
    pub category: String,
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    pub parameters: Vec<ParsedParameter>,
    pub return_type: ParsedType,
    pub is_async: bool,
    pub has_permission: bool,
    pub is_deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_message: Option<String>,
    /// Owning namespace object (`IAP.getProductItemList` -> `IAP`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub is_callback_based: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<EventInfo>,
}

impl ParsedApi {
    pub fn is_event_subscription(&self) -> bool {
        self.event.is_some()
    }
}

/// Kind of a top-level type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DefinitionKind {
    Enum,
    Interface,
}

/// Enum member value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnumValue {
    /// String-valued member; the wire value
    Text(String),
    /// `Name = 3`
    Numeric { name: String, value: i64 },
}

/// Top-level enum or interface found in the declaration files
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTypeDefinition {
    pub name: String,
    pub kind: DefinitionKind,
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<EnumValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<ParsedProperty>,
}

/// One rendered output file, relative to its output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFile {
    pub file_name: String,
    pub content: String,
}

impl GeneratedFile {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_anonymous_names() {
        assert!(ParsedType::object(ANONYMOUS, "{ a: string }", vec![]).is_anonymous());
        assert!(ParsedType::object(OBJECT, "{}", vec![]).is_anonymous());
        assert!(ParsedType::object("__type$3", "{}", vec![]).is_anonymous());
        assert!(!ParsedType::object("Location", "Location", vec![]).is_anonymous());
    }

    #[test]
    fn test_string_literal_union() {
        let union = ParsedType::new(
            "'a' | 'b'",
            "'a' | 'b'",
            TypeKind::Union {
                union_types: vec![
                    ParsedType::primitive_with_raw("string", "'a'"),
                    ParsedType::primitive_with_raw("string", "'b'"),
                ],
                discriminated: None,
            },
        );
        assert!(union.is_string_literal_union());
        assert!(!union.is_discriminated_union());
    }

    #[test]
    fn test_serialized_shape() {
        let ty = ParsedType::promise(ParsedType::primitive("string"), "Promise<string>");
        assert_eq!(
            serde_json::to_value(&ty).unwrap(),
            json!({
                "name": "Promise",
                "raw": "Promise<string>",
                "kind": "promise",
                "promiseType": { "name": "string", "raw": "string", "kind": "primitive" }
            })
        );
    }
}
