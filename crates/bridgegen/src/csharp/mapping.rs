//! Source type to C# type mapping
//!
//! The mapping is total: anything without a better answer becomes `object`.
//! Names produced here must agree with the keys the collector uses, so named
//! objects and unions go through [`extract_clean_name`].

use crate::collector::FieldType;
use crate::diagnostics::{codes, Diagnostic};
use crate::types::{ParsedApi, ParsedType, TypeKind};
use crate::utils::naming::extract_clean_name;

/// C# value types; only these take a `?` suffix
const VALUE_TYPES: &[&str] = &[
    "int", "double", "float", "bool", "long", "short", "byte", "char", "decimal", "DateTime",
];

/// Primitive names the C# side can represent
const SUPPORTED_PRIMITIVES: &[&str] = &[
    "string",
    "number",
    "boolean",
    "void",
    "any",
    "unknown",
    "object",
    "null",
    "undefined",
    "never",
    "Date",
    "ArrayBuffer",
    "Uint8Array",
    "Error",
];

/// Types a plain `DllImport` signature can pass without JSON
pub const MARSHALLED_PRIMITIVES: &[&str] = &["string", "double", "bool", "int", "float", "long"];

pub fn is_value_type(csharp: &str) -> bool {
    VALUE_TYPES.contains(&csharp)
}

fn primitive_csharp(name: &str) -> &str {
    match name {
        "string" => "string",
        "number" => "double",
        "boolean" => "bool",
        "void" | "any" | "undefined" => "void",
        "unknown" | "object" | "null" | "never" => "object",
        "Date" => "DateTime",
        "ArrayBuffer" | "Uint8Array" => "byte[]",
        "Error" => "Exception",
        other => other,
    }
}

/// Map a source type to its C# spelling
pub fn map_to_csharp_type(ty: &ParsedType) -> String {
    let base = map_core(ty);
    if ty.is_nullable && !base.ends_with('?') && !base.ends_with("[]") && is_value_type(&base) {
        return format!("{}?", base);
    }
    base
}

fn map_core(ty: &ParsedType) -> String {
    match &ty.kind {
        TypeKind::Primitive => primitive_csharp(&ty.name).to_string(),
        TypeKind::Promise { promise_type } => map_to_csharp_type(promise_type),
        TypeKind::Array { element_type } => format!("{}[]", map_to_csharp_type(element_type)),
        TypeKind::Object { .. } => named_or_object(ty),
        TypeKind::Union { union_types, .. } => {
            if !ty.is_anonymous() && !ty.name.contains(['|', '"', '\'']) {
                let clean = extract_clean_name(&ty.name);
                if !clean.is_empty() && clean != "__type" {
                    return clean;
                }
            }
            let named = union_types.iter().find(|t| {
                t.name != "undefined" && !t.is_anonymous() && !t.name.contains('|')
            });
            match named.or_else(|| union_types.iter().find(|t| t.name != "undefined")) {
                Some(member) => map_to_csharp_type(member),
                None => "object".to_string(),
            }
        }
        TypeKind::Function {
            function_params, ..
        } => {
            if function_params.is_empty() {
                "System.Action".to_string()
            } else {
                let params: Vec<String> = function_params.iter().map(map_to_csharp_type).collect();
                format!("System.Action<{}>", params.join(", "))
            }
        }
        TypeKind::Record {
            key_type,
            value_type,
        } => {
            let key = map_to_csharp_type(key_type);
            let value = match &value_type.kind {
                TypeKind::Union { .. } => "object".to_string(),
                _ if value_type.is_primitive("never") => "object".to_string(),
                _ => map_to_csharp_type(value_type),
            };
            format!("Dictionary<{}, {}>", key, value)
        }
        TypeKind::Enum => extract_clean_name(&ty.name),
        TypeKind::Unknown => {
            if ty.name.contains('.') {
                let clean = extract_clean_name(&ty.name);
                if !clean.is_empty() && clean != "__type" && clean != "undefined" {
                    return clean;
                }
            }
            "object".to_string()
        }
    }
}

fn named_or_object(ty: &ParsedType) -> String {
    let last = ty.name.rsplit('.').next().unwrap_or(&ty.name).trim();
    if ty.is_anonymous() || last.starts_with('{') || last.contains(':') {
        return "object".to_string();
    }
    let clean = extract_clean_name(&ty.name);
    if clean.is_empty() || clean == "__type" {
        "object".to_string()
    } else {
        clean
    }
}

/// C# spelling of a collected field or signature slot
pub fn field_csharp_type(field: &FieldType) -> String {
    match field {
        FieldType::Source(ty) => map_to_csharp_type(ty),
        FieldType::Named(name) => name.clone(),
        FieldType::NamedArray(name) => format!("{}[]", name),
    }
}

/// Whether the C# side has a representation for a source type
pub fn is_type_supported(ty: &ParsedType) -> bool {
    match &ty.kind {
        TypeKind::Primitive => SUPPORTED_PRIMITIVES.contains(&ty.name.as_str()),
        TypeKind::Promise { promise_type } => is_type_supported(promise_type),
        TypeKind::Array { element_type } => is_type_supported(element_type),
        TypeKind::Object { properties, .. } => {
            properties.iter().all(|p| is_type_supported(&p.ty))
        }
        TypeKind::Union {
            union_types,
            discriminated,
        } => discriminated.is_some() || union_types.iter().all(is_type_supported),
        TypeKind::Function { .. } | TypeKind::Enum => true,
        TypeKind::Record {
            key_type,
            value_type,
        } => is_type_supported(key_type) && is_type_supported(value_type),
        TypeKind::Unknown => ty.is_nullable && !ty.name.is_empty() && !ty.name.contains('|'),
    }
}

/// One error diagnostic per unsupported parameter or return type
pub fn validate_apis(apis: &[ParsedApi]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for api in apis {
        for param in &api.parameters {
            if !is_type_supported(&param.ty) {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "{}: parameter '{}' has unsupported type `{}` ({})",
                        api.name,
                        param.name,
                        param.ty.raw,
                        param.ty.kind_name()
                    ))
                    .in_file(&api.file)
                    .with_code(codes::UNSUPPORTED_TYPE),
                );
            }
        }
        if !is_type_supported(&api.return_type) {
            diagnostics.push(
                Diagnostic::error(format!(
                    "{}: unsupported return type `{}` ({})",
                    api.name,
                    api.return_type.raw,
                    api.return_type.kind_name()
                ))
                .in_file(&api.file)
                .with_code(codes::UNSUPPORTED_TYPE),
            );
        }
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_set::SourceSet;
    use crate::type_parser::TypeParser;

    fn map(text: &str) -> String {
        let set = SourceSet::from_sources([(
            "/tmp/types.d.ts",
            r#"
            export interface Location { latitude: number }
            export type Mode = 'a' | 'b';
            export enum Accuracy { Low = 1, High = 2 }
            export type Shape = { kind: 'a'; x: number } | { kind: 'b'; y: number };
            "#,
        )]);
        let mut parser = TypeParser::new(&set);
        map_to_csharp_type(&parser.parse_type_str(text))
    }

    #[test]
    fn test_primitives_and_builtins() {
        assert_eq!(map("string"), "string");
        assert_eq!(map("number"), "double");
        assert_eq!(map("boolean"), "bool");
        assert_eq!(map("void"), "void");
        assert_eq!(map("any"), "void");
        assert_eq!(map("unknown"), "object");
        assert_eq!(map("Date"), "DateTime");
        assert_eq!(map("ArrayBuffer"), "byte[]");
        assert_eq!(map("Uint8Array"), "byte[]");
        assert_eq!(map("Error"), "Exception");
    }

    #[test]
    fn test_nullable_value_types() {
        assert_eq!(map("number | undefined"), "double?");
        assert_eq!(map("boolean | null"), "bool?");
        assert_eq!(map("string | undefined"), "string");
        assert_eq!(map("number[] | null"), "double[]");
    }

    #[test]
    fn test_containers() {
        assert_eq!(map("string[]"), "string[]");
        assert_eq!(map("Promise<Location>"), "Location");
        assert_eq!(map("Promise<void>"), "void");
        assert_eq!(map("Record<string, number>"), "Dictionary<string, double>");
        assert_eq!(map("Record<string, string | number>"), "Dictionary<string, object>");
        assert_eq!(map("() => void"), "System.Action");
        assert_eq!(map("(a: string, b: number) => void"), "System.Action<string, double>");
    }

    #[test]
    fn test_named_types() {
        assert_eq!(map("Location"), "Location");
        assert_eq!(map("{ a: string }"), "object");
        assert_eq!(map("Mode"), "Mode");
        assert_eq!(map("Accuracy"), "Accuracy");
        assert_eq!(map("Shape"), "Shape");
        assert_eq!(map("Location | string"), "Location");
    }

    #[test]
    fn test_field_types() {
        assert_eq!(field_csharp_type(&FieldType::Named("A".into())), "A");
        assert_eq!(field_csharp_type(&FieldType::NamedArray("A".into())), "A[]");
        assert_eq!(
            field_csharp_type(&FieldType::Source(ParsedType::primitive("number"))),
            "double"
        );
    }

    #[test]
    fn test_supported_types() {
        let set = SourceSet::default();
        let mut parser = TypeParser::new(&set);
        assert!(is_type_supported(&parser.parse_type_str("Promise<{ a: Date }>")));
        assert!(is_type_supported(&parser.parse_type_str("'A' | 'B'")));
        assert!(!is_type_supported(&parser.parse_type_str("[string, number]")));
        assert!(!is_type_supported(&parser.parse_type_str("{ s: symbol }")));
    }
}
