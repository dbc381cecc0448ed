//! Template data for `AIT.Types.cs`
//!
//! Entries come out in emission order: inline enums, union result wrappers,
//! collected classes (stubs included), then the type definitions in source
//! order. A name is emitted once; later entries with the same name are dropped.

use super::mapping::field_csharp_type;
use crate::collector::{CollectedType, TypeCollection, UnionResult};
use crate::types::{DefinitionKind, EnumValue, ParsedTypeDefinition};
use crate::utils::naming::{enum_member_identifier, escape_csharp_keyword, to_pascal_case};
use indexmap::IndexSet;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldData {
    /// C# field name
    pub name: String,
    /// Property name on the wire
    pub json_name: String,
    pub needs_json_property: bool,
    pub csharp_type: String,
    pub is_action: bool,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassData {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldData>,
    pub is_result_type: bool,
    pub is_stub: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMemberData {
    pub identifier: String,
    /// Wire string, or the numeric value as text
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumData {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_numeric: bool,
    pub members: Vec<EnumMemberData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCodeData {
    pub identifier: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionResultData {
    pub class_name: String,
    pub api_name: String,
    pub success_type: String,
    pub errors: Vec<ErrorCodeData>,
}

/// One block of the types file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeEntry {
    EnumType(EnumData),
    UnionResult(UnionResultData),
    ClassType(ClassData),
}

impl TypeEntry {
    pub fn name(&self) -> &str {
        match self {
            TypeEntry::EnumType(e) => &e.name,
            TypeEntry::UnionResult(u) => &u.class_name,
            TypeEntry::ClassType(c) => &c.name,
        }
    }
}

/// C# identifier for a JSON property name
pub fn field_identifier(json_name: &str, class_name: &str) -> String {
    let pascal: String = to_pascal_case(json_name)
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    let ident = match pascal.chars().next() {
        None => "Value".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", pascal),
        Some(_) => pascal,
    };
    // A member may not share its enclosing type's name
    if ident == class_name {
        return format!("{}Value", ident);
    }
    escape_csharp_keyword(&ident)
}

pub fn class_data(collected: &CollectedType) -> ClassData {
    let fields = collected
        .fields()
        .iter()
        .map(|field| {
            let name = field_identifier(&field.name, &collected.name);
            let mut csharp_type = field_csharp_type(&field.field_type);
            if csharp_type == "void" {
                csharp_type = "object".to_string();
            }
            FieldData {
                needs_json_property: name != field.name,
                json_name: field.name.clone(),
                name,
                is_action: csharp_type.starts_with("System.Action"),
                csharp_type,
                optional: field.optional,
                description: field.description.clone(),
            }
        })
        .collect();
    ClassData {
        name: collected.name.clone(),
        description: collected.description.clone(),
        fields,
        is_result_type: collected.is_result_type(),
        is_stub: collected.is_stub(),
    }
}

/// Members with distinct identifiers; clashes get a numeric suffix
fn unique_members(members: impl IntoIterator<Item = (String, String)>) -> Vec<EnumMemberData> {
    let mut seen: IndexSet<String> = IndexSet::new();
    let mut out = Vec::new();
    for (identifier, value) in members {
        let mut candidate = identifier.clone();
        let mut n = 2;
        while seen.contains(&candidate) {
            candidate = format!("{}{}", identifier, n);
            n += 1;
        }
        seen.insert(candidate.clone());
        out.push(EnumMemberData {
            identifier: candidate,
            value,
        });
    }
    out
}

pub fn inline_enum_data(name: &str, values: &[String]) -> EnumData {
    EnumData {
        name: name.to_string(),
        description: None,
        is_numeric: false,
        members: unique_members(
            values
                .iter()
                .map(|v| (enum_member_identifier(v), v.clone())),
        ),
    }
}

pub fn definition_enum_data(def: &ParsedTypeDefinition) -> EnumData {
    let is_numeric = def
        .enum_values
        .iter()
        .any(|v| matches!(v, EnumValue::Numeric { .. }));
    let members = def.enum_values.iter().map(|value| match value {
        EnumValue::Numeric { name, value } => (escape_csharp_keyword(name), value.to_string()),
        // string members of a numeric enum have no number of their own
        EnumValue::Text(text) if is_numeric => (enum_member_identifier(text), "0".to_string()),
        EnumValue::Text(text) => (enum_member_identifier(text), text.clone()),
    });
    EnumData {
        name: def.name.clone(),
        description: def.description.clone(),
        is_numeric,
        members: unique_members(members),
    }
}

pub fn union_result_data(result: &UnionResult) -> UnionResultData {
    UnionResultData {
        class_name: result.class_name.clone(),
        api_name: result.api_name.clone(),
        success_type: field_csharp_type(&result.success),
        errors: result
            .error_codes
            .iter()
            .map(|code| ErrorCodeData {
                identifier: enum_member_identifier(code),
                value: code.clone(),
            })
            .collect(),
    }
}

/// Every block of the types file, in emission order
///
/// Declared enums and interfaces always keep their name; a synthesized
/// block under the same name is dropped.
pub fn type_entries(
    collection: &TypeCollection,
    definitions: &[ParsedTypeDefinition],
) -> Vec<TypeEntry> {
    let mut declared = Vec::new();
    for def in definitions {
        match def.kind {
            DefinitionKind::Enum if !def.enum_values.is_empty() => {
                declared.push(TypeEntry::EnumType(definition_enum_data(def)));
            }
            DefinitionKind::Interface => {
                if let Some(class) = collection.definition_classes.get(&def.name) {
                    declared.push(TypeEntry::ClassType(class_data(class)));
                }
            }
            DefinitionKind::Enum => {}
        }
    }

    let mut emitted: IndexSet<String> = declared
        .iter()
        .map(|entry| entry.name().to_string())
        .collect();
    let synthesized = collection
        .inline_enums
        .iter()
        .map(|(name, values)| TypeEntry::EnumType(inline_enum_data(name, values)))
        .chain(
            collection
                .union_results
                .values()
                .map(|r| TypeEntry::UnionResult(union_result_data(r))),
        )
        .chain(
            collection
                .types
                .values()
                .map(|t| TypeEntry::ClassType(class_data(t))),
        );

    let mut entries = Vec::new();
    for entry in synthesized {
        if emitted.insert(entry.name().to_string()) {
            entries.push(entry);
        } else {
            tracing::debug!(name = %entry.name(), "type already emitted, dropping duplicate");
        }
    }

    let mut seen_declared: IndexSet<String> = IndexSet::new();
    for entry in declared {
        if seen_declared.insert(entry.name().to_string()) {
            entries.push(entry);
        } else {
            tracing::debug!(name = %entry.name(), "type already emitted, dropping duplicate");
        }
    }
    entries
}

/// Names that are C# enums, for callback routing
pub fn enum_type_names(
    collection: &TypeCollection,
    definitions: &[ParsedTypeDefinition],
) -> IndexSet<String> {
    collection
        .inline_enums
        .keys()
        .cloned()
        .chain(
            definitions
                .iter()
                .filter(|d| d.kind == DefinitionKind::Enum && !d.enum_values.is_empty())
                .map(|d| d.name.clone()),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{CollectedField, CollectedKind, FieldType};
    use crate::types::ParsedType;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn class(name: &str, fields: Vec<CollectedField>, is_result_type: bool) -> CollectedType {
        CollectedType {
            name: name.to_string(),
            kind: CollectedKind::Class {
                fields,
                is_result_type,
            },
            description: None,
        }
    }

    fn field(name: &str, ty: FieldType, optional: bool) -> CollectedField {
        CollectedField {
            name: name.to_string(),
            field_type: ty,
            optional,
            description: None,
        }
    }

    #[test]
    fn test_field_identifiers() {
        assert_eq!(field_identifier("latitude", "Location"), "Latitude");
        assert_eq!(field_identifier("data-id", "Item"), "DataId");
        assert_eq!(field_identifier("2fa", "Item"), "_2fa");
        assert_eq!(field_identifier("location", "Location"), "LocationValue");
    }

    #[test]
    fn test_class_data() {
        let collected = class(
            "GetLocationResult",
            vec![
                field("latitude", FieldType::Source(ParsedType::primitive("number")), false),
                field("Mode", FieldType::Named("GetLocationResultMode".into()), true),
                field(
                    "onChange",
                    FieldType::Source(ParsedType::function(
                        vec![],
                        ParsedType::primitive("void"),
                        "() => void",
                    )),
                    false,
                ),
                field("extra", FieldType::Source(ParsedType::primitive("void")), true),
            ],
            true,
        );
        let data = class_data(&collected);
        assert!(data.is_result_type);
        let fields: Vec<(&str, &str, bool, bool)> = data
            .fields
            .iter()
            .map(|f| {
                (
                    f.name.as_str(),
                    f.csharp_type.as_str(),
                    f.needs_json_property,
                    f.is_action,
                )
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                ("Latitude", "double", true, false),
                ("Mode", "GetLocationResultMode", false, false),
                ("OnChange", "System.Action", true, true),
                ("Extra", "object", true, false),
            ]
        );
    }

    #[test]
    fn test_enum_data() {
        let inline = inline_enum_data(
            "Orientation",
            &["portrait-primary".into(), "landscape".into(), "Landscape".into()],
        );
        let idents: Vec<&str> = inline.members.iter().map(|m| m.identifier.as_str()).collect();
        assert_eq!(idents, vec!["PortraitPrimary", "Landscape", "Landscape2"]);

        let numeric = definition_enum_data(&ParsedTypeDefinition {
            name: "Accuracy".into(),
            kind: DefinitionKind::Enum,
            file: PathBuf::from("/tmp/a.d.ts"),
            description: None,
            enum_values: vec![
                EnumValue::Numeric { name: "Low".into(), value: 1 },
                EnumValue::Numeric { name: "High".into(), value: 4 },
            ],
            properties: vec![],
        });
        assert!(numeric.is_numeric);
        assert_eq!(numeric.members[1].value, "4");
    }

    #[test]
    fn test_entries_are_ordered_and_unique() {
        let mut collection = TypeCollection::default();
        collection
            .inline_enums
            .insert("ShareMode".into(), vec!["a".into(), "b".into()]);
        collection.union_results.insert(
            "GetKeyResult".into(),
            UnionResult {
                class_name: "GetKeyResult".into(),
                api_name: "getKey".into(),
                success: FieldType::Named("GetKeySuccess".into()),
                error_codes: vec!["INVALID_CATEGORY".into()],
            },
        );
        collection.types.insert(
            "GetKeySuccess".into(),
            class("GetKeySuccess", vec![], false),
        );
        collection
            .types
            .insert("ShareMode".into(), class("ShareMode", vec![], false));

        let entries = type_entries(&collection, &[]);
        let names: Vec<&str> = entries.iter().map(TypeEntry::name).collect();
        assert_eq!(names, vec!["ShareMode", "GetKeyResult", "GetKeySuccess"]);
        match &entries[1] {
            TypeEntry::UnionResult(u) => {
                assert_eq!(u.success_type, "GetKeySuccess");
                assert_eq!(u.errors[0].identifier, "INVALID_CATEGORY");
            }
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn test_mixed_enum_is_numeric() {
        let mixed = definition_enum_data(&ParsedTypeDefinition {
            name: "Accuracy".into(),
            kind: DefinitionKind::Enum,
            file: PathBuf::from("/tmp/a.d.ts"),
            description: None,
            enum_values: vec![
                EnumValue::Numeric { name: "Low".into(), value: 1 },
                EnumValue::Text("balanced".into()),
            ],
            properties: vec![],
        });
        assert!(mixed.is_numeric);
        let members: Vec<(&str, &str)> = mixed
            .members
            .iter()
            .map(|m| (m.identifier.as_str(), m.value.as_str()))
            .collect();
        assert_eq!(members, vec![("Low", "1"), ("Balanced", "0")]);
    }

    #[test]
    fn test_declared_enum_wins_over_inline_enum() {
        let mut collection = TypeCollection::default();
        collection
            .inline_enums
            .insert("SetOOptionsType".into(), vec!["x".into(), "y".into()]);
        let declared = ParsedTypeDefinition {
            name: "SetOOptionsType".into(),
            kind: DefinitionKind::Enum,
            file: PathBuf::from("/tmp/setO.d.ts"),
            description: None,
            enum_values: vec![
                EnumValue::Numeric { name: "A".into(), value: 1 },
                EnumValue::Numeric { name: "B".into(), value: 2 },
            ],
            properties: vec![],
        };

        let entries = type_entries(&collection, &[declared]);
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            TypeEntry::EnumType(e) => {
                assert!(e.is_numeric);
                assert_eq!(e.members[0].identifier, "A");
            }
            other => panic!("unexpected entry {:?}", other),
        }
    }
}
