//! Top-level enums and interfaces
//!
//! These are emitted as-is into the types file, ahead of anything the
//! collector synthesizes. Barrels are included since shared enums often live
//! in `types.d.ts`.

use crate::js_doc::ApiDoc;
use crate::source_set::SourceSet;
use crate::type_parser::{merge_properties, TypeParser};
use crate::types::{
    DefinitionKind, EnumValue, ParsedProperty, ParsedType, ParsedTypeDefinition, TypeKind,
};
use crate::utils::naming::clean_type_name;
use crate::utils::swc::{enum_member_name, wtf8_to_string, ParsedModule, TopLevelDecl};
use deno_ast::swc::ast as swc_ast;
use indexmap::IndexMap;

/// Collect every enum and interface definition, first name wins
pub fn parse_type_definitions(sources: &SourceSet) -> Vec<ParsedTypeDefinition> {
    let mut parser = TypeParser::new(sources);
    let mut definitions: IndexMap<String, ParsedTypeDefinition> = IndexMap::new();

    for module in &sources.modules {
        let Ok(decls) = module.top_level_decls() else {
            continue;
        };
        for top in &decls {
            let Some(definition) = definition_for(&mut parser, module, top) else {
                continue;
            };
            if definitions.contains_key(&definition.name) {
                tracing::trace!(name = %definition.name, "type definition already seen");
                continue;
            }
            definitions.insert(definition.name.clone(), definition);
        }
    }

    tracing::debug!(count = definitions.len(), "parsed type definitions");
    definitions.into_values().collect()
}

fn definition_for(
    parser: &mut TypeParser<'_>,
    module: &ParsedModule,
    top: &TopLevelDecl<'_>,
) -> Option<ParsedTypeDefinition> {
    let description = ApiDoc::parse_opt(module.jsdoc_for_span(top.span).as_deref())
        .summary()
        .map(str::to_string);

    let definition = match top.decl {
        swc_ast::Decl::TsEnum(e) => ParsedTypeDefinition {
            name: e.id.sym.to_string(),
            kind: DefinitionKind::Enum,
            file: module.path().to_path_buf(),
            description,
            enum_values: enum_values(&e.members),
            properties: Vec::new(),
        },
        swc_ast::Decl::TsTypeAlias(alias) => {
            let name = clean_type_name(&alias.id.sym);
            if let Some(values) = literal_union_values(&alias.type_ann) {
                ParsedTypeDefinition {
                    name,
                    kind: DefinitionKind::Enum,
                    file: module.path().to_path_buf(),
                    description,
                    enum_values: values.into_iter().map(EnumValue::Text).collect(),
                    properties: Vec::new(),
                }
            } else if top.exported && alias.type_params.is_none() {
                let parsed = parser.parse(module, &alias.type_ann);
                let properties = merge_discriminated_objects(&parsed)?;
                ParsedTypeDefinition {
                    name,
                    kind: DefinitionKind::Interface,
                    file: module.path().to_path_buf(),
                    description,
                    enum_values: Vec::new(),
                    properties,
                }
            } else {
                return None;
            }
        }
        swc_ast::Decl::TsInterface(iface) if top.exported && iface.type_params.is_none() => {
            let name = iface.id.sym.to_string();
            let parsed = parser.resolve_name(&name)?;
            if !parsed.is_object() {
                return None;
            }
            ParsedTypeDefinition {
                name,
                kind: DefinitionKind::Interface,
                file: module.path().to_path_buf(),
                description,
                enum_values: Vec::new(),
                properties: parsed.properties().to_vec(),
            }
        }
        _ => return None,
    };
    Some(definition)
}

/// Enum members in declaration order; unset members after a numeric one count up
fn enum_values(members: &[swc_ast::TsEnumMember]) -> Vec<EnumValue> {
    let mut values = Vec::with_capacity(members.len());
    let mut next_numeric: Option<i64> = None;

    for member in members {
        let name = enum_member_name(&member.id);
        let value = match member.init.as_deref().and_then(numeric_initializer) {
            Some(value) => EnumValue::Numeric { name, value },
            None => match member.init.as_deref() {
                Some(swc_ast::Expr::Lit(swc_ast::Lit::Str(s))) => EnumValue::Text(wtf8_to_string(s)),
                Some(swc_ast::Expr::Tpl(tpl)) if tpl.exprs.is_empty() => EnumValue::Text(
                    tpl.quasis
                        .iter()
                        .map(|q| q.raw.to_string())
                        .collect::<String>(),
                ),
                _ => match next_numeric {
                    Some(value) => EnumValue::Numeric { name, value },
                    None => EnumValue::Text(name),
                },
            },
        };
        next_numeric = match &value {
            EnumValue::Numeric { value, .. } => Some(value + 1),
            EnumValue::Text(_) => None,
        };
        values.push(value);
    }
    values
}

fn numeric_initializer(expr: &swc_ast::Expr) -> Option<i64> {
    match expr {
        swc_ast::Expr::Lit(swc_ast::Lit::Num(n)) => Some(n.value as i64),
        swc_ast::Expr::Unary(u) if u.op == swc_ast::UnaryOp::Minus => {
            numeric_initializer(&u.arg).map(|v| -v)
        }
        swc_ast::Expr::Paren(p) => numeric_initializer(&p.expr),
        _ => None,
    }
}

/// Values of `'a' | 'b' | 'c'`, or `None` if any member is not a string literal
fn literal_union_values(ty: &swc_ast::TsType) -> Option<Vec<String>> {
    let swc_ast::TsType::TsUnionOrIntersectionType(swc_ast::TsUnionOrIntersectionType::TsUnionType(
        union,
    )) = ty
    else {
        return None;
    };
    let mut values = Vec::with_capacity(union.types.len());
    for member in &union.types {
        match member.as_ref() {
            swc_ast::TsType::TsLitType(swc_ast::TsLitType {
                lit: swc_ast::TsLit::Str(s),
                ..
            }) => {
                let value = wtf8_to_string(s);
                if !values.contains(&value) {
                    values.push(value);
                }
            }
            _ => return None,
        }
    }
    Some(values)
}

/// Union of object shapes tagged by a shared string-literal property
///
/// Properties missing from some member become optional and the
/// discriminator itself is typed as `string`.
fn merge_discriminated_objects(parsed: &ParsedType) -> Option<Vec<ParsedProperty>> {
    let TypeKind::Union {
        union_types,
        discriminated: None,
    } = &parsed.kind
    else {
        return None;
    };
    if union_types.len() < 2 || !union_types.iter().all(ParsedType::is_object) {
        return None;
    }

    let first = &union_types[0];
    let discriminator = first.properties().iter().find(|p| {
        p.ty.is_string_literal()
            && union_types.iter().all(|member| {
                member
                    .property(&p.name)
                    .is_some_and(|other| other.ty.is_string_literal())
            })
    })?;
    let discriminator_name = discriminator.name.clone();

    let mut merged: Vec<ParsedProperty> = Vec::new();
    for member in union_types {
        merge_properties(&mut merged, member.properties().iter().cloned());
    }
    for prop in &mut merged {
        if prop.name == discriminator_name {
            prop.ty = ParsedType::primitive("string");
            prop.optional = false;
            continue;
        }
        let everywhere = union_types
            .iter()
            .all(|member| member.property(&prop.name).is_some());
        if !everywhere {
            prop.optional = true;
        }
    }
    tracing::trace!(
        discriminator = %discriminator_name,
        fields = merged.len(),
        "merged discriminated object union"
    );
    Some(merged)
}
