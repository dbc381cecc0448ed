//! Template data for one API
//!
//! [`PreparedApi`] is the contract between the generator and the templates:
//! every string a template prints is computed here, so templates only branch
//! on flags. Serialized with camelCase keys.

use super::mapping::{field_csharp_type, MARSHALLED_PRIMITIVES};
use crate::collector::{ApiTypes, FieldType, TypeCollection};
use crate::types::ParsedApi;
use crate::utils::naming::{collapse_whitespace, escape_csharp_keyword};
use indexmap::IndexMap;
use serde::Serialize;

/// Names of the callback members in callback-based APIs
const CALLBACK_MEMBERS: &[&str] = &["onEvent", "onError"];

/// One parameter as it appears in C# and in the jslib glue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedParameter {
    /// C# identifier, keyword-escaped
    pub param_name: String,
    /// Name on the JavaScript side
    pub js_name: String,
    pub param_type: String,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Passed to `DllImport` as-is rather than as JSON
    pub is_primitive: bool,
    /// Type in the `extern` declaration
    pub extern_type: String,
    /// C# argument expression for the `extern` call
    pub call_arg: String,
    /// JavaScript expression decoding the argument
    pub js_arg: String,
    /// Index in the source signature
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionInfo {
    pub success_type: String,
    pub error_codes: Vec<String>,
}

/// Everything the API templates need
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedApi {
    pub name: String,
    pub pascal_name: String,
    pub original_name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_description: Option<String>,
    pub examples: Vec<String>,
    /// Sorted with optional parameters last
    pub parameters: Vec<PreparedParameter>,
    /// JavaScript call arguments in source order
    pub js_call_args: String,
    /// Function the jslib glue calls (`window.AppsInToss.IAP.getProductItemList`)
    pub js_target: String,
    pub return_type: String,
    /// Type delivered to the C# callback
    pub callback_type: String,
    pub is_void_return: bool,
    pub is_async: bool,
    pub is_nullable_return: bool,
    pub is_discriminated_union: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub union_info: Option<UnionInfo>,
    pub is_deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_message: Option<String>,
    pub is_event_subscription: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub has_event_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_data_type: Option<String>,
    pub is_callback_based: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_event_type: Option<String>,
    pub has_callback_event_data: bool,
    pub has_permission: bool,
}

impl PreparedApi {
    pub fn new(api: &ParsedApi, collection: &TypeCollection) -> Self {
        let fallback;
        let types = match collection.api(&api.name) {
            Some(types) => types,
            None => {
                tracing::debug!(api = %api.name, "no collected types, mapping directly");
                fallback = ApiTypes {
                    parameters: api
                        .parameters
                        .iter()
                        .map(|p| FieldType::Source(p.ty.clone()))
                        .collect(),
                    return_type: FieldType::Source(api.return_type.unwrap_promise().clone()),
                    callback_data: None,
                    event_data: None,
                };
                &fallback
            }
        };

        let parameters = if api.is_callback_based {
            callback_parameters(api, types, collection)
        } else {
            signature_parameters(api, types)
        };
        let js_call_args = if api.is_callback_based {
            callback_js_args(&parameters)
        } else {
            let mut in_order: Vec<&PreparedParameter> = parameters.iter().collect();
            in_order.sort_by_key(|p| p.position);
            in_order
                .iter()
                .map(|p| p.js_arg.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let inner = api.return_type.unwrap_promise();
        let discriminated = inner.discriminated();
        let callback_type = field_csharp_type(&types.return_type);
        let is_void_return = callback_type == "void";

        let union_info = discriminated.map(|union| {
            let success_type = collection
                .union_results
                .get(&callback_type)
                .map(|r| field_csharp_type(&r.success))
                .unwrap_or_else(|| super::mapping::map_to_csharp_type(&union.success_type));
            UnionInfo {
                success_type,
                error_codes: union.error_codes.clone(),
            }
        });

        let event_data_type = types.event_data.as_ref().map(field_csharp_type);
        let has_event_data = event_data_type
            .as_deref()
            .is_some_and(|t| t != "void" && t != "undefined");
        let callback_event_type = types.callback_data.as_ref().map(field_csharp_type);
        let has_callback_event_data = callback_event_type
            .as_deref()
            .is_some_and(|t| t != "void");

        let js_target = match &api.namespace {
            Some(ns) => format!("window.AppsInToss.{}.{}", ns, api.original_name),
            None => format!("window.AppsInToss.{}", api.original_name),
        };

        Self {
            name: api.name.clone(),
            pascal_name: api.pascal_name.clone(),
            original_name: api.original_name.clone(),
            category: api.category.clone(),
            namespace: api.namespace.clone(),
            description: api.description.clone(),
            return_description: api.return_description.clone(),
            examples: api.examples.clone(),
            parameters,
            js_call_args,
            js_target,
            return_type: super::mapping::map_to_csharp_type(&api.return_type),
            is_nullable_return: inner.is_nullable && !is_void_return,
            callback_type,
            is_void_return,
            is_async: api.is_async,
            is_discriminated_union: discriminated.is_some(),
            union_info,
            is_deprecated: api.is_deprecated,
            deprecated_message: api.deprecated_message.as_deref().map(obsolete_message),
            is_event_subscription: api.is_event_subscription(),
            event_name: api.event.as_ref().map(|e| e.event_name.clone()),
            has_event_data,
            event_data_type: if has_event_data { event_data_type } else { None },
            is_callback_based: api.is_callback_based,
            has_callback_event_data,
            callback_event_type: if has_callback_event_data {
                callback_event_type
            } else {
                None
            },
            has_permission: api.has_permission,
        }
    }
}

/// APIs grouped by category: configured order first, then alphabetical
pub fn group_by_category<'a>(
    apis: &'a [PreparedApi],
    category_order: &[String],
) -> Vec<(String, Vec<&'a PreparedApi>)> {
    let mut groups: IndexMap<&str, Vec<&PreparedApi>> = IndexMap::new();
    for api in apis {
        groups.entry(api.category.as_str()).or_default().push(api);
    }

    let mut ordered = Vec::with_capacity(groups.len());
    for category in category_order {
        if let Some(members) = groups.shift_remove(category.as_str()) {
            ordered.push((category.clone(), members));
        }
    }
    let mut rest: Vec<(&str, Vec<&PreparedApi>)> = groups.into_iter().collect();
    rest.sort_by(|a, b| a.0.cmp(b.0));
    ordered.extend(rest.into_iter().map(|(c, m)| (c.to_string(), m)));
    ordered
}

/// `[Obsolete("...")]` takes a single-line string literal
fn obsolete_message(message: &str) -> String {
    collapse_whitespace(message).replace('"', "\\\"")
}

fn prepared_parameter(
    position: usize,
    js_name: &str,
    csharp: String,
    optional: bool,
    description: Option<String>,
) -> PreparedParameter {
    let param_name = escape_csharp_keyword(js_name);
    let is_primitive = MARSHALLED_PRIMITIVES.contains(&csharp.as_str());
    let (extern_type, call_arg, js_arg) = if is_primitive {
        let js_arg = if csharp == "string" {
            format!("UTF8ToString({})", param_name)
        } else {
            param_name.clone()
        };
        (csharp.clone(), param_name.clone(), js_arg)
    } else {
        (
            "string".to_string(),
            format!("AITJsonSettings.Serialize({})", param_name),
            format!("JSON.parse(UTF8ToString({}))", param_name),
        )
    };
    PreparedParameter {
        param_name,
        js_name: js_name.to_string(),
        param_type: csharp,
        optional,
        description,
        is_primitive,
        extern_type,
        call_arg,
        js_arg,
        position,
    }
}

/// Declared parameters minus `void` ones, optional last
fn signature_parameters(api: &ParsedApi, types: &ApiTypes) -> Vec<PreparedParameter> {
    let mut parameters: Vec<PreparedParameter> = api
        .parameters
        .iter()
        .zip(&types.parameters)
        .enumerate()
        .filter_map(|(position, (param, field))| {
            let csharp = field_csharp_type(field);
            (csharp != "void").then(|| {
                prepared_parameter(
                    position,
                    &param.name,
                    csharp,
                    param.optional,
                    param.description.clone(),
                )
            })
        })
        .collect();
    // Stable: required parameters keep their relative order
    parameters.sort_by_key(|p| p.optional);
    parameters
}

/// Members of the single options object, without the callbacks
fn callback_parameters(
    api: &ParsedApi,
    types: &ApiTypes,
    collection: &TypeCollection,
) -> Vec<PreparedParameter> {
    let Some(class_name) = types.parameters.first().map(field_csharp_type) else {
        return Vec::new();
    };
    let mut parameters: Vec<PreparedParameter> = match collection.get(&class_name) {
        Some(class) => class
            .fields()
            .iter()
            .filter(|f| !CALLBACK_MEMBERS.contains(&f.name.as_str()))
            .enumerate()
            .map(|(position, field)| {
                prepared_parameter(
                    position,
                    &field.name,
                    field_csharp_type(&field.field_type),
                    field.optional,
                    field.description.clone(),
                )
            })
            .collect(),
        None => api
            .parameters
            .first()
            .map(|p| p.ty.properties())
            .unwrap_or_default()
            .iter()
            .filter(|p| !CALLBACK_MEMBERS.contains(&p.name.as_str()))
            .enumerate()
            .map(|(position, prop)| {
                prepared_parameter(
                    position,
                    &prop.name,
                    super::mapping::map_to_csharp_type(&prop.ty),
                    prop.optional,
                    prop.description.clone(),
                )
            })
            .collect(),
    };
    parameters.retain(|p| p.param_type != "void");
    parameters.sort_by_key(|p| p.optional);
    parameters
}

/// Options object literal passed to a callback-based API; callbacks are appended by the template
fn callback_js_args(parameters: &[PreparedParameter]) -> String {
    let mut in_order: Vec<&PreparedParameter> = parameters.iter().collect();
    in_order.sort_by_key(|p| p.position);
    in_order
        .iter()
        .map(|p| format!("{}: {}", p.js_name, p.js_arg))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_parser::{parse_apis, ApiParserOptions};
    use crate::collector::{NoExternalResolver, TypeCollector};
    use crate::source_set::SourceSet;
    use crate::type_defs::parse_type_definitions;
    use pretty_assertions::assert_eq;

    fn prepare(files: &[(&str, &str)]) -> Vec<PreparedApi> {
        let set = SourceSet::from_sources(files.iter().map(|(p, s)| (*p, s.to_string())));
        let scan = parse_apis(&set, ApiParserOptions::default());
        let defs = parse_type_definitions(&set);
        let collection = TypeCollector::collect(&scan.apis, &defs, &NoExternalResolver);
        scan.apis
            .iter()
            .map(|api| PreparedApi::new(api, &collection))
            .collect()
    }

    #[test]
    fn test_parameters_sorted_and_marshalled() {
        let apis = prepare(&[(
            "/tmp/share.d.ts",
            "export declare function share(count: number, options: { url: string }, title?: string): Promise<void>;",
        )]);
        let api = &apis[0];
        let names: Vec<&str> = api.parameters.iter().map(|p| p.param_name.as_str()).collect();
        assert_eq!(names, vec!["count", "options", "title"]);
        assert!(api.parameters[2].optional);
        assert_eq!(api.parameters[1].param_type, "ShareOptions");
        assert_eq!(api.parameters[1].extern_type, "string");
        assert_eq!(api.parameters[1].call_arg, "AITJsonSettings.Serialize(options)");
        assert!(api.parameters[0].is_primitive);
        assert_eq!(
            api.js_call_args,
            "count, JSON.parse(UTF8ToString(options)), UTF8ToString(title)"
        );
        assert!(api.is_void_return);
        assert_eq!(api.js_target, "window.AppsInToss.share");
    }

    #[test]
    fn test_literal_union_parameter_is_marshalled_as_string() {
        let apis = prepare(&[(
            "/tmp/setMode.d.ts",
            "export declare function setMode(mode: 'portrait' | 'landscape'): Promise<void>;",
        )]);
        let mode = &apis[0].parameters[0];
        assert_eq!(mode.param_type, "string");
        assert!(mode.is_primitive);
        assert_eq!(apis[0].js_call_args, "UTF8ToString(mode)");
    }

    #[test]
    fn test_void_parameters_dropped_and_keywords_escaped() {
        let apis = prepare(&[(
            "/tmp/misc.d.ts",
            "export declare function closeView(args_0: void): Promise<void>;\nexport declare function setValue(object: string): void;",
        )]);
        assert!(apis[0].parameters.is_empty());
        assert_eq!(apis[1].parameters[0].param_name, "objectParam");
        assert_eq!(apis[1].parameters[0].js_name, "object");
    }

    #[test]
    fn test_result_and_union_info() {
        let apis = prepare(&[(
            "/tmp/game.d.ts",
            r#"
            export declare function getUserKeyForGame(): Promise<{ hash: string } | 'INVALID_CATEGORY' | undefined>;
            export declare function getLocation(): Promise<{ latitude: number } | undefined>;
            "#,
        )]);
        let key = &apis[0];
        assert!(key.is_discriminated_union);
        assert_eq!(key.callback_type, "GetUserKeyForGameResult");
        let info = key.union_info.as_ref().unwrap();
        assert_eq!(info.success_type, "GetUserKeyForGameSuccess");
        assert_eq!(info.error_codes, vec!["INVALID_CATEGORY"]);

        let location = &apis[1];
        assert_eq!(location.callback_type, "GetLocationResult");
        assert!(location.is_nullable_return);
    }

    #[test]
    fn test_deprecated_message_is_single_line() {
        let apis = prepare(&[(
            "/tmp/old.d.ts",
            "/** @deprecated Use \"newApi\" instead. */\nexport declare function oldApi(): void;",
        )]);
        assert!(apis[0].is_deprecated);
        assert_eq!(
            apis[0].deprecated_message.as_deref(),
            Some("Use \\\"newApi\\\" instead.")
        );
        assert_eq!(obsolete_message("line one\n   line two"), "line one line two");
    }

    #[test]
    fn test_callback_based_parameters() {
        let apis = prepare(&[(
            "/tmp/loadFullScreenAd.d.ts",
            r#"
            export declare function loadFullScreenAd(params: {
                adGroupId: string;
                onEvent: (event: { type: string }) => void;
                onError: (error: unknown) => void;
            }): () => void;
            "#,
        )]);
        let api = &apis[0];
        assert!(api.is_callback_based);
        let names: Vec<&str> = api.parameters.iter().map(|p| p.param_name.as_str()).collect();
        assert_eq!(names, vec!["adGroupId"]);
        assert_eq!(api.callback_event_type.as_deref(), Some("LoadFullScreenAdEvent"));
        assert_eq!(api.js_call_args, "adGroupId: UTF8ToString(adGroupId)");
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let apis = prepare(&[("/tmp/a.d.ts", "export declare function getLocale(): string;")]);
        let json = serde_json::to_value(&apis[0]).unwrap();
        assert_eq!(json["pascalName"], "GetLocale");
        assert_eq!(json["callbackType"], "string");
        assert_eq!(json["isAsync"], false);
    }

    #[test]
    fn test_group_by_category() {
        let apis = prepare(&[
            ("/tmp/share.d.ts", "export declare function share(message: string): Promise<void>;"),
            ("/tmp/appLogin.d.ts", "export declare function appLogin(): Promise<void>;"),
            ("/tmp/getLocale.d.ts", "export declare function getLocale(): string;"),
            ("/tmp/getLocation.d.ts", "export declare function getLocation(): Promise<void>;"),
        ]);
        let groups = group_by_category(&apis, &["Share".to_string(), "Missing".to_string()]);
        let names: Vec<&str> = groups.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["Share", "AppLogin", "GetLocale", "GetLocation"]);
        assert_eq!(groups[0].1[0].name, "share");
    }
}
