//! C# emitter
//!
//! Renders the Unity side of the bridge:
//!
//! - `AIT.cs`: the partial class root
//! - `AIT.{Category}.cs`: one file per category
//! - `AITCore.cs`: callback plumbing and the routing tables
//! - `AIT.Types.cs`: every class and enum the APIs reference

pub mod mapping;
pub mod prepare;
pub mod templates;
pub mod type_data;

pub use mapping::{field_csharp_type, is_type_supported, map_to_csharp_type, validate_apis};
pub use prepare::{group_by_category, PreparedApi, PreparedParameter, UnionInfo};
pub use templates::TemplateSet;
pub use type_data::{type_entries, TypeEntry};

use crate::collector::TypeCollection;
use crate::diagnostics::GenResult;
use crate::types::{GeneratedFile, ParsedTypeDefinition};
use indexmap::IndexSet;
use serde::Serialize;
use std::collections::BTreeSet;

pub const MAIN_FILE: &str = "AIT.cs";
pub const CORE_FILE: &str = "AITCore.cs";
pub const TYPES_FILE: &str = "AIT.Types.cs";

/// Callback types `AITCore` routes without a generated case
const BUILTIN_CALLBACK_TYPES: &[&str] = &[
    "void", "object", "string", "bool", "double", "int", "float", "long", "__type",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MainData<'a> {
    generator_name: &'a str,
    generator_version: &'a str,
    web_framework_tag: &'a str,
    api_count: usize,
    category_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryData<'a> {
    category_name: &'a str,
    apis: &'a [&'a PreparedApi],
}

/// Routing tables for `AITCore.cs`, each sorted
#[derive(Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoreData {
    pub callback_types: Vec<String>,
    pub enum_callback_types: Vec<String>,
    pub event_data_types: Vec<String>,
}

impl CoreData {
    pub fn from_apis(apis: &[PreparedApi], enum_names: &IndexSet<String>) -> Self {
        let mut callback_types = BTreeSet::new();
        let mut enum_callback_types = BTreeSet::new();
        let mut event_data_types = BTreeSet::new();

        for api in apis {
            if api.is_event_subscription {
                event_data_types.extend(api.event_data_type.clone());
                continue;
            }
            if api.is_callback_based {
                event_data_types.extend(api.callback_event_type.clone());
                continue;
            }
            let ty = api.callback_type.as_str();
            if BUILTIN_CALLBACK_TYPES.contains(&ty) || ty.starts_with("System.Action") {
                continue;
            }
            if enum_names.contains(ty) {
                enum_callback_types.insert(ty.to_string());
            } else {
                callback_types.insert(ty.to_string());
            }
        }

        Self {
            callback_types: callback_types.into_iter().collect(),
            enum_callback_types: enum_callback_types.into_iter().collect(),
            event_data_types: event_data_types.into_iter().collect(),
        }
    }
}

#[derive(Serialize)]
struct TypesData {
    entries: Vec<TypeEntry>,
}

/// Renders every C# file from prepared APIs and the type collection
#[derive(Debug)]
pub struct CSharpGenerator<'t> {
    templates: &'t TemplateSet,
    category_order: Vec<String>,
    web_framework_tag: String,
}

impl<'t> CSharpGenerator<'t> {
    pub fn new(templates: &'t TemplateSet) -> Self {
        Self {
            templates,
            category_order: Vec::new(),
            web_framework_tag: "latest".to_string(),
        }
    }

    /// Categories emitted first, in this order
    pub fn category_order(mut self, order: Vec<String>) -> Self {
        self.category_order = order;
        self
    }

    pub fn web_framework_tag(mut self, tag: impl Into<String>) -> Self {
        self.web_framework_tag = tag.into();
        self
    }

    /// All C# files: main, categories, core, types
    pub fn generate(
        &self,
        apis: &[PreparedApi],
        collection: &TypeCollection,
        definitions: &[ParsedTypeDefinition],
    ) -> GenResult<Vec<GeneratedFile>> {
        let categories = self.generate_category_files(apis)?;
        let mut files = Vec::with_capacity(categories.len() + 3);
        files.push(self.generate_main_file(apis.len(), categories.len())?);
        files.extend(categories);
        let enum_names = type_data::enum_type_names(collection, definitions);
        files.push(self.generate_core_file(apis, &enum_names)?);
        files.push(self.generate_types_file(collection, definitions)?);
        Ok(files)
    }

    pub fn generate_main_file(
        &self,
        api_count: usize,
        category_count: usize,
    ) -> GenResult<GeneratedFile> {
        let content = self.templates.render(
            templates::MAIN,
            &MainData {
                generator_name: crate::NAME,
                generator_version: crate::VERSION,
                web_framework_tag: &self.web_framework_tag,
                api_count,
                category_count,
            },
        )?;
        Ok(GeneratedFile::new(MAIN_FILE, content))
    }

    pub fn generate_category_files(&self, apis: &[PreparedApi]) -> GenResult<Vec<GeneratedFile>> {
        group_by_category(apis, &self.category_order)
            .into_iter()
            .map(|(category, members)| {
                tracing::debug!(category = %category, apis = members.len(), "rendering category");
                let content = self.templates.render(
                    templates::CATEGORY,
                    &CategoryData {
                        category_name: &category,
                        apis: &members,
                    },
                )?;
                Ok(GeneratedFile::new(format!("AIT.{}.cs", category), content))
            })
            .collect()
    }

    pub fn generate_core_file(
        &self,
        apis: &[PreparedApi],
        enum_names: &IndexSet<String>,
    ) -> GenResult<GeneratedFile> {
        let data = CoreData::from_apis(apis, enum_names);
        let content = self.templates.render(templates::CORE, &data)?;
        Ok(GeneratedFile::new(CORE_FILE, content))
    }

    pub fn generate_types_file(
        &self,
        collection: &TypeCollection,
        definitions: &[ParsedTypeDefinition],
    ) -> GenResult<GeneratedFile> {
        let entries = type_entries(collection, definitions);
        tracing::debug!(entries = entries.len(), "rendering types file");
        let content = self.templates.render(templates::TYPES, &TypesData { entries })?;
        Ok(GeneratedFile::new(TYPES_FILE, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_parser::{parse_apis, ApiParserOptions};
    use crate::collector::{NoExternalResolver, TypeCollector};
    use crate::source_set::SourceSet;
    use crate::type_defs::parse_type_definitions;

    struct Fixture {
        apis: Vec<PreparedApi>,
        collection: TypeCollection,
        definitions: Vec<ParsedTypeDefinition>,
    }

    fn fixture(files: &[(&str, &str)]) -> Fixture {
        let set = SourceSet::from_sources(files.iter().map(|(p, s)| (*p, s.to_string())));
        let scan = parse_apis(&set, ApiParserOptions::default());
        let definitions = parse_type_definitions(&set);
        let collection = TypeCollector::collect(&scan.apis, &definitions, &NoExternalResolver);
        let apis = scan
            .apis
            .iter()
            .map(|api| PreparedApi::new(api, &collection))
            .collect();
        Fixture {
            apis,
            collection,
            definitions,
        }
    }

    fn render(fixture: &Fixture) -> Vec<GeneratedFile> {
        let templates = TemplateSet::builtin().unwrap();
        CSharpGenerator::new(&templates)
            .web_framework_tag("1.4.0")
            .generate(&fixture.apis, &fixture.collection, &fixture.definitions)
            .unwrap()
    }

    fn file<'a>(files: &'a [GeneratedFile], name: &str) -> &'a str {
        &files
            .iter()
            .find(|f| f.file_name == name)
            .unwrap_or_else(|| panic!("{} not generated", name))
            .content
    }

    #[test]
    fn test_file_set() {
        let files = render(&fixture(&[
            ("/tmp/share.d.ts", "export declare function share(message: string): Promise<void>;"),
            ("/tmp/getLocale.d.ts", "export declare function getLocale(): string;"),
        ]));
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["AIT.cs", "AIT.GetLocale.cs", "AIT.Share.cs", "AITCore.cs", "AIT.Types.cs"]
        );
        let main = file(&files, "AIT.cs");
        assert!(main.contains("public const string WebFrameworkTag = \"1.4.0\";"));
        assert!(main.contains("public const int ApiCount = 2;"));
    }

    #[test]
    fn test_async_api_rendering() {
        let files = render(&fixture(&[(
            "/tmp/share.d.ts",
            r#"
            /**
             * Opens the share sheet
             * @param message Text to share
             */
            export declare function share(message: string, options?: { title: string }): Promise<void>;
            "#,
        )]));
        let share = file(&files, "AIT.Share.cs");
        assert!(share.contains("/// Opens the share sheet"));
        assert!(share.contains("/// <param name=\"message\">Text to share</param>"));
        assert!(share.contains("[APICategory(\"Share\")]"));
        assert!(share.contains(
            "public static async Task Share(string message, ShareOptions options = default)"
        ));
        assert!(share.contains(
            "__share_Internal(message, AITJsonSettings.Serialize(options), callbackId, \"void\");"
        ));
        assert!(share.contains(
            "private static extern void __share_Internal(string message, string options, string callbackId, string typeName);"
        ));
    }

    #[test]
    fn test_result_types_and_core_routing() {
        let files = render(&fixture(&[(
            "/tmp/getLocation.d.ts",
            r#"
            export declare enum Accuracy { Low = 1, High = 2 }
            export declare function getLocation(accuracy: Accuracy): Promise<{ latitude: number }>;
            export declare function getAccuracy(): Promise<Accuracy>;
            "#,
        )]));
        let category = file(&files, "AIT.GetLocation.cs");
        assert!(category.contains("public static async Task<GetLocationResult> GetLocation(Accuracy accuracy)"));

        let core = file(&files, "AITCore.cs");
        assert!(core.contains("case \"GetLocationResult\":\n                    Complete<GetLocationResult>(callbackId, data);"));
        assert!(core.contains("CompleteEnum<Accuracy>(callbackId, data);"));

        let types = file(&files, "AIT.Types.cs");
        assert!(types.contains("public class GetLocationResult"));
        assert!(types.contains("[JsonProperty(\"latitude\")]"));
        assert!(types.contains("public double Latitude;"));
        assert!(types.contains("public string error;"));
        assert!(types.contains("public enum Accuracy"));
        assert!(types.contains("High = 2,"));
    }

    #[test]
    fn test_deprecated_and_union_result() {
        let files = render(&fixture(&[(
            "/tmp/getUserKeyForGame.d.ts",
            r#"
            /** @deprecated Use getUserKey instead */
            export declare function getUserKeyForGame(): Promise<{ hash: string } | 'INVALID_CATEGORY' | 'ERROR' | undefined>;
            "#,
        )]));
        let category = file(&files, "AIT.GetUserKeyForGame.cs");
        assert!(category.contains("[Obsolete(\"Use getUserKey instead\")]"));
        assert!(category.contains("Task<GetUserKeyForGameResult>"));

        let types = file(&files, "AIT.Types.cs");
        assert!(types.contains("public class GetUserKeyForGameResult"));
        assert!(types.contains("public GetUserKeyForGameSuccess GetSuccess()"));
        assert!(types.contains("public const string INVALID_CATEGORY = \"INVALID_CATEGORY\";"));
        assert!(types.contains("public class GetUserKeyForGameSuccess"));
    }

    #[test]
    fn test_core_data_skips_builtin_types() {
        let fixture = fixture(&[
            ("/tmp/getLocale.d.ts", "export declare function getLocale(): string;"),
            ("/tmp/close.d.ts", "export declare function close(): Promise<void>;"),
        ]);
        let data = CoreData::from_apis(&fixture.apis, &IndexSet::new());
        assert_eq!(data, CoreData::default());
    }
}
