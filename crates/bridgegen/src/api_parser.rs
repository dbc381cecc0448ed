//! Declaration parser: exported functions to [`ParsedApi`]
//!
//! Every non-barrel file contributes its exported functions and
//! function-typed constants, categorized by file name. The `index.d.ts`
//! barrel is scanned separately for namespace objects (`IAP.getProductItemList`),
//! event namespaces (`tdsEvent.addEventListener`) and a few global helpers.
//!
//! Declarations that cannot become an API are recorded as [`Skipped`] and the
//! scan continues.

use crate::diagnostics::{SkipReason, Skipped};
use crate::js_doc::ApiDoc;
use crate::source_set::{declarator_type, is_barrel_file, SourceSet};
use crate::type_parser::{CallSignature, TypeParser};
use crate::types::{EventInfo, ParsedApi, ParsedParameter, ParsedType, TypeKind};
use crate::utils::naming::to_pascal_case;
use crate::utils::swc::{expr_to_name, ParsedModule};
use deno_ast::swc::ast as swc_ast;
use deno_ast::swc::common::{Span, Spanned};
use indexmap::IndexMap;
use std::collections::HashSet;

/// The only barrel scanned for namespace objects
const NAMESPACE_BARREL: &str = "index.d.ts";

/// Category of barrel-level helpers such as `getAppsInTossGlobals`
const GLOBAL_CATEGORY: &str = "Environment";

/// Category of event subscription APIs
const EVENT_CATEGORY: &str = "AppEvents";

/// Namespaces whose category differs from their name
const NAMESPACE_CATEGORY_OVERRIDES: &[(&str, &str)] = &[
    ("GoogleAdMob", "Advertising"),
    ("SafeAreaInsets", "SafeArea"),
    ("env", "Environment"),
];

/// Members that mark a permission-gated API
const PERMISSION_MEMBERS: &[&str] = &["getPermission", "openPermissionDialog"];

/// Options for an API scan
#[derive(Debug, Clone)]
pub struct ApiParserOptions {
    /// API names (or JS-side names) to leave out
    pub excluded_apis: Vec<String>,
    /// API name to category, replacing the file-derived category
    pub category_overrides: IndexMap<String, String>,
    /// Scan `index.d.ts` for namespace objects and event namespaces
    pub scan_namespaces: bool,
}

impl Default for ApiParserOptions {
    fn default() -> Self {
        Self {
            excluded_apis: Vec::new(),
            category_overrides: IndexMap::new(),
            scan_namespaces: true,
        }
    }
}

/// Result of scanning a source set
#[derive(Debug, Default)]
pub struct ApiScan {
    pub apis: Vec<ParsedApi>,
    pub skipped: Vec<Skipped>,
}

impl ApiScan {
    pub fn api(&self, name: &str) -> Option<&ParsedApi> {
        self.apis.iter().find(|a| a.name == name)
    }

    fn push(&mut self, result: Result<ParsedApi, Skipped>) {
        match result {
            Ok(api) => {
                if self.apis.iter().any(|a| a.name == api.name) {
                    tracing::debug!(api = %api.name, "duplicate API declaration, keeping first");
                    return;
                }
                self.apis.push(api);
            }
            Err(skipped) => self.skipped.push(skipped),
        }
    }
}

/// Where an API comes from and how it is named
struct ApiOrigin<'a> {
    module: &'a ParsedModule,
    span: Span,
    name: String,
    original_name: String,
    category: String,
    namespace: Option<String>,
}

/// Scans declarations for bridge APIs
pub struct ApiParser<'s> {
    parser: TypeParser<'s>,
    options: ApiParserOptions,
}

impl<'s> ApiParser<'s> {
    pub fn new(sources: &'s SourceSet, options: ApiParserOptions) -> Self {
        Self {
            parser: TypeParser::new(sources),
            options,
        }
    }

    /// The underlying type parser, for later stages that share its sources
    pub fn type_parser(&mut self) -> &mut TypeParser<'s> {
        &mut self.parser
    }

    /// Scan every loaded module
    pub fn parse_all(&mut self) -> ApiScan {
        let sources = self.parser.sources();
        let mut scan = ApiScan::default();

        for failure in &sources.failures {
            scan.skipped.push(
                Skipped::new(SkipReason::FileParse, &failure.path).with_detail(&failure.message),
            );
        }

        for module in &sources.modules {
            if !is_barrel_file(module.path()) {
                self.parse_module(module, &mut scan);
                continue;
            }
            let is_namespace_barrel = module
                .path()
                .file_name()
                .is_some_and(|f| f.to_string_lossy() == NAMESPACE_BARREL);
            if is_namespace_barrel && self.options.scan_namespaces {
                self.parse_barrel(module, &mut scan);
            } else {
                scan.skipped
                    .push(Skipped::new(SkipReason::BarrelFile, module.path()));
            }
        }

        self.apply_options(&mut scan);
        tracing::debug!(
            apis = scan.apis.len(),
            skipped = scan.skipped.len(),
            "api scan finished"
        );
        scan
    }

    fn apply_options(&self, scan: &mut ApiScan) {
        let excluded = &self.options.excluded_apis;
        let (kept, dropped): (Vec<ParsedApi>, Vec<ParsedApi>) =
            std::mem::take(&mut scan.apis).into_iter().partition(|api| {
                !excluded.contains(&api.name) && !excluded.contains(&api.original_name)
            });
        for api in dropped {
            scan.skipped
                .push(Skipped::new(SkipReason::ExcludedApi, &api.file).named(&api.name));
        }
        scan.apis = kept;

        for api in &mut scan.apis {
            if let Some(category) = self.options.category_overrides.get(&api.name) {
                api.category = category.clone();
            }
        }
    }

    /// Exported functions and function-typed constants of one file
    fn parse_module(&mut self, module: &ParsedModule, scan: &mut ApiScan) {
        let decls = match module.top_level_decls() {
            Ok(decls) => decls,
            Err(e) => {
                scan.skipped.push(
                    Skipped::new(SkipReason::FileParse, module.path()).with_detail(e.to_string()),
                );
                return;
            }
        };
        let category = to_pascal_case(&module.stem());

        for top in decls.iter().filter(|d| d.exported) {
            match top.decl {
                swc_ast::Decl::Fn(f) => {
                    let name = f.ident.sym.to_string();
                    let origin = ApiOrigin {
                        module,
                        span: top.span,
                        name: name.clone(),
                        original_name: name,
                        category: category.clone(),
                        namespace: None,
                    };
                    let signature = self.parser.function_signature(module, &f.function);
                    scan.push(Ok(self.build_api(origin, signature, None)));
                }
                swc_ast::Decl::Var(v) => {
                    for declarator in &v.decls {
                        let result = self.variable_api(module, declarator, top.span, &category);
                        scan.push(result);
                    }
                }
                _ => {}
            }
        }
    }

    fn variable_api(
        &mut self,
        module: &ParsedModule,
        declarator: &swc_ast::VarDeclarator,
        span: Span,
        category: &str,
    ) -> Result<ParsedApi, Skipped> {
        let swc_ast::Pat::Ident(binding) = &declarator.name else {
            return Err(Skipped::new(SkipReason::UnnamedDeclaration, module.path())
                .with_detail(crate::type_parser::raw_text(module, declarator.span)));
        };
        let name = binding.id.sym.to_string();
        let Some(ty) = declarator_type(declarator) else {
            return Err(Skipped::new(SkipReason::NoCallSignature, module.path())
                .named(&name)
                .with_detail("no type annotation"));
        };
        let Some(signature) = self.parser.call_signature(module, ty) else {
            return Err(Skipped::new(SkipReason::NoCallSignature, module.path()).named(&name));
        };
        let declared = self.parser.parse(module, ty);
        let origin = ApiOrigin {
            module,
            span,
            name: name.clone(),
            original_name: name,
            category: category.to_string(),
            namespace: None,
        };
        Ok(self.build_api(origin, signature, Some(&declared)))
    }

    /// `index.d.ts`: namespace objects, event namespaces and global helpers
    fn parse_barrel(&mut self, module: &ParsedModule, scan: &mut ApiScan) {
        let decls = match module.top_level_decls() {
            Ok(decls) => decls,
            Err(e) => {
                scan.skipped.push(
                    Skipped::new(SkipReason::FileParse, module.path()).with_detail(e.to_string()),
                );
                return;
            }
        };

        for top in decls.iter().filter(|d| d.exported) {
            match top.decl {
                swc_ast::Decl::Fn(f) => {
                    let doc = ApiDoc::parse_opt(module.jsdoc_for_span(top.span).as_deref());
                    if doc.is_deprecated() {
                        tracing::debug!(api = %f.ident.sym, "skipping deprecated global function");
                        continue;
                    }
                    let name = f.ident.sym.to_string();
                    let origin = ApiOrigin {
                        module,
                        span: top.span,
                        name: name.clone(),
                        original_name: name,
                        category: GLOBAL_CATEGORY.to_string(),
                        namespace: None,
                    };
                    let signature = self.parser.function_signature(module, &f.function);
                    scan.push(Ok(self.build_api(origin, signature, None)));
                }
                swc_ast::Decl::Var(v) => {
                    for declarator in &v.decls {
                        self.parse_barrel_value(module, declarator, top.span, scan);
                    }
                }
                _ => {}
            }
        }
    }

    fn parse_barrel_value(
        &mut self,
        module: &ParsedModule,
        declarator: &swc_ast::VarDeclarator,
        span: Span,
        scan: &mut ApiScan,
    ) {
        let swc_ast::Pat::Ident(binding) = &declarator.name else {
            return;
        };
        let name = binding.id.sym.to_string();
        let Some(ty) = declarator_type(declarator) else {
            return;
        };

        match classify_barrel_value(module, ty) {
            Some(BarrelValue::EventNamespace) => self.parse_event_namespace(module, &name, scan),
            Some(BarrelValue::Namespace(members)) => {
                self.parse_namespace_object(module, &name, members, scan)
            }
            Some(BarrelValue::Global) => {
                let Some(signature) = self.parser.call_signature(module, ty) else {
                    return;
                };
                let origin = ApiOrigin {
                    module,
                    span,
                    name: name.clone(),
                    original_name: name,
                    category: GLOBAL_CATEGORY.to_string(),
                    namespace: None,
                };
                scan.push(Ok(self.build_api(origin, signature, None)));
            }
            None => tracing::trace!(name, "barrel value is not an API"),
        }
    }

    /// One API per callable member of `export declare const Ns: { ... }`
    fn parse_namespace_object(
        &mut self,
        module: &ParsedModule,
        namespace: &str,
        members: &[swc_ast::TsTypeElement],
        scan: &mut ApiScan,
    ) {
        let category = namespace_category(namespace);
        let mut seen = HashSet::new();

        for member in members {
            let (method, span, signature) = match member {
                swc_ast::TsTypeElement::TsMethodSignature(m) => {
                    let Some(method) = expr_to_name(&m.key) else {
                        continue;
                    };
                    let signature = self.parser.ts_signature(
                        module,
                        m.type_params.as_deref(),
                        &m.params,
                        m.type_ann.as_deref().map(|a| a.type_ann.as_ref()),
                    );
                    (method, m.span, signature)
                }
                swc_ast::TsTypeElement::TsPropertySignature(p) => {
                    let Some(method) = expr_to_name(&p.key) else {
                        continue;
                    };
                    let Some(ann) = p.type_ann.as_deref() else {
                        continue;
                    };
                    let Some(signature) = self.parser.call_signature(module, &ann.type_ann) else {
                        continue;
                    };
                    (method, p.span, signature)
                }
                _ => continue,
            };
            // Overloads: first signature wins
            if !seen.insert(method.clone()) {
                continue;
            }

            let origin = ApiOrigin {
                module,
                span,
                name: format!("{}{}", namespace, to_pascal_case(&method)),
                original_name: method,
                category: category.clone(),
                namespace: Some(namespace.to_string()),
            };
            scan.push(Ok(self.build_api(origin, signature, None)));
        }
    }

    /// Subscription APIs for `export declare const tdsEvent: { addEventListener... }`
    ///
    /// The event map is the alias named after the namespace (`TdsEvent`); every
    /// property carrying an `onEvent` callback is one event.
    fn parse_event_namespace(&mut self, module: &ParsedModule, namespace: &str, scan: &mut ApiScan) {
        let type_name = to_pascal_case(namespace);
        let Some(event_map) = self.parser.resolve_name(&type_name) else {
            scan.skipped.push(
                Skipped::new(SkipReason::NoCallSignature, module.path())
                    .named(namespace)
                    .with_detail(format!("event map {} not found", type_name)),
            );
            return;
        };
        let data_prefix = type_name.strip_suffix("Event").unwrap_or(&type_name);

        for event in event_map.properties() {
            let Some(on_event) = event.ty.property("onEvent") else {
                continue;
            };
            let TypeKind::Function {
                function_params, ..
            } = &on_event.ty.kind
            else {
                continue;
            };

            let event_pascal = to_pascal_case(&event.name);
            let data_type = function_params.first().map(|data| {
                let mut data = data.clone();
                if data.is_object() && data.is_anonymous() {
                    data.name = format!("{}{}Data", data_prefix, event_pascal);
                }
                data
            });

            let name = format!("{}Subscribe{}", type_name, event_pascal);
            let mut return_type = ParsedType::function(
                Vec::new(),
                ParsedType::primitive("void"),
                "() => void",
            );
            return_type.name = "Action".to_string();

            scan.push(Ok(ParsedApi {
                pascal_name: name.clone(),
                name,
                original_name: "addEventListener".to_string(),
                category: EVENT_CATEGORY.to_string(),
                file: module.path().to_path_buf(),
                description: Some(
                    event
                        .description
                        .clone()
                        .unwrap_or_else(|| format!("Subscribes to the {}.{} event.", namespace, event.name)),
                ),
                return_description: None,
                examples: Vec::new(),
                parameters: Vec::new(),
                return_type,
                is_async: false,
                has_permission: false,
                is_deprecated: false,
                deprecated_message: None,
                namespace: Some(namespace.to_string()),
                is_callback_based: false,
                event: Some(EventInfo {
                    event_name: event.name.clone(),
                    data_type,
                }),
            }));
        }
    }

    fn build_api(
        &self,
        origin: ApiOrigin<'_>,
        signature: CallSignature,
        declared: Option<&ParsedType>,
    ) -> ParsedApi {
        let doc = ApiDoc::parse_opt(origin.module.jsdoc_for_span(origin.span).as_deref());

        let parameters: Vec<ParsedParameter> = signature
            .params
            .into_iter()
            .enumerate()
            .map(|(index, param)| {
                let description = param
                    .name
                    .as_deref()
                    .and_then(|n| doc.param_doc(n))
                    .map(str::to_string);
                ParsedParameter {
                    name: param.name.unwrap_or_else(|| positional_name(index)),
                    ty: param.ty,
                    optional: param.optional,
                    description,
                }
            })
            .collect();

        let return_type = signature.return_type;
        let is_callback_based = is_callback_based(&parameters, &return_type);
        let is_async = matches!(return_type.kind, TypeKind::Promise { .. }) && !is_callback_based;
        let has_permission =
            exposes_permission(&return_type) || declared.is_some_and(exposes_permission);

        ParsedApi {
            pascal_name: to_pascal_case(&origin.name),
            name: origin.name,
            original_name: origin.original_name,
            category: origin.category,
            file: origin.module.path().to_path_buf(),
            description: doc.summary().map(str::to_string),
            return_description: doc.returns_doc().map(str::to_string),
            examples: doc.examples(),
            parameters,
            return_type,
            is_async,
            has_permission,
            is_deprecated: doc.is_deprecated(),
            deprecated_message: doc.deprecated_message().map(str::to_string),
            namespace: origin.namespace,
            is_callback_based,
            event: None,
        }
    }
}

/// Scan a source set with the given options
pub fn parse_apis(sources: &SourceSet, options: ApiParserOptions) -> ApiScan {
    ApiParser::new(sources, options).parse_all()
}

/// How an exported constant in `index.d.ts` is treated
enum BarrelValue<'a> {
    EventNamespace,
    Namespace(&'a [swc_ast::TsTypeElement]),
    Global,
}

fn classify_barrel_value<'a>(module: &ParsedModule, ty: &'a swc_ast::TsType) -> Option<BarrelValue<'a>> {
    let ty = match ty {
        swc_ast::TsType::TsParenthesizedType(p) => p.type_ann.as_ref(),
        other => other,
    };
    match ty {
        swc_ast::TsType::TsTypeLit(lit) => {
            let members = lit.members.as_slice();
            let has_listener = members.iter().any(|m| member_name(m).as_deref() == Some("addEventListener"));
            if has_listener {
                return Some(BarrelValue::EventNamespace);
            }
            let callable_object = members
                .iter()
                .any(|m| matches!(m, swc_ast::TsTypeElement::TsCallSignatureDecl(_)));
            let has_methods = members.iter().any(is_function_member);
            (!callable_object && has_methods).then_some(BarrelValue::Namespace(members))
        }
        swc_ast::TsType::TsFnOrConstructorType(swc_ast::TsFnOrConstructorType::TsFnType(_)) => {
            // Only simple helpers; object-returning ones belong to a namespace
            let text = module.text_for_span(ty.span());
            (!text.contains('{')).then_some(BarrelValue::Global)
        }
        _ => None,
    }
}

fn member_name(member: &swc_ast::TsTypeElement) -> Option<String> {
    match member {
        swc_ast::TsTypeElement::TsPropertySignature(p) => expr_to_name(&p.key),
        swc_ast::TsTypeElement::TsMethodSignature(m) => expr_to_name(&m.key),
        _ => None,
    }
}

fn is_function_member(member: &swc_ast::TsTypeElement) -> bool {
    match member {
        swc_ast::TsTypeElement::TsMethodSignature(_) => true,
        swc_ast::TsTypeElement::TsPropertySignature(p) => p.type_ann.as_deref().is_some_and(|a| {
            matches!(
                a.type_ann.as_ref(),
                swc_ast::TsType::TsFnOrConstructorType(_) | swc_ast::TsType::TsTypeQuery(_)
            )
        }),
        _ => false,
    }
}

/// `options`, `options1`, `options2`, ... for destructured parameters
fn positional_name(index: usize) -> String {
    if index == 0 {
        "options".to_string()
    } else {
        format!("options{}", index)
    }
}

fn namespace_category(namespace: &str) -> String {
    NAMESPACE_CATEGORY_OVERRIDES
        .iter()
        .find(|(ns, _)| *ns == namespace)
        .map(|(_, category)| category.to_string())
        .unwrap_or_else(|| to_pascal_case(namespace))
}

/// Single options object with `onEvent`/`onError` handlers, returning an unsubscribe function
fn is_callback_based(params: &[ParsedParameter], return_type: &ParsedType) -> bool {
    let [param] = params else {
        return false;
    };
    let has_handler = |name: &str| param.ty.property(name).is_some_and(|p| p.ty.is_function());
    has_handler("onEvent")
        && has_handler("onError")
        && return_type.function_return().is_some_and(ParsedType::is_void)
}

fn exposes_permission(ty: &ParsedType) -> bool {
    [ty, ty.unwrap_promise()]
        .iter()
        .any(|t| PERMISSION_MEMBERS.iter().any(|m| t.property(m).is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(sources: &[(&str, &str)]) -> ApiScan {
        scan_with(sources, ApiParserOptions::default())
    }

    fn scan_with(sources: &[(&str, &str)], options: ApiParserOptions) -> ApiScan {
        let set = SourceSet::from_sources(sources.iter().map(|(p, s)| (*p, s.to_string())));
        parse_apis(&set, options)
    }

    #[test]
    fn test_exported_function() {
        let result = scan(&[(
            "/tmp/getUserKeyForGame.d.ts",
            r#"
            /**
             * Returns the user key for this game.
             * @returns the key or an error code
             * @example
             * const key = await getUserKeyForGame();
             */
            export declare function getUserKeyForGame(): Promise<{ hash: string; type: 'HASH' } | 'INVALID_CATEGORY' | 'ERROR' | undefined>;
            declare function internalOnly(): void;
            "#,
        )]);
        assert_eq!(result.apis.len(), 1);
        let api = &result.apis[0];
        assert_eq!(api.name, "getUserKeyForGame");
        assert_eq!(api.pascal_name, "GetUserKeyForGame");
        assert_eq!(api.category, "GetUserKeyForGame");
        assert!(api.is_async);
        assert!(!api.is_callback_based);
        assert_eq!(api.description.as_deref(), Some("Returns the user key for this game."));
        assert_eq!(api.return_description.as_deref(), Some("the key or an error code"));
        assert_eq!(api.examples.len(), 1);
        assert!(api.return_type.unwrap_promise().is_discriminated_union());
    }

    #[test]
    fn test_category_tag_does_not_override_file_category() {
        let result = scan(&[(
            "/tmp/getUserKeyForGame.d.ts",
            r#"
            /**
             * Returns the user key for this game.
             * @category Payment
             */
            export declare function getUserKeyForGame(): Promise<string>;
            "#,
        )]);
        let api = result.api("getUserKeyForGame").unwrap();
        assert_eq!(api.category, "GetUserKeyForGame");
        assert_eq!(api.description.as_deref(), Some("Returns the user key for this game."));
    }

    #[test]
    fn test_parameters_and_destructuring() {
        let result = scan(&[(
            "/tmp/setDeviceOrientation.d.ts",
            r#"
            /**
             * @param options orientation settings
             */
            export declare function setDeviceOrientation(options: { type: 'portrait' | 'landscape' }): Promise<void>;
            export declare function share({ message }: { message: string }, { url }: { url: string }): void;
            "#,
        )]);
        let orientation = result.api("setDeviceOrientation").unwrap();
        assert_eq!(orientation.parameters[0].name, "options");
        assert_eq!(
            orientation.parameters[0].description.as_deref(),
            Some("orientation settings")
        );

        let share = result.api("share").unwrap();
        let names: Vec<&str> = share.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["options", "options1"]);
        assert!(!share.is_async);
    }

    #[test]
    fn test_function_typed_constants() {
        let result = scan(&[(
            "/tmp/fetchContacts.d.ts",
            r#"
            type PermissionFunction<T> = ((options: { size: number }) => Promise<T>) & {
                getPermission(): Promise<'allowed' | 'denied'>;
                openPermissionDialog(): Promise<'allowed' | 'denied'>;
            };
            export declare const fetchContacts: PermissionFunction<string[]>;
            export declare const VERSION: string;
            "#,
        )]);
        let api = result.api("fetchContacts").unwrap();
        assert!(api.has_permission);
        assert!(api.is_async);
        assert_eq!(api.parameters[0].name, "options");
        assert_eq!(api.category, "FetchContacts");

        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].reason, SkipReason::NoCallSignature);
        assert_eq!(result.skipped[0].name.as_deref(), Some("VERSION"));
    }

    #[test]
    fn test_callback_based_detection() {
        let result = scan(&[(
            "/tmp/startUpdateLocation.d.ts",
            r#"
            export declare function startUpdateLocation(params: {
                onEvent: (location: { latitude: number }) => void;
                onError: (error: unknown) => void;
                options: { accuracy: number };
            }): () => void;
            "#,
        )]);
        let api = result.api("startUpdateLocation").unwrap();
        assert!(api.is_callback_based);
        assert!(!api.is_async);
    }

    #[test]
    fn test_deprecation() {
        let result = scan(&[(
            "/tmp/oldApi.d.ts",
            "/** @deprecated use newApi instead */\nexport declare function oldApi(): void;",
        )]);
        let api = result.api("oldApi").unwrap();
        assert!(api.is_deprecated);
        assert_eq!(api.deprecated_message.as_deref(), Some("use newApi instead"));
    }

    #[test]
    fn test_barrels_are_skipped() {
        let result = scan(&[
            ("/tmp/types.d.ts", "export declare function shouldNotAppear(): void;"),
            ("/tmp/bridge.d.ts", "export declare function norThis(): void;"),
            ("/tmp/appLogin.d.ts", "export declare function appLogin(): Promise<{ authorizationCode: string }>;"),
        ]);
        assert_eq!(result.apis.len(), 1);
        assert_eq!(result.apis[0].category, "AppLogin");
        let barrels = result
            .skipped
            .iter()
            .filter(|s| s.reason == SkipReason::BarrelFile)
            .count();
        assert_eq!(barrels, 2);
    }

    #[test]
    fn test_namespace_objects() {
        let result = scan(&[
            (
                "/tmp/getProductItemList.d.ts",
                "export declare function getProductItemList(): Promise<{ sku: string }[]>;",
            ),
            (
                "/tmp/index.d.ts",
                r#"
                import { getProductItemList } from './getProductItemList';
                export declare const IAP: {
                    /** Starts a purchase. */
                    createOneTimePurchaseOrder(params: { sku: string }): () => void;
                    getProductItemList: typeof getProductItemList;
                    /** @deprecated */
                    legacy(): void;
                };
                export declare const GoogleAdMob: {
                    loadAd(options: { adUnitId: string }): Promise<void>;
                };
                "#,
            ),
        ]);

        let order = result.api("IAPCreateOneTimePurchaseOrder").unwrap();
        assert_eq!(order.original_name, "createOneTimePurchaseOrder");
        assert_eq!(order.namespace.as_deref(), Some("IAP"));
        assert_eq!(order.category, "IAP");
        assert_eq!(order.description.as_deref(), Some("Starts a purchase."));

        let list = result.api("IAPGetProductItemList").unwrap();
        assert!(list.is_async);

        assert!(result.api("IAPLegacy").unwrap().is_deprecated);
        assert_eq!(result.api("GoogleAdMobLoadAd").unwrap().category, "Advertising");
    }

    #[test]
    fn test_event_namespace() {
        let result = scan(&[(
            "/tmp/index.d.ts",
            r#"
            export type TdsEvent = {
                navigationAccessoryEvent: {
                    onEvent: (data: { id: string; title?: string }) => void;
                    onError?: (error: Error) => void;
                };
                backEvent: {
                    onEvent: () => void;
                };
            };
            export declare const tdsEvent: {
                addEventListener: <K extends keyof TdsEvent>(event: K, handlers: TdsEvent[K]) => () => void;
            };
            "#,
        )]);
        let nav = result.api("TdsEventSubscribeNavigationAccessoryEvent").unwrap();
        assert_eq!(nav.category, "AppEvents");
        assert_eq!(nav.original_name, "addEventListener");
        assert!(!nav.is_async);
        assert!(nav.parameters.is_empty());
        assert_eq!(nav.return_type.name, "Action");
        let event = nav.event.as_ref().unwrap();
        assert_eq!(event.event_name, "navigationAccessoryEvent");
        let data = event.data_type.as_ref().unwrap();
        assert_eq!(data.name, "TdsNavigationAccessoryEventData");
        assert_eq!(data.properties().len(), 2);

        let back = result.api("TdsEventSubscribeBackEvent").unwrap();
        assert!(back.event.as_ref().unwrap().data_type.is_none());
    }

    #[test]
    fn test_global_functions_in_index() {
        let result = scan(&[(
            "/tmp/index.d.ts",
            r#"
            export declare function getAppsInTossGlobals(): { deploymentId: string };
            /** @deprecated */
            export declare function oldGlobal(): void;
            export declare const getPlatformOS: () => 'ios' | 'android';
            "#,
        )]);
        let names: Vec<&str> = result.apis.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["getAppsInTossGlobals", "getPlatformOS"]);
        assert!(result.apis.iter().all(|a| a.category == "Environment"));
    }

    #[test]
    fn test_namespace_scan_disabled() {
        let result = scan_with(
            &[("/tmp/index.d.ts", "export declare const IAP: { buy(): void };")],
            ApiParserOptions {
                scan_namespaces: false,
                ..Default::default()
            },
        );
        assert!(result.apis.is_empty());
        assert_eq!(result.skipped[0].reason, SkipReason::BarrelFile);
    }

    #[test]
    fn test_exclusions_and_category_overrides() {
        let mut category_overrides = IndexMap::new();
        category_overrides.insert("setDeviceOrientation".to_string(), "Device".to_string());
        let result = scan_with(
            &[
                ("/tmp/setDeviceOrientation.d.ts", "export declare function setDeviceOrientation(): void;"),
                ("/tmp/secret.d.ts", "export declare function secret(): void;"),
            ],
            ApiParserOptions {
                excluded_apis: vec!["secret".to_string()],
                category_overrides,
                scan_namespaces: true,
            },
        );
        assert_eq!(result.apis.len(), 1);
        assert_eq!(result.apis[0].category, "Device");
        assert_eq!(result.skipped[0].reason, SkipReason::ExcludedApi);
        assert_eq!(result.skipped[0].name.as_deref(), Some("secret"));
    }

    #[test]
    fn test_unparseable_file_is_skipped() {
        let result = scan(&[
            ("/tmp/broken.d.ts", "export declare function (("),
            ("/tmp/ok.d.ts", "export declare function ok(): void;"),
        ]);
        assert_eq!(result.apis.len(), 1);
        assert_eq!(result.skipped[0].reason, SkipReason::FileParse);
    }
}
