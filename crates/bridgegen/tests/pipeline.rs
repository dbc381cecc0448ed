//! End-to-end runs over declaration trees written to a temp dir

use bridgegen::diagnostics::codes;
use bridgegen::type_parser::TypeParser;
use bridgegen::{GenError, GeneratorBuilder, SkipReason, SourceSet};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_tree(dir: &Path, files: &[(&str, &str)]) {
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

#[test]
fn test_union_return_becomes_result_class() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("built");
    write_tree(
        &source,
        &[(
            "getUserKeyForGame.d.ts",
            r#"
            /**
             * Returns the user key for the current game
             * @returns The hashed key or the reason it is unavailable
             */
            export declare function getUserKeyForGame(): Promise<{ type: 'HASH'; hash: string } | { type: 'NOT_AVAILABLE' }>;
            "#,
        )],
    );
    let out = dir.path().join("Runtime");

    let generation = GeneratorBuilder::new(&source).generate().unwrap();
    assert_eq!(generation.apis.len(), 1);
    assert!(generation.apis[0].is_async);

    let output = GeneratorBuilder::new(&source).output_dir(&out).build().unwrap();
    let names: Vec<String> = output
        .all_files()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "AIT.cs",
            "AIT.GetUserKeyForGame.cs",
            "AITCore.cs",
            "AIT.Types.cs",
            "AppsInToss-GetUserKeyForGame.jslib",
        ]
    );
    assert_eq!(output.jslib_dir, out.join("Plugins"));
    assert_eq!(output.report.api_count, 1);
    assert!(!output.report.has_errors());

    let category = read(&out.join("AIT.GetUserKeyForGame.cs"));
    assert!(category.contains("public static async Task<GetUserKeyForGameResult> GetUserKeyForGame()"));
    assert!(category.contains("/// Returns the user key for the current game"));

    let types = read(&out.join("AIT.Types.cs"));
    assert!(types.contains("public class GetUserKeyForGameResult"));
    assert!(types.contains("public string Hash; // optional"));
    assert!(types.contains("public string error;"));

    let core = read(&out.join("AITCore.cs"));
    assert!(core.contains("Complete<GetUserKeyForGameResult>(callbackId, data);"));

    let jslib = read(&out.join("Plugins").join("AppsInToss-GetUserKeyForGame.jslib"));
    assert!(jslib.contains("window.AppsInToss.getUserKeyForGame()"));
}

#[test]
fn test_inline_literal_union_becomes_enum() {
    let dir = TempDir::new().unwrap();
    write_tree(
        dir.path(),
        &[(
            "setDeviceOrientation.d.ts",
            "export declare function setDeviceOrientation(options: { type: 'portrait' | 'landscape' }): Promise<void>;",
        )],
    );

    let generation = GeneratorBuilder::new(dir.path()).generate().unwrap();
    let category = &generation
        .csharp_files
        .iter()
        .find(|f| f.file_name == "AIT.SetDeviceOrientation.cs")
        .unwrap()
        .content;
    assert!(category.contains(
        "public static async Task SetDeviceOrientation(SetDeviceOrientationOptions options)"
    ));

    let types = &generation
        .csharp_files
        .iter()
        .find(|f| f.file_name == "AIT.Types.cs")
        .unwrap()
        .content;
    assert!(types.contains("public enum SetDeviceOrientationOptionsType"));
    assert!(types.contains("[EnumMember(Value = \"portrait\")]\n        Portrait,"));
    assert!(types.contains("[EnumMember(Value = \"landscape\")]\n        Landscape,"));
    assert!(types.contains("public class SetDeviceOrientationOptions"));
    assert!(types.contains("public SetDeviceOrientationOptionsType Type;"));
    // string enums rely on the converter registered in AITJsonSettings
    assert!(!types.contains("[JsonConverter("));
}

#[test]
fn test_unresolved_external_is_stubbed() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("bridge");
    write_tree(
        &source,
        &[(
            "loadAdMobInterstitialAd.d.ts",
            "export declare function loadAdMobInterstitialAd(options: LoadAdMobInterstitialAdOptions): Promise<void>;",
        )],
    );

    let generation = GeneratorBuilder::new(&source).generate().unwrap();
    assert_eq!(generation.report.count_code(codes::STUB), 1);
    assert!(!generation.report.has_errors());
    let types = &generation.csharp_files.last().unwrap().content;
    assert!(types.contains(
        "Stub class for LoadAdMobInterstitialAdOptions (type definition not found in current SDK version)"
    ));

    // The same reference resolves once the shared module is supplied
    let shared = dir.path().join("shared");
    write_tree(
        &shared,
        &[(
            "ads.d.ts",
            "export interface LoadAdMobInterstitialAdOptions { adUnitId: string }",
        )],
    );
    let generation = GeneratorBuilder::new(&source)
        .shared_module(&shared)
        .generate()
        .unwrap();
    assert_eq!(generation.report.count_code(codes::STUB), 0);
    let types = &generation.csharp_files.last().unwrap().content;
    assert!(types.contains("public string AdUnitId;"));
    assert!(!types.contains("Stub class"));
}

#[test]
fn test_skips_are_reported() {
    let dir = TempDir::new().unwrap();
    write_tree(
        dir.path(),
        &[
            ("closeView.d.ts", "export declare function closeView(): Promise<void>;"),
            ("types.d.ts", "export * from './closeView';"),
            ("broken.d.ts", "export declare function (("),
            ("README.md", "not a declaration"),
        ],
    );

    let generation = GeneratorBuilder::new(dir.path())
        .exclude_api("closeView")
        .generate()
        .unwrap();
    assert!(generation.apis.is_empty());
    assert_eq!(generation.report.skipped_for(SkipReason::BarrelFile), 1);
    assert_eq!(generation.report.skipped_for(SkipReason::FileParse), 1);
    assert_eq!(generation.report.skipped_for(SkipReason::ExcludedApi), 1);
}

#[test]
fn test_strict_mode_rejects_unsupported_types() {
    let dir = TempDir::new().unwrap();
    write_tree(
        dir.path(),
        &[("tagView.d.ts", "export declare function tagView(id: symbol): Promise<void>;")],
    );

    let relaxed = GeneratorBuilder::new(dir.path()).generate().unwrap();
    assert_eq!(relaxed.report.count_code(codes::UNSUPPORTED_TYPE), 1);
    assert!(relaxed.report.has_errors());

    let err = GeneratorBuilder::new(dir.path()).strict(true).generate().unwrap_err();
    match err {
        GenError::UnsupportedTypes { count, apis } => {
            assert_eq!(count, 1);
            assert_eq!(apis, "tagView");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_config_file_drives_build() {
    let dir = TempDir::new().unwrap();
    write_tree(
        dir.path(),
        &[
            (
                "bridge/getLocale.d.ts",
                "export declare function getLocale(): string;",
            ),
            (
                "bridge/getNetworkStatus.d.ts",
                "export declare function getNetworkStatus(): Promise<'WIFI' | 'OFFLINE'>;",
            ),
            (
                "bridgegen.toml",
                r#"
                source_dir = "bridge"
                output_dir = "out"
                generate_jslib = false
                web_framework_tag = "1.4.0"

                [categories]
                Device = ["getLocale", "getNetworkStatus"]
                "#,
            ),
        ],
    );

    let config = bridgegen::GeneratorConfig::discover(None, dir.path()).unwrap();
    let output = GeneratorBuilder::from_config(&config).unwrap().build().unwrap();
    assert!(output.jslib_files.is_empty());
    assert_eq!(output.output_dir, dir.path().join("out"));

    let device = read(&dir.path().join("out").join("AIT.Device.cs"));
    assert!(device.contains("GetLocale()"));
    assert!(device.contains("GetNetworkStatus()"));
    let main = read(&dir.path().join("out").join("AIT.cs"));
    assert!(main.contains("public const string WebFrameworkTag = \"1.4.0\";"));
}

#[test]
fn test_generation_is_deterministic() {
    let dir = TempDir::new().unwrap();
    write_tree(
        dir.path(),
        &[
            (
                "getPendingOrders.d.ts",
                "export declare function getPendingOrders(): Promise<{ orders: { orderId: string; sku: { id: string } }[] }>;",
            ),
            (
                "checkoutPayment.d.ts",
                "export declare function checkoutPayment(params: { payToken: string; mode: 'card' | 'point' }): Promise<{ success: boolean } | 'CANCELED'>;",
            ),
        ],
    );

    let first = GeneratorBuilder::new(dir.path()).generate().unwrap();
    let second = GeneratorBuilder::new(dir.path()).generate().unwrap();
    assert_eq!(first.csharp_files, second.csharp_files);
    assert_eq!(first.jslib_files, second.jslib_files);
}

#[test]
fn test_parsed_type_tree_snapshot() {
    let set = SourceSet::from_sources([("/tmp/snapshot.d.ts", "export {};")]);
    let parsed = TypeParser::new(&set).parse_type_str("{ type: 'portrait' | 'landscape' }");
    insta::assert_json_snapshot!("device_orientation_options", parsed);
}
