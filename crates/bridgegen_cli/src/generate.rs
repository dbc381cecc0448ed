//! `bridgegen generate` and `bridgegen parse`
//!
//! Flags override whatever `bridgegen.toml` sets.

use anyhow::{bail, Context, Result};
use bridgegen::printer::ReportPrinter;
use bridgegen::{parse_apis, ApiParserOptions, GeneratorBuilder, GeneratorConfig, SourceSet};
use std::path::PathBuf;

/// Run the generate command with the given arguments
pub fn run(args: &[String]) -> Result<()> {
    let cmd = GenerateCommand::parse(args)?;
    let use_color = cmd.use_color;
    let builder = cmd.into_builder()?;

    println!(
        "Generating bindings from {}",
        builder.source_dir.display()
    );
    let output = builder.build()?;
    ReportPrinter::new(&output, use_color).print_to_stdout();

    if output.report.has_errors() {
        bail!(
            "{} error(s) reported, output may be incomplete",
            output.report.error_count()
        );
    }
    Ok(())
}

/// Run the parse command, printing every API as JSON
pub fn run_parse(args: &[String]) -> Result<()> {
    let mut source: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--source" | "-s" => {
                source = Some(PathBuf::from(value(args, i, "--source requires a directory")?));
                i += 2;
            }
            "--config" | "-c" => {
                config_path = Some(PathBuf::from(value(args, i, "--config requires a file")?));
                i += 2;
            }
            _ => bail!("Unknown flag: {}", args[i]),
        }
    }

    let config = GeneratorConfig::discover(config_path.as_deref(), &std::env::current_dir()?)?;
    let Some(source) = source.or(config.source_dir.clone()) else {
        bail!("No source directory given. Pass --source <dir> or set source_dir in bridgegen.toml");
    };

    let sources = SourceSet::load(&source)
        .with_context(|| format!("loading declarations from {}", source.display()))?;
    let scan = parse_apis(
        &sources,
        ApiParserOptions {
            excluded_apis: config.excluded_apis.clone(),
            category_overrides: config.category_overrides()?,
            scan_namespaces: config.scan_namespaces.unwrap_or(true),
        },
    );
    println!("{}", serde_json::to_string_pretty(&scan.apis)?);
    Ok(())
}

/// Generate command configuration
struct GenerateCommand {
    config: Option<PathBuf>,
    source: Option<PathBuf>,
    output: Option<PathBuf>,
    jslib: Option<PathBuf>,
    templates: Option<PathBuf>,
    shared: Option<PathBuf>,
    tag: Option<String>,
    strict: bool,
    use_color: bool,
}

impl GenerateCommand {
    fn parse(args: &[String]) -> Result<Self> {
        let mut cmd = GenerateCommand {
            config: None,
            source: None,
            output: None,
            jslib: None,
            templates: None,
            shared: None,
            tag: None,
            strict: false,
            use_color: true,
        };

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--config" | "-c" => {
                    cmd.config = Some(PathBuf::from(value(args, i, "--config requires a file")?));
                    i += 2;
                }
                "--source" | "-s" => {
                    cmd.source = Some(PathBuf::from(value(args, i, "--source requires a directory")?));
                    i += 2;
                }
                "--output" | "-o" => {
                    cmd.output = Some(PathBuf::from(value(args, i, "--output requires a directory")?));
                    i += 2;
                }
                "--jslib" => {
                    cmd.jslib = Some(PathBuf::from(value(args, i, "--jslib requires a directory")?));
                    i += 2;
                }
                "--templates" => {
                    cmd.templates =
                        Some(PathBuf::from(value(args, i, "--templates requires a directory")?));
                    i += 2;
                }
                "--shared" => {
                    cmd.shared = Some(PathBuf::from(value(args, i, "--shared requires a directory")?));
                    i += 2;
                }
                "--tag" | "-t" => {
                    cmd.tag = Some(value(args, i, "--tag requires a value (e.g., 1.4.0)")?.to_string());
                    i += 2;
                }
                "--strict" => {
                    cmd.strict = true;
                    i += 1;
                }
                "--no-color" => {
                    cmd.use_color = false;
                    i += 1;
                }
                _ => {
                    bail!("Unknown flag: {}", args[i]);
                }
            }
        }

        Ok(cmd)
    }

    fn into_builder(self) -> Result<GeneratorBuilder> {
        let mut config = GeneratorConfig::discover(self.config.as_deref(), &std::env::current_dir()?)?;
        if let Some(source) = self.source {
            config.source_dir = Some(source);
        }
        if config.source_dir.is_none() {
            bail!(
                "No source directory given.\n\n\
                Usage:\n  \
                bridgegen generate --source <dir>         Use a declaration directory\n  \
                bridgegen generate --config <file>        Read bridgegen.toml"
            );
        }

        let mut builder = GeneratorBuilder::from_config(&config)?;
        if let Some(output) = self.output {
            builder = builder.output_dir(output);
        }
        if let Some(jslib) = self.jslib {
            builder = builder.jslib_dir(jslib);
        }
        if let Some(templates) = self.templates {
            builder = builder.template_dir(templates);
        }
        if let Some(shared) = self.shared {
            builder = builder.shared_module(shared);
        }
        if let Some(tag) = self.tag {
            builder = builder.web_framework_tag(tag);
        }
        if self.strict {
            builder = builder.strict(true);
        }
        Ok(builder)
    }
}

fn value<'a>(args: &'a [String], i: usize, message: &str) -> Result<&'a str> {
    match args.get(i + 1) {
        Some(v) => Ok(v.as_str()),
        None => bail!("{}", message),
    }
}

/// Print generate command usage
pub fn usage() {
    eprintln!("bridgegen generate [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config, -c <file>        Config file (default: ./bridgegen.toml if present)");
    eprintln!("  --source, -s <dir>         Directory of .d.ts declarations");
    eprintln!("  --output, -o <dir>         C# output directory (default: Generated)");
    eprintln!("  --jslib <dir>              jslib output directory (default: <output>/Plugins)");
    eprintln!("  --templates <dir>          Replace the built-in templates");
    eprintln!("  --shared <dir>             Declarations used to resolve external types");
    eprintln!("  --tag, -t <tag>            Web framework tag stamped into AIT.cs");
    eprintln!("  --strict                   Fail on unsupported types");
    eprintln!("  --no-color                 Plain summary output");
    eprintln!();
    eprintln!("bridgegen parse [--source <dir>] [--config <file>]");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  bridgegen generate -s node_modules/@apps-in-toss/web-bridge/built -o Runtime/SDK");
    eprintln!("  bridgegen generate --config unity/bridgegen.toml --strict");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_flags() {
        let cmd = GenerateCommand::parse(&args(&[
            "--source", "bridge", "-o", "out", "--tag", "1.4.0", "--strict", "--no-color",
        ]))
        .unwrap();
        assert_eq!(cmd.source, Some(PathBuf::from("bridge")));
        assert_eq!(cmd.output, Some(PathBuf::from("out")));
        assert_eq!(cmd.tag.as_deref(), Some("1.4.0"));
        assert!(cmd.strict);
        assert!(!cmd.use_color);
    }

    #[test]
    fn test_missing_value_and_unknown_flag() {
        assert!(GenerateCommand::parse(&args(&["--source"])).is_err());
        assert!(GenerateCommand::parse(&args(&["--bogus"])).is_err());
    }
}
