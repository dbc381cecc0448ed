//! `bridgegen` command line

mod generate;

use anyhow::Result;
use std::env;

fn main() -> Result<()> {
    // BRIDGEGEN_LOG controls the log level, default "info"
    use tracing_subscriber::EnvFilter;
    let filter =
        EnvFilter::try_from_env("BRIDGEGEN_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        usage();
        std::process::exit(1);
    };

    match command.as_str() {
        "generate" | "gen" => generate::run(&args[1..]),
        "parse" => generate::run_parse(&args[1..]),
        "help" | "--help" | "-h" => {
            usage();
            generate::usage();
            Ok(())
        }
        "--version" | "-V" => {
            println!("{} {}", bridgegen::NAME, bridgegen::VERSION);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}\n", other);
            usage();
            std::process::exit(1);
        }
    }
}

fn usage() {
    eprintln!("bridgegen <command> [options]");
    eprintln!();
    eprintln!("Generate Unity WebGL C# bindings and .jslib glue from bridge .d.ts files.");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  generate      Generate C# and jslib files");
    eprintln!("  parse         Print the parsed APIs as JSON");
    eprintln!("  help          Show this message");
    eprintln!();
}
