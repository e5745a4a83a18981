//! `uuvr-loader` diagnostics entry point.
//!
//! Runs the loader's resolution pipeline without activating anything, so an
//! operator can see why a game picked (or failed to pick) an implementation.
//!
//! ## CLI Subcommands
//!
//! - `uuvr-loader probe` - Host fingerprint
//! - `uuvr-loader scan [DIR]` - Implementation files in DIR
//! - `uuvr-loader resolve [DIR]` - Scores and the selected implementation
//! - `uuvr-loader config show|defaults|validate` - Configuration

use std::process::ExitCode;

use uuvr_loader::cli::{self, config_cmd};
use uuvr_loader::telemetry::{self, LogConfig};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");
    let json = args.iter().skip(2).any(|a| a == "--json");
    let dir = args
        .iter()
        .skip(2)
        .map(|s| s.as_str())
        .find(|a| !a.starts_with('-'));

    init_cli_logging(args.iter().any(|a| a == "-v" || a == "--verbose"));

    let code = match command {
        "probe" => cli::run_probe(json),
        "scan" => cli::run_scan(dir, json),
        "resolve" => cli::run_resolve(dir, json),
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => config_cmd::run_show(),
                "defaults" => {
                    config_cmd::run_defaults();
                    cli::EXIT_OK
                }
                "validate" => config_cmd::run_validate(),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    cli::EXIT_CONFIG_ERROR
                }
            }
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = args.get(2) {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            cli::EXIT_OK
        }
        "version" | "--version" | "-V" => {
            println!("uuvr-loader {}", env!("CARGO_PKG_VERSION"));
            cli::EXIT_OK
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            cli::EXIT_CONFIG_ERROR
        }
    };
    ExitCode::from(code as u8)
}

/// Pipeline logs go to stderr; only warnings unless `--verbose`.
fn init_cli_logging(verbose: bool) {
    let config = LogConfig {
        level: if verbose { "uuvr_loader=debug" } else { "warn" }.to_string(),
        ..LogConfig::default()
    };
    if let Err(e) = telemetry::init_logging(&config) {
        eprintln!("Logging disabled: {}", e);
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "uuvr-loader - UUVR implementation resolver diagnostics v{}

USAGE:
    uuvr-loader [COMMAND] [OPTIONS]

COMMANDS:
    probe        Show the detected host backend, ABI and engine version
    scan         List implementation files in a directory
    resolve      Score candidates and show which one would be loaded
    config       Show or validate configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

OPTIONS:
    -h, --help     Show help for command
    -V, --version  Show version information
    -v, --verbose  Log pipeline details to stderr
    --json         Machine-readable output (probe, scan, resolve)

EXAMPLES:
    uuvr-loader probe
    uuvr-loader scan ./implementation
    uuvr-loader resolve --json
    uuvr-loader config validate

ENVIRONMENT:
    UUVR_LOADER_IMPL_DIR        Implementation directory (default: <loader dir>/implementation)
    UUVR_LOADER_GAME_DIR        Game directory to probe (default: working directory)
    UUVR_LOADER_BACKEND         Backend override (Mono, IL2CPP)
    UUVR_LOADER_ABI             ABI tag override (e.g. NET35, NET48)
    UUVR_LOADER_ENGINE_VERSION  Engine version override (e.g. 2020.3.47f1)

EXIT CODES:
    0  Success
    1  No implementation could be resolved
    2  Configuration error
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "probe" => {
            eprintln!(
                "uuvr-loader probe - Show the host fingerprint

USAGE:
    uuvr-loader probe [--json]

DESCRIPTION:
    Inspects the game directory (UUVR_LOADER_GAME_DIR or the working
    directory) and prints the backend, managed runtime ABI, engine
    version and bit-width the loader would match against. Configured
    overrides are applied.
"
            );
        }
        "scan" => {
            eprintln!(
                "uuvr-loader scan - List implementation files

USAGE:
    uuvr-loader scan [DIR] [--json]

DESCRIPTION:
    Lists files named <prefix>-<backend>-<abi>-<version>.<ext> in DIR
    (default: the configured implementation directory). Files whose
    version cannot be parsed are reported as warnings.

EXIT CODES:
    0  Directory listed
    1  Directory not found
    2  Configuration error
"
            );
        }
        "resolve" => {
            eprintln!(
                "uuvr-loader resolve - Dry-run selection

USAGE:
    uuvr-loader resolve [DIR] [--json]

DESCRIPTION:
    Probes the host, scores every compatible candidate in DIR and
    prints the one the loader would activate. Same-major candidates
    are preferred; otherwise exactly one major version older is tried.
    Nothing is loaded.

EXIT CODES:
    0  An implementation would be selected
    1  No implementation matches
    2  Configuration error
"
            );
        }
        "config" => {
            eprintln!(
                "uuvr-loader config - Configuration

USAGE:
    uuvr-loader config [show|defaults|validate]

DESCRIPTION:
    show      Effective values after uuvr-loader.toml and environment
    defaults  Built-in defaults
    validate  Check values; exit 2 on any problem
"
            );
        }
        _ => {
            eprintln!("No detailed help for '{}'.", command);
            print_usage();
        }
    }
}
