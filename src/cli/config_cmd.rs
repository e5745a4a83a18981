//! Config CLI subcommands: show, defaults, validate.

use crate::config::LoaderConfig;

use super::{load_config, EXIT_CONFIG_ERROR, EXIT_OK};

/// Print effective config as key-value pairs to stdout.
pub fn run_show() -> i32 {
    match load_config() {
        Ok((_, cfg)) => {
            print_config(&cfg);
            EXIT_OK
        }
        Err(code) => code,
    }
}

/// Print default config values (no file or env overrides) to stdout.
pub fn run_defaults() {
    print_config(&LoaderConfig::default());
}

/// Validate configuration. Returns 0 if valid, 2 on any problem.
pub fn run_validate() -> i32 {
    let cfg = match load_config() {
        Ok((_, cfg)) => cfg,
        Err(code) => return code,
    };
    validate(&cfg)
}

fn validate(cfg: &LoaderConfig) -> i32 {
    let problems = cfg.validate();
    if problems.is_empty() {
        println!("Configuration is valid.");
        return EXIT_OK;
    }
    for problem in &problems {
        eprintln!("ERROR: {}", problem);
    }
    EXIT_CONFIG_ERROR
}

fn print_config(cfg: &LoaderConfig) {
    for (key, value) in cfg.effective() {
        println!("{}={}", key, value);
    }
}
