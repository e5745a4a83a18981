//! Configuration layering: defaults, uuvr-loader.toml, environment.

use std::path::PathBuf;
use std::sync::Mutex;

use uuvr_loader::config::{self, LoaderConfig, CONFIG_FILE_NAME, ENV_KEYS};
use uuvr_loader::probe::BackendKind;
use uuvr_loader::telemetry::LogFormat;
use uuvr_loader::ResolveError;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for k in ENV_KEYS {
        std::env::remove_var(k);
    }
}

#[test]
fn defaults_without_file_or_env() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let cfg = config::load(dir.path()).unwrap();

    assert_eq!(cfg.implementation_dir(dir.path()), dir.path().join("implementation"));
    assert_eq!(cfg.prefix, "UUVR");
    assert_eq!(cfg.extension, std::env::consts::DLL_EXTENSION);
    assert_eq!(cfg.marker_var, "UUVR_LOADER_ACTIVE");
    assert_eq!(cfg.log_config().format, LogFormat::Pretty);
    assert_eq!(cfg.probe_overrides().unwrap().backend, None);
}

#[test]
fn toml_file_is_applied() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
implementation_dir = "impls"
extension = "dll"
backend = "IL2CPP"
abi = "NET48"
engine_version = "2020.3.47f1"
log_format = "json"
log_file = "loader.log"
"#,
    )
    .unwrap();

    let cfg = config::load(dir.path()).unwrap();
    assert_eq!(cfg.implementation_dir(dir.path()), dir.path().join("impls"));
    assert_eq!(cfg.artifact_pattern().unwrap().extension(), "dll");
    let overrides = cfg.probe_overrides().unwrap();
    assert_eq!(overrides.backend, Some(BackendKind::AheadOfTimeCompiled));
    assert_eq!(overrides.abi_tag.as_deref(), Some("NET48"));
    let log = cfg.log_config();
    assert_eq!(log.format, LogFormat::Json);
    assert_eq!(log.output_path, Some(PathBuf::from("loader.log")));
}

#[test]
fn env_overrides_file() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "engine_version = \"2019.4.0f1\"\n").unwrap();
    std::env::set_var("UUVR_LOADER_ENGINE_VERSION", "2021.3.1f1");
    std::env::set_var("UUVR_LOADER_MARKER_VAR", "MY_MARKER");

    let cfg = config::load(dir.path()).unwrap();
    assert_eq!(cfg.engine_version.as_deref(), Some("2021.3.1f1"));
    assert_eq!(cfg.marker_var, "MY_MARKER");
    clear_env();
}

#[test]
fn unknown_log_format_falls_back_to_pretty() {
    let cfg = LoaderConfig {
        log_format: "xml".into(),
        ..Default::default()
    };
    assert_eq!(cfg.log_config().format, LogFormat::Pretty);
    assert_eq!(cfg.validate().len(), 1);
}

#[test]
fn malformed_file_is_config_error() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "backend = 7").unwrap();
    let err = config::load(dir.path()).unwrap_err();
    assert!(matches!(err, ResolveError::Config(ref msg) if msg.contains("invalid config")));
}

#[test]
fn absolute_implementation_dir_is_kept() {
    let cfg = LoaderConfig {
        implementation_dir: PathBuf::from("/opt/uuvr"),
        ..Default::default()
    };
    assert_eq!(cfg.implementation_dir(&PathBuf::from("/game/plugins")), PathBuf::from("/opt/uuvr"));
}
