//! Host probing from a synthetic game install.

use std::fs;
use std::path::Path;

use uuvr_loader::probe::{probe, BackendKind, GameDirIntrospector, HostIntrospector, ProbeOverrides, UNKNOWN_ABI};
use uuvr_loader::version::VersionTriple;

/// A serialized player file header with the engine version embedded.
fn write_globalgamemanagers(data_dir: &Path, version: &str) {
    let mut bytes = vec![0u8, 0, 0x12, 0x40, 0, 0x2c, 0x91, 0x0c, 0, 0, 0, 0x16, 0, 0, 0x10, 0, 0, 0, 0, 0];
    bytes.extend_from_slice(version.as_bytes());
    bytes.push(0);
    bytes.extend_from_slice(&[0x13, 0, 0, 0, 0x05, 0, 0, 0]);
    fs::write(data_dir.join("globalgamemanagers"), bytes).unwrap();
}

fn game(with_native: bool, runtime_dir: Option<&str>, version: Option<&str>) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("Game_Data");
    fs::create_dir(&data).unwrap();
    if with_native {
        fs::write(dir.path().join("GameAssembly.dll"), b"").unwrap();
    }
    if let Some(runtime) = runtime_dir {
        fs::create_dir(dir.path().join(runtime)).unwrap();
    }
    if let Some(version) = version {
        write_globalgamemanagers(&data, version);
    }
    dir
}

#[test]
fn il2cpp_game_is_probed() {
    let dir = game(true, None, Some("2020.3.47f1"));
    let host = probe(&GameDirIntrospector::new(dir.path()), &ProbeOverrides::default());
    assert_eq!(host.backend, BackendKind::AheadOfTimeCompiled);
    assert_eq!(host.abi_tag, "NET48");
    assert_eq!(host.engine_version, VersionTriple::new(2020, 3, "47f1"));
    assert_eq!(host.is_64_bit, cfg!(target_pointer_width = "64"));
    assert!(!host.is_degraded());
}

#[test]
fn legacy_mono_game_is_net35() {
    let dir = game(false, Some("Mono"), Some("5.6.7f1"));
    let host = probe(&GameDirIntrospector::new(dir.path()), &ProbeOverrides::default());
    assert_eq!(host.backend, BackendKind::ManagedInterpreted);
    assert_eq!(host.abi_tag, "NET35");
    assert_eq!(host.engine_version.major, 5);
}

#[test]
fn bleeding_edge_mono_is_net48() {
    let dir = game(false, Some("MonoBleedingEdge"), Some("2019.4.40f1"));
    let introspector = GameDirIntrospector::new(dir.path());
    assert_eq!(introspector.abi_tag().as_deref(), Some("NET48"));
}

#[test]
fn missing_facts_fall_back() {
    let dir = game(false, None, None);
    let host = probe(&GameDirIntrospector::new(dir.path()), &ProbeOverrides::default());
    assert_eq!(host.backend, BackendKind::ManagedInterpreted);
    assert_eq!(host.abi_tag, UNKNOWN_ABI);
    assert!(host.engine_version.is_unparseable());
    assert!(host.is_degraded());
}

#[test]
fn nonexistent_game_dir_never_panics() {
    let host = probe(
        &GameDirIntrospector::new("/nonexistent/uuvr/game"),
        &ProbeOverrides::default(),
    );
    assert_eq!(host.backend, BackendKind::Unknown);
    assert_eq!(host.abi_tag, UNKNOWN_ABI);
    assert!(host.is_degraded());
}

#[test]
fn overrides_replace_probed_values() {
    let dir = game(false, Some("Mono"), Some("5.6.7f1"));
    let overrides = ProbeOverrides {
        backend: Some(BackendKind::AheadOfTimeCompiled),
        abi_tag: Some("NET48".into()),
        engine_version: Some("2021.3.1f1".into()),
    };
    let host = probe(&GameDirIntrospector::new(dir.path()), &overrides);
    assert_eq!(host.backend, BackendKind::AheadOfTimeCompiled);
    assert_eq!(host.abi_tag, "NET48");
    assert_eq!(host.engine_version, VersionTriple::new(2021, 3, "1f1"));
}
