//! Artifact discovery and filename parsing against real directories.

use std::fs;
use std::path::Path;

use uuvr_loader::discovery::{discover, parse_candidates, ArtifactPattern};
use uuvr_loader::ResolveError;

fn dll(pattern: &ArtifactPattern, backend: &str, abi: &str, token: &str) -> String {
    pattern.file_name(backend, abi, token)
}

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"").unwrap();
}

#[test]
fn discovery_returns_sorted_matching_files() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = ArtifactPattern::default();
    touch(dir.path(), &dll(&pattern, "Mono", "NET35", "2018_4_9p1"));
    touch(dir.path(), &dll(&pattern, "IL2CPP", "NET48", "2020_3_47f1"));
    touch(dir.path(), &dll(&pattern, "IL2CPP", "NET48", "2019_4_9p1"));
    touch(dir.path(), "README.txt");
    touch(dir.path(), "UUVR-IL2CPP-NET48.dll");
    fs::create_dir(dir.path().join(dll(&pattern, "Mono", "NET48", "2021_1_0"))).unwrap();

    let files = discover(dir.path(), &pattern).unwrap();
    let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            dll(&pattern, "IL2CPP", "NET48", "2019_4_9p1"),
            dll(&pattern, "IL2CPP", "NET48", "2020_3_47f1"),
            dll(&pattern, "Mono", "NET35", "2018_4_9p1"),
        ]
    );
    assert!(files.iter().all(|f| f.path.starts_with(dir.path())));
}

#[test]
fn prefix_match_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = ArtifactPattern::new("UUVR", "dll").unwrap();
    touch(dir.path(), "uuvr-Mono-NET35-2018_4_9p1.DLL");
    assert_eq!(discover(dir.path(), &pattern).unwrap().len(), 1);
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("implementation");
    let err = discover(&missing, &ArtifactPattern::default()).unwrap_err();
    match err {
        ResolveError::DirectoryNotFound(path) => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn file_instead_of_directory_is_not_found() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let err = discover(file.path(), &ArtifactPattern::default()).unwrap_err();
    assert!(matches!(err, ResolveError::DirectoryNotFound(_)));
}

#[test]
fn garbage_version_is_skipped_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = ArtifactPattern::new("UUVR", "dll").unwrap();
    touch(dir.path(), "UUVR-IL2CPP-NET48-garbage.dll");
    touch(dir.path(), "UUVR-IL2CPP-NET48-2020_3_47f1.dll");

    let files = discover(dir.path(), &pattern).unwrap();
    assert_eq!(files.len(), 2);

    let set = parse_candidates(&files, &pattern);
    assert_eq!(set.len(), 1);
    assert_eq!(set.candidates[0].raw_file_name, "UUVR-IL2CPP-NET48-2020_3_47f1.dll");
    assert_eq!(set.unparseable.len(), 1);
    assert!(!set.unparseable[0].is_fatal());
    assert!(set.unparseable[0].to_string().contains("UUVR-IL2CPP-NET48-garbage.dll"));
}

#[test]
fn dotted_and_underscored_names_both_parse() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = ArtifactPattern::new("UUVR", "so").unwrap();
    touch(dir.path(), "UUVR-Mono-NET48-2020.3.47f1.so");
    touch(dir.path(), "UUVR-Mono-NET35-2018_4_9p1.so");

    let set = parse_candidates(&discover(dir.path(), &pattern).unwrap(), &pattern);
    assert_eq!(set.len(), 2);
    let versions: Vec<String> = set
        .candidates
        .iter()
        .map(|c| c.engine_version.to_string())
        .collect();
    assert_eq!(versions, vec!["2018.4.9p1", "2020.3.47f1"]);
}

#[test]
fn invalid_patterns_are_config_errors() {
    assert!(matches!(ArtifactPattern::new("", "dll"), Err(ResolveError::Config(_))));
    assert!(matches!(ArtifactPattern::new("UU-VR", "dll"), Err(ResolveError::Config(_))));
    assert!(matches!(ArtifactPattern::new("UUVR", ""), Err(ResolveError::Config(_))));
    assert_eq!(ArtifactPattern::new("UUVR", ".dll").unwrap().extension(), "dll");
}
