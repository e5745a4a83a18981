//! Probe, scan and resolve subcommands.
//!
//! Output is a fixed-width table on stdout, or JSON with `--json`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::discovery::{discover, parse_candidates, CandidateArtifact};
use crate::error::ResolveError;
use crate::probe::HostFingerprint;
use crate::resolver::{score_all, select, ScoredCandidate, Selection};
use crate::{Bootstrapper, LoaderConfig};

use super::{exit_code, load_config, EXIT_CONFIG_ERROR, EXIT_OK, EXIT_RESOLUTION_FAILED};

/// `probe` output.
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub game_dir: PathBuf,
    pub host: HostFingerprint,
    pub degraded: bool,
}

/// `scan` output.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub directory: PathBuf,
    pub candidates: Vec<CandidateArtifact>,
    pub unparseable: Vec<String>,
}

/// `resolve` output.
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub directory: PathBuf,
    pub host: HostFingerprint,
    pub scored: Vec<ScoredCandidate>,
    pub selection: Option<Selection>,
    pub error: Option<String>,
}

/// Show the host fingerprint.
pub fn run_probe(json: bool) -> i32 {
    let (_, cfg) = match load_config() {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    match probe_report(&cfg) {
        Ok(report) => {
            if json {
                print_json(&report)
            } else {
                print_probe(&report);
                EXIT_OK
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

/// List implementation files in `dir` (default: the configured directory).
pub fn run_scan(dir: Option<&str>, json: bool) -> i32 {
    let (loader_dir, cfg) = match load_config() {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let directory = target_dir(dir, &loader_dir, &cfg);
    match scan_report(&cfg, &directory) {
        Ok(report) => {
            if json {
                print_json(&report)
            } else {
                print_scan(&report);
                EXIT_OK
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

/// Dry-run selection: score every candidate and show the winner.
pub fn run_resolve(dir: Option<&str>, json: bool) -> i32 {
    let (loader_dir, cfg) = match load_config() {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };
    let directory = target_dir(dir, &loader_dir, &cfg);
    let report = match resolve_report(&cfg, &directory) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_code(&e);
        }
    };

    let code = if report.selection.is_some() {
        EXIT_OK
    } else {
        EXIT_RESOLUTION_FAILED
    };
    if json {
        let printed = print_json(&report);
        if printed != EXIT_OK {
            return printed;
        }
    } else {
        print_resolve(&report);
    }
    code
}

fn target_dir(dir: Option<&str>, loader_dir: &Path, cfg: &LoaderConfig) -> PathBuf {
    dir.map(PathBuf::from)
        .unwrap_or_else(|| cfg.implementation_dir(loader_dir))
}

pub fn probe_report(cfg: &LoaderConfig) -> Result<ProbeReport, ResolveError> {
    let host = Bootstrapper::new(cfg.clone()).probe()?;
    Ok(ProbeReport {
        game_dir: cfg.game_dir(),
        degraded: host.is_degraded(),
        host,
    })
}

pub fn scan_report(cfg: &LoaderConfig, directory: &Path) -> Result<ScanReport, ResolveError> {
    let pattern = cfg.artifact_pattern()?;
    let files = discover(directory, &pattern)?;
    let set = parse_candidates(&files, &pattern);
    Ok(ScanReport {
        directory: directory.to_path_buf(),
        candidates: set.candidates,
        unparseable: set.unparseable.iter().map(ToString::to_string).collect(),
    })
}

/// Resolution failures are part of the report; only setup errors
/// (configuration, missing directory) are returned as `Err`.
pub fn resolve_report(cfg: &LoaderConfig, directory: &Path) -> Result<ResolveReport, ResolveError> {
    let host = Bootstrapper::new(cfg.clone()).probe()?;
    let scan = scan_report(cfg, directory)?;
    let scored = score_all(&host, &scan.candidates);
    let (selection, error) = match select(&host, &scan.candidates) {
        Ok(selection) => (Some(selection), None),
        Err(e) => (None, Some(e.to_string())),
    };
    Ok(ResolveReport {
        directory: directory.to_path_buf(),
        host,
        scored,
        selection,
        error,
    })
}

fn print_json<T: Serialize>(report: &T) -> i32 {
    match serde_json::to_string_pretty(report) {
        Ok(text) => {
            println!("{}", text);
            EXIT_OK
        }
        Err(e) => {
            eprintln!("Error: failed to encode report: {}", e);
            EXIT_CONFIG_ERROR
        }
    }
}

fn print_probe(report: &ProbeReport) {
    println!("Game directory:  {}", report.game_dir.display());
    println!("Backend:         {}", report.host.backend);
    println!("ABI:             {}", report.host.abi_tag);
    println!("Engine version:  {}", report.host.engine_version);
    println!("Architecture:    {}", if report.host.is_64_bit { "64-bit" } else { "32-bit" });
    if report.degraded {
        println!();
        println!("Some facts could not be probed; override them with UUVR_LOADER_* variables.");
    }
}

fn print_candidates(candidates: &[CandidateArtifact]) {
    println!("{:<48} {:<8} {:<8} {:<16}", "FILE", "BACKEND", "ABI", "ENGINE");
    println!("{}", "-".repeat(82));
    for c in candidates {
        println!(
            "{:<48} {:<8} {:<8} {:<16}",
            truncate(&c.raw_file_name, 47),
            truncate(&c.backend_tag, 7),
            truncate(&c.abi_tag, 7),
            c.engine_version.to_string(),
        );
    }
}

fn print_scan(report: &ScanReport) {
    println!("Directory: {}", report.directory.display());
    if report.candidates.is_empty() {
        println!("No implementation files found.");
    } else {
        print_candidates(&report.candidates);
    }
    for warning in &report.unparseable {
        println!("WARNING: {}", warning);
    }
}

fn print_resolve(report: &ResolveReport) {
    println!("Directory: {}", report.directory.display());
    println!("Host:      {}", report.host);
    println!();

    if report.scored.is_empty() {
        println!("No candidate matches the host backend and ABI.");
    } else {
        println!("{:<48} {:>20}", "FILE", "SCORE");
        println!("{}", "-".repeat(69));
        for s in &report.scored {
            println!(
                "{:<48} {:>20}",
                truncate(&s.artifact.raw_file_name, 47),
                s.score.to_string()
            );
        }
    }
    println!();

    match (&report.selection, &report.error) {
        (Some(selection), _) => {
            println!(
                "Selected: {} ({} tier, score {})",
                selection.artifact.raw_file_name, selection.tier, selection.score
            );
            if selection.tied > 1 {
                println!("WARNING: {} candidates tied; first in discovery order wins", selection.tied);
            }
        }
        (None, Some(error)) => println!("No implementation selected: {}", error),
        (None, None) => println!("No implementation selected."),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::ArtifactPattern;

    fn il2cpp_config(version: &str) -> LoaderConfig {
        LoaderConfig {
            backend: Some("IL2CPP".into()),
            abi: Some("NET48".into()),
            engine_version: Some(version.into()),
            ..Default::default()
        }
    }

    fn touch(dir: &Path, cfg: &LoaderConfig, backend: &str, abi: &str, token: &str) {
        let pattern = ArtifactPattern::new(&cfg.prefix, &cfg.extension).unwrap();
        std::fs::write(dir.join(pattern.file_name(backend, abi, token)), b"").unwrap();
    }

    #[test]
    fn test_resolve_report_selects_exact_major() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = il2cpp_config("2020.3.47f1");
        touch(dir.path(), &cfg, "IL2CPP", "NET48", "2019_4_9p1");
        touch(dir.path(), &cfg, "IL2CPP", "NET48", "2020_3_47f1");
        touch(dir.path(), &cfg, "Mono", "NET48", "2020_3_47f1");

        let report = resolve_report(&cfg, dir.path()).unwrap();
        assert_eq!(report.scored.len(), 2);
        let selection = report.selection.unwrap();
        assert_eq!(selection.artifact.raw_file_name, format!("UUVR-IL2CPP-NET48-2020_3_47f1.{}", cfg.extension));
        assert!(selection.score.is_exact());
        assert!(report.error.is_none());
    }

    #[test]
    fn test_resolve_report_carries_selection_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = il2cpp_config("2020.3.47f1");
        touch(dir.path(), &cfg, "Mono", "NET35", "2020_3_47f1");

        let report = resolve_report(&cfg, dir.path()).unwrap();
        assert!(report.selection.is_none());
        assert!(report.error.unwrap().contains("IL2CPP"));
        print_resolve(&resolve_report(&cfg, dir.path()).unwrap());
    }

    #[test]
    fn test_scan_report_lists_unparseable() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LoaderConfig::default();
        touch(dir.path(), &cfg, "IL2CPP", "NET48", "garbage");
        touch(dir.path(), &cfg, "Mono", "NET35", "2018_4_9p1");

        let report = scan_report(&cfg, dir.path()).unwrap();
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.unparseable.len(), 1);
        assert!(serde_json::to_string(&report).unwrap().contains("2018"));
    }

    #[test]
    fn test_scan_missing_directory_is_error() {
        let cfg = LoaderConfig::default();
        let err = scan_report(&cfg, Path::new("/nonexistent/uuvr/impl")).unwrap_err();
        assert!(matches!(err, ResolveError::DirectoryNotFound(_)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
        assert_eq!(truncate("ééé", 2), "éé");
    }
}
