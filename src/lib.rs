//! UUVR Loader
//!
//! Picks the one implementation library that matches the running game
//! engine and hands it control.
//!
//! # Pipeline
//!
//! - **Probe**: build a [`HostFingerprint`] (backend, ABI, bit-width, engine version)
//! - **Discover**: list `<prefix>-<backend>-<abi>-<version>.<ext>` files
//! - **Parse**: turn file names into [`CandidateArtifact`]s, skipping bad ones
//! - **Select**: exact major tier first, then exactly one major older
//! - **Activate**: load the winner and call its entry point once per process
//!
//! Hosts call [`bootstrap`] (or `uuvr_loader_bootstrap` through the C ABI);
//! the `uuvr-loader` binary exposes the same pipeline as a dry run.

pub mod activation;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod ffi;
pub mod probe;
pub mod resolver;
pub mod telemetry;
pub mod version;

use std::path::{Path, PathBuf};

use tracing::{error, info};

pub use activation::{ActivationMarker, Activator, ConfigHandle, LibraryActivator};
pub use config::LoaderConfig;
pub use discovery::{ArtifactPattern, CandidateArtifact};
pub use error::ResolveError;
pub use probe::{BackendKind, GameDirIntrospector, HostFingerprint, HostIntrospector};
pub use resolver::{MatchScore, Selection, Tier};
pub use version::VersionTriple;

use telemetry::{LogError, ResolutionSpan, SpanExt};

/// Result of one bootstrap call.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The selected implementation was loaded and started.
    Activated(Selection),
    /// An implementation was already active in this process; nothing was done.
    AlreadyActive(PathBuf),
}

/// Runs the probe → resolve → activate pipeline.
pub struct Bootstrapper {
    config: LoaderConfig,
    introspector: Box<dyn HostIntrospector>,
    activator: Box<dyn Activator>,
    marker: ActivationMarker,
}

impl Bootstrapper {
    /// Pipeline backed by the game directory and native library loading.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            introspector: Box::new(GameDirIntrospector::new(config.game_dir())),
            activator: Box::new(LibraryActivator::new(config.entry_symbol.clone())),
            marker: ActivationMarker::new(config.marker_var.clone()),
            config,
        }
    }

    pub fn with_introspector(mut self, introspector: Box<dyn HostIntrospector>) -> Self {
        self.introspector = introspector;
        self
    }

    pub fn with_activator(mut self, activator: Box<dyn Activator>) -> Self {
        self.activator = activator;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn marker(&self) -> &ActivationMarker {
        &self.marker
    }

    /// Build the host fingerprint with configured overrides applied.
    pub fn probe(&self) -> Result<HostFingerprint, ResolveError> {
        let overrides = self.config.probe_overrides()?;
        Ok(probe::probe(self.introspector.as_ref(), &overrides))
    }

    /// Resolve an implementation in `directory` and activate it.
    ///
    /// The activation marker is consulted first; a second call in the same
    /// process returns [`Outcome::AlreadyActive`] without probing or
    /// touching `directory`.
    pub fn run(&self, directory: &Path, handle: ConfigHandle) -> Result<Outcome, ResolveError> {
        if let Some(active) = self.marker.active() {
            info!(path = %active.display(), "implementation already active; skipping");
            return Ok(Outcome::AlreadyActive(active));
        }

        let host = match self.probe() {
            Ok(host) => host,
            Err(e) => {
                error!(
                    directory = %directory.display(),
                    error = %e,
                    "host environment could not be resolved"
                );
                return Err(e);
            }
        };
        let span = ResolutionSpan::new(directory, &host);
        let _enter = span.enter();

        let result = self.resolve_and_activate(&host, directory, handle);
        span.record_result(&result);
        match &result {
            Ok(selection) => {
                span.record("selected", selection.artifact.raw_file_name.as_str());
                self.marker.mark(&selection.artifact);
                info!(
                    path = %selection.artifact.path.display(),
                    tier = %selection.tier,
                    score = %selection.score,
                    "implementation activated"
                );
            }
            Err(e) => error!(
                directory = %directory.display(),
                host = %host,
                error = %e,
                "implementation resolution failed"
            ),
        }
        result.map(Outcome::Activated)
    }

    fn resolve_and_activate(
        &self,
        host: &HostFingerprint,
        directory: &Path,
        handle: ConfigHandle,
    ) -> Result<Selection, ResolveError> {
        let pattern = self.config.artifact_pattern()?;
        let resolution = resolver::resolve(host, directory, &pattern)?;
        self.activator.activate(&resolution.selection.artifact, handle)?;
        Ok(resolution.selection)
    }
}

/// Bootstrap from a loader installed in `loader_dir`.
///
/// Loads `uuvr-loader.toml` and `UUVR_LOADER_*` settings, installs the log
/// subscriber unless the process already has one, then resolves and
/// activates from the configured implementation directory.
pub fn bootstrap(loader_dir: &Path, handle: ConfigHandle) -> Result<Outcome, ResolveError> {
    let config = config::load(loader_dir)?;
    install_logging(&config);

    let directory = config.implementation_dir(loader_dir);
    Bootstrapper::new(config).run(&directory, handle)
}

fn install_logging(config: &LoaderConfig) {
    match telemetry::init_logging(&config.log_config()) {
        Ok(()) | Err(LogError::AlreadyInitialized) => {}
        Err(e) => {
            // Fall back to stderr so the failure itself is visible.
            let _ = telemetry::init_logging(&telemetry::LogConfig::default());
            error!(error = %e, "invalid logging configuration; using defaults");
        }
    }
}
