//! Filesystem-based introspection of an installed game.
//!
//! Layout conventions relied on:
//! - IL2CPP builds ship `GameAssembly.{dll,so,dylib}` next to the executable.
//! - Player data lives in `<Name>_Data/` (`Contents/Resources/Data` on macOS).
//! - Serialized player files (`globalgamemanagers`, `mainData`,
//!   `data.unity3d`) embed the engine version as a NUL-terminated ASCII
//!   string near the start of the header.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{BackendKind, HostIntrospector};
use crate::version::VersionTriple;

const NATIVE_ASSEMBLIES: &[&str] = &["GameAssembly.dll", "GameAssembly.so", "GameAssembly.dylib"];

/// Player files checked in order for the embedded engine version.
const VERSIONED_FILES: &[&str] = &["globalgamemanagers", "mainData", "data.unity3d"];

/// Bytes of header scanned for the version string.
const HEADER_SCAN_LEN: u64 = 256;

/// Reads host facts from the game's install directory.
#[derive(Debug, Clone)]
pub struct GameDirIntrospector {
    game_dir: PathBuf,
}

impl GameDirIntrospector {
    pub fn new(game_dir: impl Into<PathBuf>) -> Self {
        Self {
            game_dir: game_dir.into(),
        }
    }

    /// Introspect the process working directory.
    pub fn from_current_dir() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }

    pub fn game_dir(&self) -> &Path {
        &self.game_dir
    }

    /// Locate the player data directory.
    pub fn data_dir(&self) -> Option<PathBuf> {
        let mac = self.game_dir.join("Contents").join("Resources").join("Data");
        if mac.is_dir() {
            return Some(mac);
        }

        let mut dirs: Vec<PathBuf> = fs::read_dir(&self.game_dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_dir()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.ends_with("_Data"))
            })
            .collect();
        dirs.sort();
        dirs.into_iter().next()
    }

    fn has_runtime_dir(&self, name: &str) -> bool {
        if self.game_dir.join(name).is_dir() {
            return true;
        }
        self.data_dir().is_some_and(|data| data.join(name).is_dir())
    }
}

impl HostIntrospector for GameDirIntrospector {
    fn backend(&self) -> Option<BackendKind> {
        if !self.game_dir.is_dir() {
            return None;
        }
        let native = NATIVE_ASSEMBLIES
            .iter()
            .any(|name| self.game_dir.join(name).is_file());
        Some(if native {
            BackendKind::AheadOfTimeCompiled
        } else {
            BackendKind::ManagedInterpreted
        })
    }

    fn abi_tag(&self) -> Option<String> {
        if self.backend()? == BackendKind::AheadOfTimeCompiled {
            return Some("NET48".to_string());
        }
        if self.has_runtime_dir("MonoBleedingEdge") {
            return Some("NET48".to_string());
        }
        if self.has_runtime_dir("Mono") {
            return Some("NET35".to_string());
        }
        None
    }

    fn engine_version(&self) -> Option<String> {
        let data_dir = self.data_dir()?;
        VERSIONED_FILES.iter().find_map(|name| {
            let path = data_dir.join(name);
            let version = read_header_version(&path);
            if let Some(version) = &version {
                debug!(file = %path.display(), %version, "engine version found in player data");
            }
            version
        })
    }
}

/// Extract the engine version string embedded in a player file header.
pub(crate) fn read_header_version(path: &Path) -> Option<String> {
    let mut header = Vec::with_capacity(HEADER_SCAN_LEN as usize);
    File::open(path)
        .ok()?
        .take(HEADER_SCAN_LEN)
        .read_to_end(&mut header)
        .ok()?;
    find_version_string(&header)
}

/// First NUL-delimited printable run that parses as a dotted version.
fn find_version_string(bytes: &[u8]) -> Option<String> {
    bytes
        .split(|b| !b.is_ascii_graphic())
        .filter(|run| run.len() >= 3 && run.contains(&b'.'))
        .filter_map(|run| std::str::from_utf8(run).ok())
        .find(|candidate| !VersionTriple::parse(candidate).is_unparseable())
        .map(str::to_string)
}
