//! Config schema types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub media: MediaConfig,
    pub store: StoreConfig,
    pub destination: DestinationConfig,
}

/// Media acquisition and transcoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Explicit ffmpeg binary. Looked up in `PATH` when unset.
    pub ffmpeg_path: Option<PathBuf>,
    /// Deadline for one whole conversion, in seconds.
    pub transcode_timeout_secs: u64,
    /// Downloads larger than this are refused.
    pub max_download_bytes: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            transcode_timeout_secs: 120,
            max_download_bytes: 100 * 1024 * 1024,
        }
    }
}

/// Local encrypted object store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory. Defaults to `<data dir>/media`.
    pub dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Configured directory, else `<data dir>/media`, else `./media`.
    #[must_use]
    pub fn resolve_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .or_else(|| crate::loader::data_dir().map(|dir| dir.join("media")))
            .unwrap_or_else(|| PathBuf::from("media"))
    }
}

/// Destination protocol settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    /// Server part used for `user@server` sender identifiers. The converter's
    /// own default applies when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
}
