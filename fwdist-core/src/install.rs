//! Locating a device build on disk and reading what sits next to it.
//!
//! Layout under each install root:
//!
//! ```text
//! <root>/<device>/device.info
//! <root>/<device>/<version>/partitions.bin
//! <root>/<device>/<version>/...firmware images
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use fwdist_config::FirmwareSource;

/// Ordered install roots. A root whose source name matches the request is
/// tried first, then every root in order; the first one holding
/// `<device>/<version>` wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRoots {
    sources: Vec<FirmwareSource>,
}

impl InstallRoots {
    pub fn new(sources: Vec<FirmwareSource>) -> Self {
        Self { sources }
    }

    pub fn sources(&self) -> &[FirmwareSource] {
        &self.sources
    }

    pub async fn find(
        &self,
        device: &str,
        version: &str,
        src: Option<&str>,
    ) -> Option<&FirmwareSource> {
        if !is_plain_segment(device) || !is_plain_segment(version) {
            tracing::warn!("Rejecting suspicious build path: {}/{}", device, version);
            return None;
        }

        let preferred = self
            .sources
            .iter()
            .filter(|source| src.is_some() && source.src.as_deref() == src);

        for source in preferred.chain(&self.sources) {
            if is_dir(&source.path.join(device).join(version)).await {
                return Some(source);
            }
        }
        None
    }
}

/// A single path component: no separators, not `.` or `..`.
pub fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// Reads a whole file, mapping "not found" to `None`.
pub async fn read_optional(path: &Path) -> anyhow::Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => {
            Err(err).with_context(|| format!("Failed to read {}", path.display()))
        }
    }
}
