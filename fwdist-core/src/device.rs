//! Per-device metadata declared next to the builds.

use std::path::Path;

use fwdist_partitions::FlashSize;
use serde::{Deserialize, Serialize};

/// Contents of `<root>/<device>/device.info`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "flashSize", default, skip_serializing_if = "Option::is_none")]
    pub flash_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chip: Option<String>,
}

impl DeviceInfo {
    /// Declared flash size. A value that does not parse counts as absent.
    pub fn declared_flash_size(&self) -> Option<FlashSize> {
        let raw = self.flash_size.as_deref()?;
        match raw.parse() {
            Ok(size) => Some(size),
            Err(err) => {
                tracing::debug!("Ignoring declared flash size: {}", err);
                None
            }
        }
    }

    pub fn declared_chip(&self) -> Option<String> {
        self.chip
            .as_deref()
            .map(|chip| chip.trim().to_ascii_lowercase())
            .filter(|chip| !chip.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.flash_size.is_none() && self.chip.is_none()
    }

    /// Reads the metadata file. Missing, unreadable or malformed files yield
    /// the empty default.
    pub async fn load(path: &Path) -> DeviceInfo {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(err) => {
                tracing::debug!("No device metadata at {}: {}", path.display(), err);
                return DeviceInfo::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!("Malformed device metadata at {}: {}", path.display(), err);
                DeviceInfo::default()
            }
        }
    }
}
