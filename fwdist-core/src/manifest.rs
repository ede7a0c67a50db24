//! Install manifests consumed by the web flasher.

use serde::Serialize;

use crate::{
    chip::ChipFamily,
    resolution::{OffsetResolution, UPDATE_OFFSET},
    FirmwareKind,
};

/// Install mode code for an in-place update.
pub const MODE_UPDATE: &str = "1";

/// Install mode code used for OTA packages on nRF52 boards.
pub const MODE_OTA: &str = "4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRequest {
    pub device: String,
    pub version: String,
    /// Install mode as sent by the flasher (`1` update, anything else full).
    pub mode: String,
    pub source: Option<String>,
}

impl ManifestRequest {
    pub fn is_update(&self) -> bool {
        self.mode == MODE_UPDATE
    }

    fn source(&self) -> &str {
        self.source.as_deref().unwrap_or_default()
    }

    fn download_path(&self, part: Option<&str>) -> String {
        match part {
            Some(part) => format!(
                "firmware?v={}&t={}&u={}&p={}&src={}",
                self.version,
                self.device,
                self.mode,
                part,
                self.source()
            ),
            None => format!(
                "firmware?v={}&t={}&u={}&src={}",
                self.version,
                self.device,
                self.mode,
                self.source()
            ),
        }
    }

    fn package_path(&self, mode: &str) -> String {
        format!(
            "api/firmware?v={}&t={}&u={}&e=false&src={}",
            self.version,
            self.device,
            mode,
            self.source()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Part {
    pub path: String,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Build {
    #[serde(rename = "chipFamily")]
    pub chip_family: ChipFamily,
    pub parts: Vec<Part>,
    #[schema(value_type = String, example = "4MB")]
    pub flashsize: fwdist_partitions::FlashSize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub new_install_improv_wait_time: u32,
    pub new_install_prompt_erase: bool,
    pub builds: Vec<Build>,
    pub pathfw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pathota: Option<String>,
}

/// Lays out the parts for a request from already resolved offsets.
pub fn build_manifest(
    request: &ManifestRequest,
    chip_family: ChipFamily,
    kind: FirmwareKind,
    resolution: &OffsetResolution,
) -> Manifest {
    let mut parts = Vec::new();
    let mut pathota = None;

    match chip_family {
        ChipFamily::Nrf52 => pathota = Some(request.package_path(MODE_OTA)),
        ChipFamily::Rp2040 => {}
        _ if request.is_update() => parts.push(Part {
            path: request.download_path(None),
            offset: UPDATE_OFFSET,
        }),
        _ => {
            parts.push(Part {
                path: request.download_path(Some("fw")),
                offset: resolution.fw_offset,
            });
            if kind == FirmwareKind::Meshtastic {
                if let Some(updater) = chip_family.updater_image() {
                    parts.push(Part {
                        path: request.download_path(Some(updater)),
                        offset: resolution.secondary_offset,
                    });
                }
                parts.push(Part {
                    path: request.download_path(Some("littlefs")),
                    offset: resolution.fs_offset,
                });
            }
        }
    }

    Manifest {
        name: request.device.clone(),
        version: request.version.clone(),
        new_install_improv_wait_time: 0,
        new_install_prompt_erase: true,
        builds: vec![Build {
            chip_family,
            parts,
            flashsize: resolution.flash_size,
        }],
        pathfw: request.package_path(&request.mode),
        pathota,
    }
}
