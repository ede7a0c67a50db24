//! Compiled-in device lists used when a build carries no partition table.

use fwdist_partitions::FlashSize;

const FLASH_8MB_DEVICES: &[&str] = &[
    "picomputer-s3",
    "unphone",
    "seeed-sensecap-indicator",
    "crowpanel-esp32s3",
    "heltec_capsule_sensor_v3",
    "heltec-v3",
    "heltec-vision-master-e213",
    "heltec-vision-master-e290",
    "heltec-vision-master-t190",
    "heltec-wireless-paper",
    "heltec-wireless-tracker",
    "heltec-wsl-v3",
    "icarus",
    "seeed-xiao-s3",
    "tbeam-s3-core",
    "tracksenger",
];

const FLASH_16MB_DEVICES: &[&str] = &[
    "t-deck",
    "mesh-tab",
    "t-energy-s3",
    "dreamcatcher",
    "ESP32-S3-Pico",
    "m5stack-cores3",
    "station-g2",
    "t-eth-elite",
    "t-watch-s3",
    "elecrow-adv-35-tft",
    "elecrow-adv-24-28-tft",
    "elecrow-adv1-43-50-70-tft",
];

/// Identifier fragments that mark an ESP32-S3 board.
const S3_MARKERS: &[&str] = &["s3", "-v3", "t-deck", "wireless-paper", "wireless-tracker"];

/// Immutable lookup data handed to the resolver. Build once and share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceTables {
    pub flash_8mb: Vec<String>,
    pub flash_16mb: Vec<String>,
    pub s3_markers: Vec<String>,
}

impl DeviceTables {
    pub fn builtin() -> Self {
        Self::new(FLASH_8MB_DEVICES, FLASH_16MB_DEVICES, S3_MARKERS)
    }

    pub fn new(flash_8mb: &[&str], flash_16mb: &[&str], s3_markers: &[&str]) -> Self {
        let owned = |items: &[&str]| items.iter().map(|item| item.to_string()).collect();
        Self {
            flash_8mb: owned(flash_8mb),
            flash_16mb: owned(flash_16mb),
            s3_markers: owned(s3_markers),
        }
    }

    /// Flash class for a listed device. The 8MB list is checked first.
    pub fn flash_size(&self, device: &str) -> Option<FlashSize> {
        if self.flash_8mb.iter().any(|listed| listed == device) {
            Some(FlashSize::MB_8)
        } else if self.flash_16mb.iter().any(|listed| listed == device) {
            Some(FlashSize::MB_16)
        } else {
            None
        }
    }

    pub fn is_listed(&self, device: &str) -> bool {
        self.flash_size(device).is_some()
    }

    pub fn looks_like_s3(&self, device: &str) -> bool {
        self.s3_markers.iter().any(|marker| device.contains(marker.as_str()))
    }
}

impl Default for DeviceTables {
    fn default() -> Self {
        Self::builtin()
    }
}
