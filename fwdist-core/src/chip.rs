use serde::Serialize;

use crate::{device::DeviceInfo, tables::DeviceTables};

/// Target chip as the web flasher names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub enum ChipFamily {
    #[serde(rename = "ESP32")]
    Esp32,
    #[serde(rename = "ESP32-S3")]
    Esp32S3,
    #[serde(rename = "ESP32-C3")]
    Esp32C3,
    #[serde(rename = "ESP32-C6")]
    Esp32C6,
    #[serde(rename = "NRF52")]
    Nrf52,
    #[serde(rename = "RP2040")]
    Rp2040,
}

impl ChipFamily {
    /// Classifies a device from its identifier and declared chip.
    ///
    /// ESP32 variants are matched first, by identifier fragment or declared
    /// chip. Non-ESP platforms are only recognised when declared.
    pub fn classify(device: &str, info: &DeviceInfo, tables: &DeviceTables) -> ChipFamily {
        let declared = info.declared_chip();
        let declared = declared.as_deref();

        if tables.looks_like_s3(device) || declared == Some("esp32s3") {
            ChipFamily::Esp32S3
        } else if device.contains("c3") || declared == Some("esp32c3") {
            ChipFamily::Esp32C3
        } else if device.contains("c6") || declared == Some("esp32c6") {
            ChipFamily::Esp32C6
        } else if declared.is_some_and(|chip| chip.starts_with("nrf52")) {
            ChipFamily::Nrf52
        } else if declared == Some("rp2040") {
            ChipFamily::Rp2040
        } else {
            ChipFamily::Esp32
        }
    }

    /// Name of the updater image shipped for this chip, if any.
    pub fn updater_image(&self) -> Option<&'static str> {
        match self {
            ChipFamily::Esp32 => Some("mt-esp32-ota"),
            ChipFamily::Esp32S3 => Some("mt-esp32s3-ota"),
            ChipFamily::Esp32C3 | ChipFamily::Esp32C6 => Some("bleota-c3"),
            ChipFamily::Nrf52 | ChipFamily::Rp2040 => None,
        }
    }
}
