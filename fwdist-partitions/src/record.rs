use serde::Serialize;

use crate::layout::{self, app, data, FLAG_ENCRYPTED, SIZE_REST_OF_FLASH};

/// Top level partition classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionType {
    App,
    Data,
    /// Any other byte. Kept so that decoding never loses information.
    Other(u8),
}

impl From<u8> for PartitionType {
    fn from(value: u8) -> Self {
        match value {
            layout::TYPE_APP => PartitionType::App,
            layout::TYPE_DATA => PartitionType::Data,
            other => PartitionType::Other(other),
        }
    }
}

impl From<PartitionType> for u8 {
    fn from(value: PartitionType) -> Self {
        match value {
            PartitionType::App => layout::TYPE_APP,
            PartitionType::Data => layout::TYPE_DATA,
            PartitionType::Other(other) => other,
        }
    }
}

impl PartitionType {
    pub fn name(&self) -> String {
        match self {
            PartitionType::App => "app".to_string(),
            PartitionType::Data => "data".to_string(),
            PartitionType::Other(value) => format!("0x{:02x}", value),
        }
    }
}

/// One decoded partition entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRecord {
    pub name: String,
    pub partition_type: PartitionType,
    pub subtype: u8,
    pub offset: u32,
    pub size: u32,
    pub flags: u32,
}

impl PartitionRecord {
    pub fn new(
        name: impl Into<String>,
        partition_type: PartitionType,
        subtype: u8,
        offset: u32,
        size: u32,
        flags: u32,
    ) -> Self {
        Self {
            name: name.into(),
            partition_type,
            subtype,
            offset,
            size,
            flags,
        }
    }

    pub fn type_name(&self) -> String {
        self.partition_type.name()
    }

    pub fn subtype_name(&self) -> String {
        subtype_name(self.partition_type, self.subtype)
    }

    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    pub fn extends_to_end(&self) -> bool {
        self.size == SIZE_REST_OF_FLASH
    }

    /// First byte past the partition. Computed in 64 bits so the sentinel
    /// size cannot wrap.
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }

    pub fn offset_hex(&self) -> String {
        format!("0x{:x}", self.offset)
    }

    pub fn size_hex(&self) -> String {
        format!("0x{:x}", self.size)
    }

    pub fn offset_kb(&self) -> f64 {
        f64::from(self.offset) / 1024.0
    }

    pub fn size_kb(&self) -> f64 {
        f64::from(self.size) / 1024.0
    }

    pub fn size_mb(&self) -> f64 {
        f64::from(self.size) / (1024.0 * 1024.0)
    }
}

/// Human readable subtype name, or the two digit hex value when unknown.
pub fn subtype_name(partition_type: PartitionType, subtype: u8) -> String {
    let known = match partition_type {
        PartitionType::App => match subtype {
            app::FACTORY => Some("factory".to_string()),
            app::TEST => Some("test".to_string()),
            app::OTA_0..=app::OTA_15 => Some(format!("ota_{}", subtype - app::OTA_0)),
            _ => None,
        },
        PartitionType::Data => match subtype {
            data::OTA => Some("ota".to_string()),
            data::PHY => Some("phy".to_string()),
            data::NVS => Some("nvs".to_string()),
            data::NVS_KEYS => Some("nvs_keys".to_string()),
            data::EFUSE => Some("efuse".to_string()),
            data::UNDEFINED => Some("undefined".to_string()),
            data::ESPHTTPD => Some("esphttpd".to_string()),
            data::FAT => Some("fat".to_string()),
            data::SPIFFS | data::SPIFFS_LEGACY => Some("spiffs".to_string()),
            data::LITTLEFS => Some("littlefs".to_string()),
            data::DESCRIPTORS => Some("descriptors".to_string()),
            data::COREDUMP => Some("coredump".to_string()),
            _ => None,
        },
        PartitionType::Other(_) => None,
    };
    known.unwrap_or_else(|| format!("0x{:02x}", subtype))
}

/// Flat, serializable projection of a record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub subtype: String,
    pub offset: u32,
    pub size: u32,
    pub flags: u32,
    #[serde(flatten)]
    pub details: Option<RecordDetails>,
}

/// Extra fields carried by the human readable JSON view.
#[derive(Debug, Clone, Serialize)]
pub struct RecordDetails {
    pub offset_hex: String,
    pub size_hex: String,
    pub size_kb: f64,
    pub size_mb: f64,
    pub encrypted: bool,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl PartitionRecord {
    pub fn view(&self, human_readable: bool) -> RecordView {
        RecordView {
            name: self.name.clone(),
            type_name: self.type_name(),
            subtype: self.subtype_name(),
            offset: self.offset,
            size: self.size,
            flags: self.flags,
            details: human_readable.then(|| RecordDetails {
                offset_hex: self.offset_hex(),
                size_hex: self.size_hex(),
                size_kb: round2(self.size_kb()),
                size_mb: round2(self.size_mb()),
                encrypted: self.is_encrypted(),
            }),
        }
    }
}
