use std::{path::PathBuf, str::FromStr};

use envconfig::Envconfig;
use lazy_static::lazy_static;

#[derive(Debug, Envconfig)]
pub struct Config {
    #[envconfig(from = "FWDIST_PORT", default = "5001")]
    pub port: u16,
    #[envconfig(from = "FWDIST_HOST", default = "0.0.0.0")]
    pub host: String,
    #[envconfig(from = "FWDIST_LOG_LEVEL", default = "info")]
    pub log_level: String,
    /// Comma separated install roots, searched in order. Each entry is
    /// `path[=src[:kind]]`.
    #[envconfig(from = "FWDIST_FIRMWARE_DIRS", default = "./firmware")]
    pub firmware_dirs: String,
    /// Firmware kind for roots that do not name one.
    #[envconfig(from = "FWDIST_FIRMWARE_KIND", default = "meshtastic")]
    pub firmware_kind: String,
    #[envconfig(from = "FWDIST_PARTITIONS_FILE", default = "partitions.bin")]
    pub partitions_file: String,
    #[envconfig(from = "FWDIST_DEVICE_INFO_FILE", default = "device.info")]
    pub device_info_file: String,
}

impl Config {
    pub fn init() -> Config {
        Config::init_from_env().expect("Failed to load config")
    }

    pub fn firmware_sources(&self) -> Vec<FirmwareSource> {
        parse_sources(&self.firmware_dirs, self.firmware_kind())
    }

    pub fn firmware_kind(&self) -> FirmwareKind {
        self.firmware_kind.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Unknown firmware kind '{}', falling back to meshtastic",
                self.firmware_kind
            );
            FirmwareKind::Meshtastic
        })
    }
}

fn parse_sources(raw: &str, default_kind: FirmwareKind) -> Vec<FirmwareSource> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_source(entry, default_kind))
        .collect()
}

fn parse_source(entry: &str, default_kind: FirmwareKind) -> FirmwareSource {
    let Some((path, label)) = entry.split_once('=') else {
        return FirmwareSource::new(entry).with_kind(default_kind);
    };

    let (src, kind) = match label.rsplit_once(':') {
        Some((src, kind)) => (
            src,
            kind.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    "Unknown firmware kind '{}' for {}, using {:?}",
                    kind,
                    path,
                    default_kind
                );
                default_kind
            }),
        ),
        None => (label, default_kind),
    };

    let source = FirmwareSource::new(path.trim()).with_kind(kind);
    match src.trim() {
        "" => source,
        src => source.with_src(src),
    }
}

/// One install root and the source name clients select it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareSource {
    pub path: PathBuf,
    pub src: Option<String>,
    pub kind: FirmwareKind,
}

impl FirmwareSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            src: None,
            kind: FirmwareKind::default(),
        }
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn with_kind(mut self, kind: FirmwareKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Firmware family served from the install roots. Decides which images go
/// into a full install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirmwareKind {
    #[default]
    Meshtastic,
    Meshcore,
}

impl FirmwareKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FirmwareKind::Meshtastic => "meshtastic",
            FirmwareKind::Meshcore => "meshcore",
        }
    }
}

impl FromStr for FirmwareKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "meshtastic" => Ok(FirmwareKind::Meshtastic),
            "meshcore" => Ok(FirmwareKind::Meshcore),
            other => Err(format!("unknown firmware kind: {}", other)),
        }
    }
}

lazy_static! {
    pub static ref CONFIG: Config = Config::init();
}
