use std::path::{Path, PathBuf};

use fwdist_config::{Config, FirmwareSource};
use fwdist_partitions::PartitionTable;

use crate::{
    chip::ChipFamily,
    device::DeviceInfo,
    install::{read_optional, InstallRoots},
    manifest::{build_manifest, Manifest, ManifestRequest},
    resolution::{resolve, OffsetResolution, PartitionFacts, ResolutionInput},
    tables::DeviceTables,
    FirmwareKind,
};

/// The device is in no install root, declares nothing and is not listed in
/// the static tables.
#[derive(Debug, thiserror::Error)]
#[error("unknown device '{device}' (version '{version}')")]
pub struct UnknownDevice {
    pub device: String,
    pub version: String,
}

/// Everything a build lookup found, before any manifest is laid out.
#[derive(Debug, Clone)]
pub struct ResolvedBuild {
    pub source: Option<FirmwareSource>,
    /// Kind of the matched source, or the configured default.
    pub kind: FirmwareKind,
    pub device_info: DeviceInfo,
    pub chip_family: ChipFamily,
    pub offsets: OffsetResolution,
}

pub struct Runtime {
    roots: InstallRoots,
    tables: DeviceTables,
    kind: FirmwareKind,
    partitions_file: String,
    device_info_file: String,
}

impl Runtime {
    pub fn new(roots: InstallRoots, tables: DeviceTables, kind: FirmwareKind) -> Self {
        Self {
            roots,
            tables,
            kind,
            partitions_file: "partitions.bin".to_string(),
            device_info_file: "device.info".to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            partitions_file: config.partitions_file.clone(),
            device_info_file: config.device_info_file.clone(),
            ..Self::new(
                InstallRoots::new(config.firmware_sources()),
                DeviceTables::builtin(),
                config.firmware_kind(),
            )
        }
    }

    pub fn sources(&self) -> &[FirmwareSource] {
        self.roots.sources()
    }

    fn partitions_path(&self, root: &Path, device: &str, version: &str) -> PathBuf {
        root.join(device).join(version).join(&self.partitions_file)
    }

    fn device_info_path(&self, root: &Path, device: &str) -> PathBuf {
        root.join(device).join(&self.device_info_file)
    }

    /// Reads the build's partition image. `None` when the build or the image
    /// does not exist; decode and validation failures are errors.
    pub async fn load_partition_table(
        &self,
        device: &str,
        version: &str,
        src: Option<&str>,
    ) -> anyhow::Result<Option<PartitionTable>> {
        let Some(source) = self.roots.find(device, version, src).await else {
            return Ok(None);
        };
        let Some(bytes) = read_optional(&self.partitions_path(&source.path, device, version)).await?
        else {
            return Ok(None);
        };

        let table = fwdist_partitions::parse_validated(&bytes)?;
        Ok(Some(table))
    }

    /// Tier 1 input. Any failure only means the tier is skipped.
    async fn partition_facts(
        &self,
        root: &Path,
        device: &str,
        version: &str,
    ) -> Option<PartitionFacts> {
        let path = self.partitions_path(root, device, version);
        let bytes = match read_optional(&path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!("No partition table at {}", path.display());
                return None;
            }
            Err(err) => {
                tracing::debug!("Skipping partition table: {:#}", err);
                return None;
            }
        };

        tracing::debug!("Parsing partition table: {}", path.display());
        match PartitionFacts::from_bytes(&bytes) {
            Ok(facts) => Some(facts),
            Err(err) => {
                tracing::debug!("Failed to parse {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Runs the full lookup for one device build.
    pub async fn resolve_build(
        &self,
        device: &str,
        version: &str,
        src: Option<&str>,
    ) -> anyhow::Result<ResolvedBuild> {
        let source = self.roots.find(device, version, src).await.cloned();

        let (device_info, facts) = match &source {
            Some(source) => (
                DeviceInfo::load(&self.device_info_path(&source.path, device)).await,
                self.partition_facts(&source.path, device, version).await,
            ),
            None => (DeviceInfo::default(), None),
        };

        if source.is_none() && device_info.is_empty() && !self.tables.is_listed(device) {
            return Err(UnknownDevice {
                device: device.to_string(),
                version: version.to_string(),
            }
            .into());
        }

        let offsets = resolve(&ResolutionInput {
            device,
            facts: facts.as_ref(),
            device_info: &device_info,
            tables: &self.tables,
        });
        let chip_family = ChipFamily::classify(device, &device_info, &self.tables);
        let kind = source.as_ref().map_or(self.kind, |source| source.kind);

        Ok(ResolvedBuild {
            source,
            kind,
            device_info,
            chip_family,
            offsets,
        })
    }

    /// Download paths name the requested source, or the one the build was
    /// found in.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn build_manifest(&self, request: &ManifestRequest) -> anyhow::Result<Manifest> {
        let build = self
            .resolve_build(&request.device, &request.version, request.source.as_deref())
            .await?;

        let request = ManifestRequest {
            source: request
                .source
                .clone()
                .or_else(|| build.source.as_ref().and_then(|source| source.src.clone())),
            ..request.clone()
        };
        Ok(build_manifest(
            &request,
            build.chip_family,
            build.kind,
            &build.offsets,
        ))
    }
}
