use std::path::Path;

use fwdist_core::{
    chip::ChipFamily,
    install::InstallRoots,
    manifest::ManifestRequest,
    resolution::{Field, Tier},
    runtime::Runtime,
    tables::DeviceTables,
    FirmwareKind, FirmwareSource,
};
use fwdist_partitions::{
    layout::{END_MARKER, ENTRY_SIZE, MAGIC},
    FlashSize,
};

fn record(name: &str, partition_type: u8, subtype: u8, offset: u32, size: u32) -> Vec<u8> {
    let mut out = MAGIC.to_le_bytes().to_vec();
    out.push(partition_type);
    out.push(subtype);
    out.extend_from_slice(&offset.to_le_bytes());
    out.extend_from_slice(&size.to_le_bytes());
    let mut name_bytes = [0u8; 16];
    name_bytes[..name.len()].copy_from_slice(name.as_bytes());
    out.extend_from_slice(&name_bytes);
    out.extend_from_slice(&0u32.to_le_bytes());
    out
}

fn image(records: &[Vec<u8>]) -> Vec<u8> {
    let mut out: Vec<u8> = records.concat();
    out.extend_from_slice(&END_MARKER.to_le_bytes());
    out.extend(std::iter::repeat(0xFF).take(ENTRY_SIZE - 2));
    out
}

fn build_dir(root: &Path, device: &str, version: &str) -> std::path::PathBuf {
    let dir = root.join(device).join(version);
    std::fs::create_dir_all(&dir).expect("create build dir");
    dir
}

fn runtime(root: &Path) -> Runtime {
    Runtime::new(
        InstallRoots::new(vec![FirmwareSource::new(root)]),
        DeviceTables::builtin(),
        FirmwareKind::Meshtastic,
    )
}

fn request(device: &str, version: &str, mode: &str) -> ManifestRequest {
    ManifestRequest {
        device: device.to_string(),
        version: version.to_string(),
        mode: mode.to_string(),
        source: None,
    }
}

#[tokio::test]
async fn partition_table_supplies_every_offset() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = build_dir(root.path(), "heltec-v3", "2.6.0");
    std::fs::write(
        dir.join("partitions.bin"),
        image(&[
            record("nvs", 0x01, 0x02, 0x9000, 0x5000),
            record("otadata", 0x01, 0x00, 0xe000, 0x2000),
            record("app", 0x00, 0x10, 0x10000, 0x330000),
            record("flashApp", 0x00, 0x11, 0x340000, 0xa0000),
            record("spiffs", 0x01, 0x82, 0x3e0000, 0x420000),
        ]),
    )
    .expect("write partitions");

    let runtime = runtime(root.path());
    let build = runtime
        .resolve_build("heltec-v3", "2.6.0", None)
        .await
        .expect("resolves");

    assert_eq!(build.offsets.flash_size, FlashSize::MB_8);
    assert_eq!(build.offsets.fw_offset, 0x10000);
    assert_eq!(build.offsets.secondary_offset, 0x340000);
    assert_eq!(build.offsets.fs_offset, 0x3e0000);
    assert_eq!(
        build.offsets.trace.tier_for(Field::FilesystemOffset),
        Some(Tier::PartitionTable)
    );

    let manifest = runtime
        .build_manifest(&request("heltec-v3", "2.6.0", "2"))
        .await
        .expect("manifest");
    let offsets: Vec<u32> = manifest.builds[0].parts.iter().map(|p| p.offset).collect();
    assert_eq!(offsets, vec![0x10000, 0x340000, 0x3e0000]);
    assert_eq!(manifest.builds[0].chip_family, ChipFamily::Esp32S3);
}

#[tokio::test]
async fn missing_partition_file_falls_back_to_static_8mb_list() {
    let root = tempfile::tempdir().expect("tempdir");
    build_dir(root.path(), "heltec-v3", "2.5.0");

    let build = runtime(root.path())
        .resolve_build("heltec-v3", "2.5.0", None)
        .await
        .expect("resolves");

    assert_eq!(build.offsets.flash_size, FlashSize::MB_8);
    assert_eq!(build.offsets.fw_offset, 0);
    assert_eq!(build.offsets.secondary_offset, 0x5d0000);
    assert_eq!(build.offsets.fs_offset, 0x670000);
    assert_eq!(
        build.offsets.trace.tier_for(Field::FlashSize),
        Some(Tier::StaticTable)
    );
}

#[tokio::test]
async fn corrupt_partition_file_degrades_to_declared_metadata() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = build_dir(root.path(), "custom-board", "1.0.0");
    std::fs::write(dir.join("partitions.bin"), [0x34u8; 64]).expect("write garbage");
    std::fs::write(
        root.path().join("custom-board").join("device.info"),
        r#"{"flashSize": "16MB", "chip": "esp32c3"}"#,
    )
    .expect("write device.info");

    let runtime = runtime(root.path());
    let build = runtime
        .resolve_build("custom-board", "1.0.0", None)
        .await
        .expect("resolves");

    assert_eq!(build.offsets.flash_size, FlashSize::MB_16);
    assert_eq!(build.offsets.secondary_offset, 0x650000);
    assert_eq!(build.offsets.fs_offset, 0xc90000);
    assert_eq!(
        build.offsets.trace.tier_for(Field::FlashSize),
        Some(Tier::DeviceInfo)
    );
    assert_eq!(build.chip_family, ChipFamily::Esp32C3);

    let err = runtime
        .load_partition_table("custom-board", "1.0.0", None)
        .await
        .expect_err("garbage does not parse");
    assert!(err
        .downcast_ref::<fwdist_partitions::PartitionError>()
        .is_some());
}

#[tokio::test]
async fn overlapping_table_is_ignored_entirely() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = build_dir(root.path(), "tbeam", "2.6.0");
    std::fs::write(
        dir.join("partitions.bin"),
        image(&[
            record("app", 0x00, 0x10, 0x10000, 0x300000),
            record("spiffs", 0x01, 0x09, 0x200000, 0x100000),
        ]),
    )
    .expect("write partitions");

    let build = runtime(root.path())
        .resolve_build("tbeam", "2.6.0", None)
        .await
        .expect("resolves");

    assert_eq!(build.offsets.flash_size, FlashSize::MB_4);
    assert_eq!(build.offsets.fw_offset, 0);
    assert_eq!(build.offsets.fs_offset, 0x300000);
    assert!(build
        .offsets
        .trace
        .entries()
        .iter()
        .all(|(_, tier)| *tier == Tier::Default));
}

#[tokio::test]
async fn update_manifest_uses_update_offset() {
    let root = tempfile::tempdir().expect("tempdir");
    build_dir(root.path(), "tbeam", "2.6.0");

    let manifest = runtime(root.path())
        .build_manifest(&request("tbeam", "2.6.0", "1"))
        .await
        .expect("manifest");

    assert_eq!(manifest.builds[0].parts.len(), 1);
    assert_eq!(manifest.builds[0].parts[0].offset, 0x10000);
    assert_eq!(manifest.builds[0].flashsize, FlashSize::MB_4);
}

#[tokio::test]
async fn load_partition_table_reports_absence() {
    let root = tempfile::tempdir().expect("tempdir");
    build_dir(root.path(), "tbeam", "2.6.0");
    let runtime = runtime(root.path());

    assert!(runtime
        .load_partition_table("tbeam", "2.6.0", None)
        .await
        .expect("no error")
        .is_none());
    assert!(runtime
        .load_partition_table("tbeam", "0.0.0", None)
        .await
        .expect("no error")
        .is_none());
}

#[tokio::test]
async fn each_source_decides_its_own_install_parts() {
    let meshtastic = tempfile::tempdir().expect("tempdir");
    let meshcore = tempfile::tempdir().expect("tempdir");
    build_dir(meshtastic.path(), "heltec-v3", "2.6.0");
    build_dir(meshcore.path(), "heltec-v3", "1.7.0");
    build_dir(meshcore.path(), "heltec-v3", "2.6.0");

    let runtime = Runtime::new(
        InstallRoots::new(vec![
            FirmwareSource::new(meshtastic.path()).with_src("official"),
            FirmwareSource::new(meshcore.path())
                .with_src("meshcore")
                .with_kind(FirmwareKind::Meshcore),
        ]),
        DeviceTables::builtin(),
        FirmwareKind::Meshtastic,
    );

    let mut full = request("heltec-v3", "2.6.0", "2");
    let manifest = runtime.build_manifest(&full).await.expect("manifest");
    assert_eq!(manifest.builds[0].parts.len(), 3);
    assert!(manifest.builds[0].parts[0].path.ends_with("src=official"));

    full.source = Some("meshcore".to_string());
    let manifest = runtime.build_manifest(&full).await.expect("manifest");
    assert_eq!(manifest.builds[0].parts.len(), 1);
    assert!(manifest.builds[0].parts[0].path.contains("p=fw"));
    assert!(manifest.builds[0].parts[0].path.ends_with("src=meshcore"));

    let build = runtime
        .resolve_build("heltec-v3", "1.7.0", None)
        .await
        .expect("resolves");
    assert_eq!(build.kind, FirmwareKind::Meshcore);
    assert_eq!(
        build.source.and_then(|source| source.src).as_deref(),
        Some("meshcore")
    );
}

#[tokio::test]
async fn rest_of_flash_table_defers_flash_size() {
    let root = tempfile::tempdir().expect("tempdir");
    let dir = build_dir(root.path(), "heltec-v3", "2.6.0");
    std::fs::write(
        dir.join("partitions.bin"),
        image(&[
            record("app", 0x00, 0x10, 0x10000, 0x200000),
            record("spiffs", 0x01, 0x09, 0x300000, 0xFFFF_FFFF),
        ]),
    )
    .expect("write partitions");

    let manifest = runtime(root.path())
        .build_manifest(&request("heltec-v3", "2.6.0", "2"))
        .await
        .expect("manifest");

    assert_eq!(manifest.builds[0].flashsize, FlashSize::MB_8);
    let offsets: Vec<u32> = manifest.builds[0].parts.iter().map(|p| p.offset).collect();
    assert_eq!(offsets, vec![0x10000, 0x10000, 0x300000]);
}
