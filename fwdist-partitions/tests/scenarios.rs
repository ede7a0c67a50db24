use fwdist_partitions::{
    analyze, find_best_offset,
    layout::{END_MARKER, ENTRY_SIZE, MAGIC},
    parse, parse_validated, validate, FlashSize, FormatError, PartitionError, PartitionRecord,
    PartitionType, Role, ValidationError,
};

/// Builds partition images the way the firmware build tooling lays them out.
#[derive(Default)]
struct TableBuilder {
    bytes: Vec<u8>,
}

impl TableBuilder {
    fn record(mut self, name: &str, partition_type: u8, subtype: u8, offset: u32, size: u32) -> Self {
        self.bytes.extend_from_slice(&MAGIC.to_le_bytes());
        self.bytes.push(partition_type);
        self.bytes.push(subtype);
        self.bytes.extend_from_slice(&offset.to_le_bytes());
        self.bytes.extend_from_slice(&size.to_le_bytes());
        let mut padded = [0u8; 16];
        padded[..name.len()].copy_from_slice(name.as_bytes());
        self.bytes.extend_from_slice(&padded);
        self.bytes.extend_from_slice(&0u32.to_le_bytes());
        self
    }

    fn raw_magic(mut self, magic: u16) -> Self {
        self.bytes.extend_from_slice(&magic.to_le_bytes());
        self.bytes.extend(std::iter::repeat(0).take(ENTRY_SIZE - 2));
        self
    }

    fn finish(self) -> Vec<u8> {
        self.raw_magic(END_MARKER).bytes
    }
}

#[test]
fn factory_only_table() {
    let bytes = TableBuilder::default()
        .record("nvs", 0x01, 0x02, 0x9000, 0x5000)
        .record("factory", 0x00, 0x00, 0xe000, 0x100000)
        .finish();

    let table = parse_validated(&bytes).expect("valid table");
    let analysis = analyze(&table);
    assert_eq!(analysis.flash_size_bytes, 0xe000 + 0x100000);
    assert_eq!(analysis.flash_size_mb, FlashSize::MB_2);
    assert_eq!(
        find_best_offset(&table, PartitionType::App, &[0x10, 0x00]),
        Some(0xe000)
    );
}

#[test]
fn subtype_priority_beats_offset() {
    let bytes = TableBuilder::default()
        .record("app0", 0x00, 0x10, 0x20000, 0x10000)
        .record("factory", 0x00, 0x00, 0x10000, 0x10000)
        .finish();

    let table = parse(&bytes).expect("decodes");
    assert_eq!(
        find_best_offset(&table, PartitionType::App, &[0x10, 0x00]),
        Some(0x20000)
    );
}

#[test]
fn typical_ota_layout_resolves_every_role() {
    let bytes = TableBuilder::default()
        .record("nvs", 0x01, 0x02, 0x9000, 0x5000)
        .record("otadata", 0x01, 0x00, 0xe000, 0x2000)
        .record("app", 0x00, 0x10, 0x10000, 0x250000)
        .record("flashApp", 0x00, 0x11, 0x260000, 0xa0000)
        .record("spiffs", 0x01, 0x82, 0x300000, 0x100000)
        .finish();

    let table = parse_validated(&bytes).expect("valid table");
    assert_eq!(Role::FIRMWARE.find_in(&table), Some(0x10000));
    assert_eq!(Role::SECONDARY.find_in(&table), Some(0x260000));
    assert_eq!(Role::FILESYSTEM.find_in(&table), Some(0x300000));
    assert_eq!(analyze(&table).flash_size_mb, FlashSize::MB_4);
}

#[test]
fn decoded_records_match_what_was_written() {
    let expected = vec![
        PartitionRecord::new("nvs", PartitionType::Data, 0x02, 0x9000, 0x6000, 0),
        PartitionRecord::new("phy_init", PartitionType::Data, 0x01, 0xf000, 0x1000, 0),
        PartitionRecord::new("factory", PartitionType::App, 0x00, 0x10000, 0x100000, 0),
    ];
    let mut builder = TableBuilder::default();
    for record in &expected {
        builder = builder.record(
            &record.name,
            record.partition_type.into(),
            record.subtype,
            record.offset,
            record.size,
        );
    }

    let table = parse(&builder.finish()).expect("decodes");
    assert_eq!(table.records(), expected.as_slice());
}

#[test]
fn bad_magic_is_reported_at_its_offset() {
    let bytes = TableBuilder::default()
        .record("nvs", 0x01, 0x02, 0x9000, 0x5000)
        .raw_magic(0x1234)
        .finish();

    assert_eq!(
        parse(&bytes),
        Err(FormatError::BadMagic {
            magic: 0x1234,
            offset: ENTRY_SIZE
        })
    );
}

#[test]
fn short_buffer_is_a_format_error() {
    let err = parse_validated(&[0u8; 10]).unwrap_err();
    assert!(matches!(
        err,
        PartitionError::Format(FormatError::TooSmall { len: 10 })
    ));
}

#[test]
fn overlapping_table_decodes_but_fails_validation() {
    let bytes = TableBuilder::default()
        .record("app0", 0x00, 0x10, 0x10000, 0x200000)
        .record("spiffs", 0x01, 0x82, 0x100000, 0x100000)
        .finish();

    let table = parse(&bytes).expect("decodes");
    let err = validate(&table).unwrap_err();
    assert!(matches!(err, ValidationError::Overlap { .. }));
    assert_eq!(err.record_name(), Some("app0"));
    assert!(err.to_string().contains("overlaps with 'spiffs'"));
}
