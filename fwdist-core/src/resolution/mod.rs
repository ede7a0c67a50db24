//! Tiered offset resolution.
//!
//! Every output field walks its own ordered list of resolvers and takes the
//! first answer:
//!
//! 1. the parsed partition table of the build,
//! 2. the metadata declared for the device,
//! 3. the compiled-in device lists,
//! 4. hardcoded constants.
//!
//! Fields are independent. A table that only yields a flash size still lets
//! the offsets come from elsewhere. Which tier answered is recorded in a
//! [`ResolutionTrace`] for logging; it never feeds back into the result.

mod chain;
mod facts;

use serde::Serialize;

use fwdist_partitions::FlashSize;

use crate::{device::DeviceInfo, tables::DeviceTables};

pub use chain::{first_success, Resolver};
pub use facts::PartitionFacts;

/// Offset of the single image written by an update install.
pub const UPDATE_OFFSET: u32 = 0x10000;

/// Flash size assumed when nothing else is known.
pub const DEFAULT_FLASH_SIZE: FlashSize = FlashSize::MB_4;

pub const DEFAULT_FIRMWARE_OFFSET: u32 = 0;

/// Updater and filesystem offsets used when the table does not supply them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackOffsets {
    pub secondary: u32,
    pub filesystem: u32,
}

impl FallbackOffsets {
    pub const FLASH_16MB: FallbackOffsets = FallbackOffsets {
        secondary: 0x650000,
        filesystem: 0xc90000,
    };
    pub const FLASH_8MB: FallbackOffsets = FallbackOffsets {
        secondary: 0x5d0000,
        filesystem: 0x670000,
    };
    pub const FLASH_4MB: FallbackOffsets = FallbackOffsets {
        secondary: 0x260000,
        filesystem: 0x300000,
    };

    /// Anything that is not exactly 8MB or 16MB gets the 4MB layout.
    pub fn for_flash_size(flash_size: FlashSize) -> Self {
        match flash_size {
            FlashSize::MB_16 => Self::FLASH_16MB,
            FlashSize::MB_8 => Self::FLASH_8MB,
            _ => Self::FLASH_4MB,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    PartitionTable,
    DeviceInfo,
    StaticTable,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FlashSize,
    FirmwareOffset,
    SecondaryOffset,
    FilesystemOffset,
}

/// Which tier supplied each field, in resolution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionTrace(Vec<(Field, Tier)>);

impl ResolutionTrace {
    fn record(&mut self, field: Field, tier: Tier) {
        self.0.push((field, tier));
    }

    pub fn tier_for(&self, field: Field) -> Option<Tier> {
        self.0
            .iter()
            .find(|(recorded, _)| *recorded == field)
            .map(|(_, tier)| *tier)
    }

    pub fn entries(&self) -> &[(Field, Tier)] {
        &self.0
    }
}

/// Final flash size and offsets for one device build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffsetResolution {
    pub flash_size: FlashSize,
    pub fw_offset: u32,
    pub secondary_offset: u32,
    pub fs_offset: u32,
    #[serde(skip)]
    pub trace: ResolutionTrace,
}

/// Everything the resolvers may look at.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionInput<'a> {
    pub device: &'a str,
    pub facts: Option<&'a PartitionFacts>,
    pub device_info: &'a DeviceInfo,
    pub tables: &'a DeviceTables,
}

/// Offset resolvers also see the flash size chosen for the device.
#[derive(Debug, Clone, Copy)]
pub struct OffsetInput<'a> {
    pub facts: Option<&'a PartitionFacts>,
    pub flash_size: FlashSize,
}

fn flash_from_table(input: &ResolutionInput<'_>) -> Option<FlashSize> {
    input.facts.and_then(|facts| facts.flash_size)
}

fn flash_from_device_info(input: &ResolutionInput<'_>) -> Option<FlashSize> {
    input.device_info.declared_flash_size()
}

fn flash_from_static_tables(input: &ResolutionInput<'_>) -> Option<FlashSize> {
    input.tables.flash_size(input.device)
}

fn flash_default(_: &ResolutionInput<'_>) -> Option<FlashSize> {
    Some(DEFAULT_FLASH_SIZE)
}

fn fw_from_table(input: &OffsetInput<'_>) -> Option<u32> {
    input.facts.and_then(|facts| facts.fw_offset)
}

fn fw_default(_: &OffsetInput<'_>) -> Option<u32> {
    Some(DEFAULT_FIRMWARE_OFFSET)
}

fn secondary_from_table(input: &OffsetInput<'_>) -> Option<u32> {
    input.facts.and_then(|facts| facts.secondary_offset)
}

fn secondary_default(input: &OffsetInput<'_>) -> Option<u32> {
    Some(FallbackOffsets::for_flash_size(input.flash_size).secondary)
}

fn fs_from_table(input: &OffsetInput<'_>) -> Option<u32> {
    input.facts.and_then(|facts| facts.fs_offset)
}

fn fs_default(input: &OffsetInput<'_>) -> Option<u32> {
    Some(FallbackOffsets::for_flash_size(input.flash_size).filesystem)
}

fn flash_size_chain<'a>() -> [Resolver<ResolutionInput<'a>, FlashSize>; 4] {
    [
        Resolver::new(Tier::PartitionTable, flash_from_table),
        Resolver::new(Tier::DeviceInfo, flash_from_device_info),
        Resolver::new(Tier::StaticTable, flash_from_static_tables),
        Resolver::new(Tier::Default, flash_default),
    ]
}

fn fw_offset_chain<'a>() -> [Resolver<OffsetInput<'a>, u32>; 2] {
    [
        Resolver::new(Tier::PartitionTable, fw_from_table),
        Resolver::new(Tier::Default, fw_default),
    ]
}

fn secondary_offset_chain<'a>() -> [Resolver<OffsetInput<'a>, u32>; 2] {
    [
        Resolver::new(Tier::PartitionTable, secondary_from_table),
        Resolver::new(Tier::Default, secondary_default),
    ]
}

fn fs_offset_chain<'a>() -> [Resolver<OffsetInput<'a>, u32>; 2] {
    [
        Resolver::new(Tier::PartitionTable, fs_from_table),
        Resolver::new(Tier::Default, fs_default),
    ]
}

/// Resolves all four fields. Pure: same input, same output.
pub fn resolve(input: &ResolutionInput<'_>) -> OffsetResolution {
    let mut trace = ResolutionTrace::default();

    let (flash_size, tier) = resolve_field(input, &flash_size_chain(), DEFAULT_FLASH_SIZE);
    note(&mut trace, Field::FlashSize, tier, flash_size);

    let offset_input = OffsetInput {
        facts: input.facts,
        flash_size,
    };

    let (fw_offset, tier) =
        resolve_field(&offset_input, &fw_offset_chain(), DEFAULT_FIRMWARE_OFFSET);
    note(&mut trace, Field::FirmwareOffset, tier, Hex(fw_offset));

    let fallback = FallbackOffsets::for_flash_size(flash_size);
    let (secondary_offset, tier) =
        resolve_field(&offset_input, &secondary_offset_chain(), fallback.secondary);
    note(&mut trace, Field::SecondaryOffset, tier, Hex(secondary_offset));

    let (fs_offset, tier) =
        resolve_field(&offset_input, &fs_offset_chain(), fallback.filesystem);
    note(&mut trace, Field::FilesystemOffset, tier, Hex(fs_offset));

    OffsetResolution {
        flash_size,
        fw_offset,
        secondary_offset,
        fs_offset,
        trace,
    }
}

/// Every chain ends in an infallible default resolver; `default` only keeps
/// the signature total.
fn resolve_field<C, T>(input: &C, chain: &[Resolver<C, T>], default: T) -> (T, Tier) {
    first_success(input, chain).unwrap_or((default, Tier::Default))
}

fn note(trace: &mut ResolutionTrace, field: Field, tier: Tier, value: impl std::fmt::Display) {
    tracing::debug!(?field, ?tier, %value, "resolved field");
    trace.record(field, tier);
}

struct Hex(u32);

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
