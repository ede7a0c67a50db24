//! On-flash layout constants.
//!
//! Magic values are given as they read after little-endian decoding: a valid
//! record starts with the bytes `AA 50`, the end marker with `EB EB`.

use std::mem;

use static_assertions::const_assert;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Leading field of every valid record.
pub const MAGIC: u16 = 0x50AA;

/// Leading field of the record that terminates the table.
pub const END_MARKER: u16 = 0xEBEB;

/// Size of one record in bytes.
pub const ENTRY_SIZE: usize = 32;

/// Length of the zero padded name field.
pub const NAME_LEN: usize = 16;

/// Length of the optional MD5 digest carried by the end-marker record.
pub const CHECKSUM_LEN: usize = 16;

/// Offsets and sizes must be multiples of this.
pub const ALIGNMENT: u32 = 0x1000;

/// Size value meaning "extends to the end of flash".
pub const SIZE_REST_OF_FLASH: u32 = 0xFFFF_FFFF;

/// Flags bit marking an encrypted partition.
pub const FLAG_ENCRYPTED: u32 = 0x01;

/// One record as it sits in flash. Multi-byte fields are little-endian.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub(crate) struct RawEntry {
    pub magic: [u8; 2],
    pub partition_type: u8,
    pub subtype: u8,
    pub offset: [u8; 4],
    pub size: [u8; 4],
    pub name: [u8; NAME_LEN],
    pub flags: [u8; 4],
}

impl RawEntry {
    pub fn magic(&self) -> u16 {
        u16::from_le_bytes(self.magic)
    }

    pub fn offset(&self) -> u32 {
        u32::from_le_bytes(self.offset)
    }

    pub fn size(&self) -> u32 {
        u32::from_le_bytes(self.size)
    }

    pub fn flags(&self) -> u32 {
        u32::from_le_bytes(self.flags)
    }
}

/// The end-marker record read as the MD5 record. `fill` is all `0xFF` when
/// `digest` is present.
#[repr(C)]
#[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub(crate) struct RawChecksumEntry {
    pub magic: [u8; 2],
    pub fill: [u8; ENTRY_SIZE - 2 - CHECKSUM_LEN],
    pub digest: [u8; CHECKSUM_LEN],
}

const_assert!(mem::size_of::<RawEntry>() == ENTRY_SIZE);
const_assert!(mem::size_of::<RawChecksumEntry>() == ENTRY_SIZE);

pub const TYPE_APP: u8 = 0x00;
pub const TYPE_DATA: u8 = 0x01;

pub mod app {
    pub const FACTORY: u8 = 0x00;
    pub const OTA_0: u8 = 0x10;
    pub const OTA_1: u8 = 0x11;
    pub const OTA_15: u8 = 0x1F;
    pub const TEST: u8 = 0x20;
}

pub mod data {
    pub const OTA: u8 = 0x00;
    pub const PHY: u8 = 0x01;
    pub const NVS: u8 = 0x02;
    pub const NVS_KEYS: u8 = 0x03;
    pub const EFUSE: u8 = 0x04;
    pub const UNDEFINED: u8 = 0x05;
    pub const ESPHTTPD: u8 = 0x06;
    pub const FAT: u8 = 0x07;
    pub const SPIFFS: u8 = 0x08;
    pub const LITTLEFS: u8 = 0x09;
    pub const DESCRIPTORS: u8 = 0x10;
    /// Seen in older tables, reads as spiffs.
    pub const SPIFFS_LEGACY: u8 = 0x82;
    pub const COREDUMP: u8 = 0xFE;
}
