//! Aggregate facts about a table.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::table::PartitionTable;

const MIB: u64 = 1024 * 1024;

/// Capacity classes a flash chip is rounded up to.
pub const FLASH_SIZE_CLASSES_MB: [u32; 4] = [2, 4, 8, 16];

/// Flash capacity in whole megabytes, rendered as `"4MB"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlashSize(u32);

impl FlashSize {
    pub const MB_2: FlashSize = FlashSize(2);
    pub const MB_4: FlashSize = FlashSize(4);
    pub const MB_8: FlashSize = FlashSize(8);
    pub const MB_16: FlashSize = FlashSize(16);

    pub const fn from_mb(megabytes: u32) -> Self {
        FlashSize(megabytes)
    }

    pub const fn megabytes(&self) -> u32 {
        self.0
    }

    /// Smallest class that holds `bytes`, or the next whole megabyte once
    /// past the largest class.
    pub fn for_bytes(bytes: u64) -> Self {
        FLASH_SIZE_CLASSES_MB
            .iter()
            .copied()
            .find(|&class| bytes <= u64::from(class) * MIB)
            .map(FlashSize)
            .unwrap_or_else(|| {
                let megabytes = bytes.div_ceil(MIB);
                FlashSize(u32::try_from(megabytes).unwrap_or(u32::MAX))
            })
    }
}

impl fmt::Display for FlashSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}MB", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid flash size '{0}', expected a value such as \"4MB\"")]
pub struct ParseFlashSizeError(String);

impl FromStr for FlashSize {
    type Err = ParseFlashSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .len()
            .checked_sub(2)
            .filter(|&at| trimmed.is_char_boundary(at))
            .filter(|&at| trimmed[at..].eq_ignore_ascii_case("mb"))
            .map(|at| trimmed[..at].trim_end())
            .ok_or_else(|| ParseFlashSizeError(s.to_string()))?;

        match digits.parse::<u32>() {
            Ok(megabytes) if megabytes > 0 => Ok(FlashSize(megabytes)),
            _ => Err(ParseFlashSizeError(s.to_string())),
        }
    }
}

impl Serialize for FlashSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Read-only summary of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub flash_size_mb: FlashSize,
    pub flash_size_bytes: u64,
    pub partition_count: usize,
    /// Record name to `0x` offset, in decode order.
    pub partitions: IndexMap<String, String>,
}

/// Derives the flash-size class and the name to offset map.
///
/// The used size is the largest `offset + size` over all records, not the end
/// of the last record. An empty table uses 0 bytes and lands in the smallest
/// class.
pub fn analyze(table: &PartitionTable) -> Analysis {
    let flash_size_bytes = table.iter().map(|record| record.end()).max().unwrap_or(0);

    let partitions = table
        .iter()
        .map(|record| (record.name.clone(), record.offset_hex()))
        .collect();

    Analysis {
        flash_size_mb: FlashSize::for_bytes(flash_size_bytes),
        flash_size_bytes,
        partition_count: table.len(),
        partitions,
    }
}
