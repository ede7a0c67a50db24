//! Byte buffer to [`PartitionTable`].

use zerocopy::{FromBytes, IntoBytes};

use crate::{
    error::FormatError,
    layout::{RawChecksumEntry, RawEntry, CHECKSUM_LEN, END_MARKER, ENTRY_SIZE, MAGIC},
    record::{PartitionRecord, PartitionType},
    table::PartitionTable,
};

/// Decodes a partition table image.
///
/// Records are read back to back until a record starts with the end marker or
/// the buffer runs out exactly on a record boundary. Anything after the end
/// marker (usually `0xFF` padding) is ignored. The input is never modified.
///
/// # Errors
/// - [`FormatError::TooSmall`] when the buffer cannot hold a single record.
/// - [`FormatError::BadMagic`] when a record starts with neither the table
///   magic nor the end marker.
/// - [`FormatError::Truncated`] when a partial record trails the last full one.
pub fn parse(bytes: &[u8]) -> Result<PartitionTable, FormatError> {
    if bytes.len() < ENTRY_SIZE {
        return Err(FormatError::TooSmall { len: bytes.len() });
    }

    let mut records = Vec::new();
    let mut checksum = None;
    let mut offset = 0;

    while offset < bytes.len() {
        let Ok((entry, _)) = RawEntry::ref_from_prefix(&bytes[offset..]) else {
            return Err(FormatError::Truncated {
                offset,
                remaining: bytes.len() - offset,
            });
        };

        let magic = entry.magic();
        if magic == END_MARKER {
            checksum = read_checksum(entry);
            break;
        }
        if magic != MAGIC {
            return Err(FormatError::BadMagic { magic, offset });
        }

        records.push(decode_record(entry));
        offset += ENTRY_SIZE;
    }

    tracing::trace!(
        records = records.len(),
        has_checksum = checksum.is_some(),
        "decoded partition table"
    );

    Ok(PartitionTable::new(records, checksum))
}

fn decode_record(entry: &RawEntry) -> PartitionRecord {
    PartitionRecord {
        name: decode_name(&entry.name),
        partition_type: PartitionType::from(entry.partition_type),
        subtype: entry.subtype,
        offset: entry.offset(),
        size: entry.size(),
        flags: entry.flags(),
    }
}

/// Cuts the name at the first NUL and decodes it leniently.
fn decode_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// The end-marker record doubles as the MD5 record when bytes 2..16 are
/// `0xFF`. Its last 16 bytes are then the digest of the preceding records.
fn read_checksum(entry: &RawEntry) -> Option<[u8; CHECKSUM_LEN]> {
    let md5 = RawChecksumEntry::ref_from_bytes(entry.as_bytes()).ok()?;
    md5.fill.iter().all(|&b| b == 0xFF).then_some(md5.digest)
}
