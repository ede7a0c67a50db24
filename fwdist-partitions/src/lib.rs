//! Reader for the flash partition table embedded in firmware builds.
//!
//! The table is a flat run of 32 byte little-endian records terminated by an
//! end marker. This crate turns such a buffer into a [`PartitionTable`] and
//! answers the questions the manifest builder asks of it. Each module covers
//! one step of that pipeline:
//!
//! - `decoder` reads records out of a byte buffer,
//! - `validator` checks per-record and cross-record invariants,
//! - `analysis` derives the flash-size class and the name to offset map,
//! - `selector` picks the best partition for a role (firmware, updater,
//!   filesystem),
//! - `format` renders the JSON, CSV, text and analysis views.
//!
//! Everything here is pure and synchronous. Fetching the bytes is left to the
//! caller.
//!
//! Record layout
//!
//! ```text
//! 0      2     3        4        8      12            28      32
//! +------+-----+--------+--------+------+-------------+-------+
//! | magic| type| subtype| offset | size | name (16)   | flags |
//! +------+-----+--------+--------+------+-------------+-------+
//! ```

pub mod analysis;
pub mod decoder;
pub mod error;
pub mod format;
pub mod layout;
pub mod record;
pub mod selector;
pub mod table;
pub mod validator;

pub use analysis::{analyze, Analysis, FlashSize};
pub use decoder::parse;
pub use error::{FormatError, PartitionError, PartitionResult, RenderError, ValidationError};
pub use record::{PartitionRecord, PartitionType};
pub use selector::{find_best_offset, Role};
pub use table::PartitionTable;
pub use validator::{validate, validate_with, ValidationOptions};

/// Parses and validates a partition image in one go.
///
/// Both validation phases run. Use [`parse`] and [`validate_with`] directly to
/// skip one of them.
pub fn parse_validated(bytes: &[u8]) -> PartitionResult<PartitionTable> {
    let table = parse(bytes)?;
    validate(&table)?;
    Ok(table)
}
