//! Layout rules for a decoded table.
//!
//! Two phases run in order: every record on its own (name, alignment), then
//! the table as a whole (no overlaps). Each phase stops at its first
//! violation. Either phase can be switched off through
//! [`ValidationOptions`].

use crate::{
    error::ValidationError,
    layout::{ALIGNMENT, NAME_LEN},
    record::PartitionRecord,
    table::PartitionTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    pub check_records: bool,
    pub check_overlaps: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            check_records: true,
            check_overlaps: true,
        }
    }
}

/// Runs both validation phases.
pub fn validate(table: &PartitionTable) -> Result<(), ValidationError> {
    validate_with(table, ValidationOptions::default())
}

pub fn validate_with(
    table: &PartitionTable,
    options: ValidationOptions,
) -> Result<(), ValidationError> {
    if table.is_empty() {
        return Err(ValidationError::EmptyTable);
    }

    if options.check_records {
        for (index, record) in table.iter().enumerate() {
            check_record(index, record)?;
        }
    }

    if options.check_overlaps {
        check_overlaps(table)?;
    }

    Ok(())
}

fn check_record(index: usize, record: &PartitionRecord) -> Result<(), ValidationError> {
    if record.name.is_empty() {
        return Err(ValidationError::EmptyName { index });
    }

    let len = record.name.chars().count();
    if len > NAME_LEN {
        return Err(ValidationError::NameTooLong {
            index,
            name: record.name.clone(),
            len,
        });
    }

    if record.offset % ALIGNMENT != 0 {
        return Err(ValidationError::MisalignedOffset {
            index,
            name: record.name.clone(),
            offset: record.offset,
        });
    }

    if !record.extends_to_end() && record.size % ALIGNMENT != 0 {
        return Err(ValidationError::MisalignedSize {
            index,
            name: record.name.clone(),
            size: record.size,
        });
    }

    Ok(())
}

/// Records placed at offset 0 are left out of the overlap scan.
fn check_overlaps(table: &PartitionTable) -> Result<(), ValidationError> {
    let mut placed: Vec<&PartitionRecord> =
        table.iter().filter(|record| record.offset > 0).collect();
    placed.sort_by_key(|record| record.offset);

    for pair in placed.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        if current.extends_to_end() {
            continue;
        }
        if current.end() > u64::from(next.offset) {
            return Err(ValidationError::Overlap {
                name: current.name.clone(),
                offset: current.offset,
                size: current.size,
                end: current.end(),
                next_name: next.name.clone(),
                next_offset: next.offset,
            });
        }
    }

    Ok(())
}
