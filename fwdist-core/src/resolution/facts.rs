use fwdist_partitions::{analyze, FlashSize, PartitionResult, PartitionTable, Role};

/// What the partition table of a build says about each resolved field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionFacts {
    pub flash_size: Option<FlashSize>,
    pub fw_offset: Option<u32>,
    pub secondary_offset: Option<u32>,
    pub fs_offset: Option<u32>,
}

impl PartitionFacts {
    /// Facts from an already validated table.
    ///
    /// A table with a rest-of-flash record says nothing about the flash size;
    /// that field is left to the next tier.
    pub fn from_table(table: &PartitionTable) -> Self {
        let sized = !table.iter().any(|record| record.extends_to_end());
        let facts = Self {
            flash_size: sized.then(|| analyze(table).flash_size_mb),
            fw_offset: Role::FIRMWARE.find_in(table),
            secondary_offset: Role::SECONDARY.find_in(table),
            fs_offset: Role::FILESYSTEM.find_in(table),
        };

        if facts.offsets_found() < 3 {
            tracing::debug!(
                "Partition table partially resolved: {}/3 offsets found",
                facts.offsets_found()
            );
        }

        facts
    }

    /// Decodes, validates and summarises a partition image.
    pub fn from_bytes(bytes: &[u8]) -> PartitionResult<Self> {
        let table = fwdist_partitions::parse_validated(bytes)?;
        Ok(Self::from_table(&table))
    }

    pub fn offsets_found(&self) -> usize {
        [self.fw_offset, self.secondary_offset, self.fs_offset]
            .iter()
            .filter(|offset| offset.is_some())
            .count()
    }
}
