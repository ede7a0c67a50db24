//! Picks one partition for a role.

use crate::{
    layout::{app, data},
    record::PartitionType,
    table::PartitionTable,
};

/// A partition type plus acceptable subtypes, most preferred first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Role<'a> {
    pub partition_type: PartitionType,
    pub subtypes: &'a [u8],
}

impl Role<'static> {
    /// Main firmware image: ota_0, else factory.
    pub const FIRMWARE: Role<'static> = Role {
        partition_type: PartitionType::App,
        subtypes: &[app::OTA_0, app::FACTORY],
    };

    /// Updater image: ota_1, else ota_0, else factory.
    pub const SECONDARY: Role<'static> = Role {
        partition_type: PartitionType::App,
        subtypes: &[app::OTA_1, app::OTA_0, app::FACTORY],
    };

    /// Filesystem image: littlefs, else spiffs, else the legacy spiffs value.
    pub const FILESYSTEM: Role<'static> = Role {
        partition_type: PartitionType::Data,
        subtypes: &[data::LITTLEFS, data::SPIFFS, data::SPIFFS_LEGACY],
    };
}

impl<'a> Role<'a> {
    pub fn find_in(&self, table: &PartitionTable) -> Option<u32> {
        find_best_offset(table, self.partition_type, self.subtypes)
    }
}

/// Offset of the best record of `partition_type` whose subtype is listed in
/// `subtypes`.
///
/// Ranking is by position of the subtype in `subtypes`, then by lowest
/// offset. `None` when nothing matches.
pub fn find_best_offset(
    table: &PartitionTable,
    partition_type: PartitionType,
    subtypes: &[u8],
) -> Option<u32> {
    table
        .iter()
        .filter(|record| record.partition_type == partition_type)
        .filter_map(|record| {
            subtypes
                .iter()
                .position(|&subtype| subtype == record.subtype)
                .map(|rank| (rank, record.offset))
        })
        .min()
        .map(|(_, offset)| offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PartitionRecord;

    fn table(records: Vec<PartitionRecord>) -> PartitionTable {
        PartitionTable::new(records, None)
    }

    fn app_record(name: &str, subtype: u8, offset: u32) -> PartitionRecord {
        PartitionRecord::new(name, PartitionType::App, subtype, offset, 0x10000, 0)
    }

    #[test]
    fn falls_back_to_factory_without_ota_slot() {
        let table = table(vec![
            PartitionRecord::new("nvs", PartitionType::Data, 0x02, 0x9000, 0x5000, 0),
            app_record("factory", app::FACTORY, 0xe000),
        ]);
        assert_eq!(
            find_best_offset(&table, PartitionType::App, &[0x10, 0x00]),
            Some(0xe000)
        );
    }

    #[test]
    fn priority_beats_lower_offset() {
        let table = table(vec![
            app_record("app0", app::OTA_0, 0x20000),
            app_record("factory", app::FACTORY, 0x10000),
        ]);
        assert_eq!(Role::FIRMWARE.find_in(&table), Some(0x20000));
    }

    #[test]
    fn lower_offset_breaks_ties_within_subtype() {
        let table = table(vec![
            app_record("b", app::OTA_0, 0x50000),
            app_record("a", app::OTA_0, 0x30000),
        ]);
        assert_eq!(Role::FIRMWARE.find_in(&table), Some(0x30000));
    }

    #[test]
    fn type_must_match_exactly() {
        let table = table(vec![PartitionRecord::new(
            "ota",
            PartitionType::Data,
            0x10,
            0x20000,
            0x1000,
            0,
        )]);
        assert_eq!(Role::FIRMWARE.find_in(&table), None);
    }

    #[test]
    fn secondary_prefers_second_slot() {
        let table = table(vec![
            app_record("app0", app::OTA_0, 0x10000),
            app_record("app1", app::OTA_1, 0x260000),
        ]);
        assert_eq!(Role::SECONDARY.find_in(&table), Some(0x260000));
        assert_eq!(Role::FIRMWARE.find_in(&table), Some(0x10000));
    }

    #[test]
    fn filesystem_accepts_legacy_spiffs() {
        let table = table(vec![PartitionRecord::new(
            "spiffs",
            PartitionType::Data,
            data::SPIFFS_LEGACY,
            0x300000,
            0x100000,
            0,
        )]);
        assert_eq!(Role::FILESYSTEM.find_in(&table), Some(0x300000));
    }

    #[test]
    fn empty_inputs_find_nothing() {
        assert_eq!(Role::FILESYSTEM.find_in(&PartitionTable::default()), None);
        let table = table(vec![app_record("app0", app::OTA_0, 0x10000)]);
        assert_eq!(find_best_offset(&table, PartitionType::App, &[]), None);
    }
}
