use serde::Serialize;

use crate::record::{PartitionRecord, RecordView};

/// Records in on-flash order plus the optional digest from the end marker.
///
/// Owned outright by whoever parsed it. Nothing in the crate mutates a table
/// after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionTable {
    records: Vec<PartitionRecord>,
    checksum: Option<[u8; 16]>,
}

impl PartitionTable {
    pub fn new(records: Vec<PartitionRecord>, checksum: Option<[u8; 16]>) -> Self {
        Self { records, checksum }
    }

    pub fn records(&self) -> &[PartitionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn checksum(&self) -> Option<&[u8; 16]> {
        self.checksum.as_ref()
    }

    pub fn checksum_hex(&self) -> Option<String> {
        self.checksum
            .map(|digest| digest.iter().map(|byte| format!("{:02x}", byte)).collect())
    }

    /// First record with the given name.
    pub fn get_by_name(&self, name: &str) -> Option<&PartitionRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PartitionRecord> {
        self.records.iter()
    }

    pub fn view(&self, human_readable: bool) -> TableView {
        TableView {
            partitions: self
                .records
                .iter()
                .map(|record| record.view(human_readable))
                .collect(),
            md5: self.checksum_hex(),
        }
    }
}

impl<'a> IntoIterator for &'a PartitionTable {
    type Item = &'a PartitionRecord;
    type IntoIter = std::slice::Iter<'a, PartitionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Structured record list as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub partitions: Vec<RecordView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::PartitionType;

    fn table() -> PartitionTable {
        PartitionTable::new(
            vec![
                PartitionRecord::new("nvs", PartitionType::Data, 0x02, 0x9000, 0x5000, 0),
                PartitionRecord::new("app0", PartitionType::App, 0x10, 0x10000, 0x140000, 0),
                PartitionRecord::new("nvs", PartitionType::Data, 0x02, 0x300000, 0x1000, 0),
            ],
            Some([0xAB; 16]),
        )
    }

    #[test]
    fn get_by_name_returns_first_match() {
        let table = table();
        assert_eq!(table.get_by_name("nvs").map(|r| r.offset), Some(0x9000));
        assert!(table.get_by_name("missing").is_none());
    }

    #[test]
    fn view_includes_checksum_when_present() {
        let json = serde_json::to_value(table().view(false)).unwrap();
        assert_eq!(json["partitions"].as_array().unwrap().len(), 3);
        assert_eq!(json["md5"], "ab".repeat(16));

        let without = PartitionTable::new(vec![], None);
        let json = serde_json::to_value(without.view(false)).unwrap();
        assert!(json.get("md5").is_none());
    }
}
