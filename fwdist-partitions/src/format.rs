//! Output views of a [`PartitionTable`].
//!
//! All views are read-only projections. None of them validate.

use std::fmt::Write as _;

use crate::{
    analysis::analyze, error::RenderError, layout::SIZE_REST_OF_FLASH, table::PartitionTable,
};

const CSV_HEADER: [&str; 6] = ["Name", "Type", "SubType", "Offset", "Size", "Flags"];

/// Pretty printed JSON record list. `human_readable` adds hex strings,
/// rounded KB/MB sizes and the encryption flag to every record.
pub fn format_json(table: &PartitionTable, human_readable: bool) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(&table.view(human_readable))?)
}

/// Pretty printed analysis summary.
pub fn format_analysis(table: &PartitionTable) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(&analyze(table))?)
}

/// One row per record in the column order of the partition CSV files used to
/// generate these tables.
pub fn format_csv(table: &PartitionTable) -> Result<String, RenderError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for record in table {
        writer.write_record([
            record.name.clone(),
            record.type_name(),
            record.subtype_name(),
            record.offset_hex(),
            record.size_hex(),
            format!("0x{:x}", record.flags),
        ])?;
    }
    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Plain text report.
pub fn format_text(table: &PartitionTable, verbose: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Partition Table ({} entries)", table.len());
    out.push_str(&"=".repeat(80));

    for record in table {
        let _ = write!(
            out,
            "\n\nPartition: {}\n  Type:      {}\n  SubType:   {}\n  Offset:    0x{:x} ({:.2} KB)\n  Size:      0x{:x} ({})\n  Flags:     0x{:02x}",
            record.name,
            record.type_name(),
            record.subtype_name(),
            record.offset,
            record.offset_kb(),
            record.size,
            format_size(record.size),
            record.flags,
        );
        if verbose && record.is_encrypted() {
            out.push_str("\n  Encrypted: Yes");
        }
    }

    out
}

/// Short human readable size.
pub fn format_size(size: u32) -> String {
    if size == SIZE_REST_OF_FLASH {
        return "rest of flash".to_string();
    }

    let kb = f64::from(size) / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1.0 {
        format!("{:.2} MB", mb)
    } else if kb >= 1.0 {
        format!("{:.2} KB", kb)
    } else {
        format!("{} bytes", size)
    }
}
