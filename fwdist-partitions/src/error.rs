use crate::layout::{ALIGNMENT, ENTRY_SIZE, MAGIC};

pub type PartitionResult<T> = std::result::Result<T, PartitionError>;

#[derive(Debug, thiserror::Error)]
pub enum PartitionError {
    #[error("Partition table format error: {0}")]
    Format(#[from] FormatError),
    #[error("Partition table validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Failed to render partition table: {0}")]
    Render(#[from] RenderError),
}

/// The buffer is not a well formed partition table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("too small: {len} bytes, expected at least {} bytes", ENTRY_SIZE)]
    TooSmall { len: usize },
    #[error("bad magic 0x{magic:04x} at offset {offset}, expected 0x{:04x}", MAGIC)]
    BadMagic { magic: u16, offset: usize },
    #[error("truncated entry at offset {offset}: only {remaining} bytes remaining")]
    Truncated { offset: usize, remaining: usize },
}

/// The table decoded fine but breaks one of the layout rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("partition table is empty")]
    EmptyTable,
    #[error("entry {index}: empty partition name")]
    EmptyName { index: usize },
    #[error("entry {index} ({name}): name too long ({len} > 16)")]
    NameTooLong {
        index: usize,
        name: String,
        len: usize,
    },
    #[error(
        "entry {index} ({name}): offset {offset:#x} is not aligned to {} bytes",
        ALIGNMENT
    )]
    MisalignedOffset {
        index: usize,
        name: String,
        offset: u32,
    },
    #[error(
        "entry {index} ({name}): size {size:#x} is not aligned to {} bytes",
        ALIGNMENT
    )]
    MisalignedSize { index: usize, name: String, size: u32 },
    #[error(
        "partition overlap: '{name}' (offset={offset:#x}, size={size:#x}, end={end:#x}) overlaps with '{next_name}' (offset={next_offset:#x})"
    )]
    Overlap {
        name: String,
        offset: u32,
        size: u32,
        end: u64,
        next_name: String,
        next_offset: u32,
    },
}

impl ValidationError {
    /// Name of the record that broke the rule, if the rule is record scoped.
    pub fn record_name(&self) -> Option<&str> {
        match self {
            ValidationError::EmptyTable | ValidationError::EmptyName { .. } => None,
            ValidationError::NameTooLong { name, .. }
            | ValidationError::MisalignedOffset { name, .. }
            | ValidationError::MisalignedSize { name, .. }
            | ValidationError::Overlap { name, .. } => Some(name),
        }
    }
}

/// Rendering one of the output views failed.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
