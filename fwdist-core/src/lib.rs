pub mod chip;
pub mod device;
pub mod install;
pub mod manifest;
pub mod resolution;
pub mod runtime;
pub mod tables;

pub use fwdist_config::{FirmwareKind, FirmwareSource};
