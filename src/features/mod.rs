// src/features/mod.rs

//! Feature signal extraction
//!
//! Turns partition-level filesystem probes into a normalized [`FeatureSet`]:
//! which boot methods the image carries, whether cloud-init is installed,
//! and a best-effort OS identity.
//!
//! Each partition is scanned independently into a [`PartitionSignals`]
//! value. Partition results are then folded in partition order with
//! [`merge_partition_signals`]:
//!
//! - boolean signals are OR-combined and never reset once true
//! - cloud-init paths are appended in discovery order without duplicates
//! - the first partition that yields an OS name wins

mod extractor;
pub mod hostdir;
pub mod memory;
mod os;
pub mod probe;

pub use extractor::{
    scan_filesystem, ExtractorOptions, FeatureExtractor, CLOUD_INIT_PATHS,
    DEFAULT_MIN_PARTITION_SECTORS,
};
pub use hostdir::HostDirReader;
pub use memory::{MemoryFilesystem, MemoryReader};
pub use os::{parse_issue, parse_os_release};
pub use probe::{
    EntryKind, ExtractionError, ExtractionResult, ForensicsReader, PartitionDescriptor,
    PartitionError, PartitionFilesystem, Probe, ProbeError,
};

use serde::{Deserialize, Serialize};

/// Value of `detected_os` when no partition identified the OS
pub const UNKNOWN_OS: &str = "Unknown";

/// Per-image forensic facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// A BIOS/legacy bootloader marker was found
    pub bios_boot_present: bool,
    /// An EFI system partition or EFI boot directory was found
    pub uefi_boot_present: bool,
    /// At least one cloud-init marker path exists
    pub cloud_init_present: bool,
    /// Marker paths that matched, in discovery order
    pub cloud_init_paths: Vec<String>,
    /// OS identity string, or [`UNKNOWN_OS`]
    pub detected_os: String,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            bios_boot_present: false,
            uefi_boot_present: false,
            cloud_init_present: false,
            cloud_init_paths: Vec::new(),
            detected_os: UNKNOWN_OS.to_string(),
        }
    }
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an OS identity has been established
    pub fn os_known(&self) -> bool {
        self.detected_os != UNKNOWN_OS
    }
}

/// Signals found on a single partition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionSignals {
    pub bios_boot: bool,
    pub uefi_boot: bool,
    /// Matched cloud-init marker paths, in probe order
    pub cloud_init_paths: Vec<String>,
    /// OS name found on this partition, if it was probed and matched
    pub detected_os: Option<String>,
}

/// Fold one partition's signals into an accumulated feature set
///
/// Pure: the input feature set is left untouched. Merging the same
/// partition twice gives the same result as merging it once.
pub fn merge_partition_signals(old: &FeatureSet, new: &PartitionSignals) -> FeatureSet {
    let mut merged = old.clone();

    merged.bios_boot_present |= new.bios_boot;
    merged.uefi_boot_present |= new.uefi_boot;

    for path in &new.cloud_init_paths {
        if !merged.cloud_init_paths.contains(path) {
            merged.cloud_init_paths.push(path.clone());
        }
    }
    merged.cloud_init_present |= !new.cloud_init_paths.is_empty();

    if !merged.os_known()
        && let Some(ref os) = new.detected_os
    {
        merged.detected_os = os.clone();
    }

    merged
}
