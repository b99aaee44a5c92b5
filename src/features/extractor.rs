// src/features/extractor.rs

//! Partition scanning and feature merging

use super::os::detect_os;
use super::probe::{
    dir_contains, path_exists, split_parent, ExtractionResult, ForensicsReader,
    PartitionDescriptor, PartitionFilesystem,
};
use super::{merge_partition_signals, FeatureSet, PartitionSignals};
use rayon::prelude::*;
use tracing::{debug, info};

/// Partitions of this many sectors or fewer cannot hold a useful filesystem
pub const DEFAULT_MIN_PARTITION_SECTORS: u64 = 2048;

/// Paths whose presence indicates cloud-init is installed, probed in order
pub const CLOUD_INIT_PATHS: &[&str] = &[
    "/etc/cloud",
    "/etc/cloud/cloud.cfg",
    "/usr/bin/cloud-init",
    "/usr/lib/cloud-init",
    "/lib/systemd/system/cloud-init.service",
];

/// Options controlling feature extraction
#[derive(Debug, Clone)]
pub struct ExtractorOptions {
    /// Partitions with `length_sectors <= min_partition_sectors` are skipped
    pub min_partition_sectors: u64,

    /// Scan partitions on the rayon thread pool
    pub parallel: bool,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            min_partition_sectors: DEFAULT_MIN_PARTITION_SECTORS,
            parallel: true,
        }
    }
}

impl ExtractorOptions {
    /// Scan one partition at a time, skipping OS probes once an OS is known
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}

/// Builds a [`FeatureSet`] from the partitions of one image
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    options: ExtractorOptions,
}

impl FeatureExtractor {
    pub fn new(options: ExtractorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    /// Scan every usable partition and merge the results
    ///
    /// Partitions that are too small, unallocated, or whose filesystem
    /// cannot be opened are skipped. Only a failure to enumerate the
    /// partition table is returned as an error.
    pub fn extract<R>(&self, reader: &R) -> ExtractionResult<FeatureSet>
    where
        R: ForensicsReader + ?Sized,
    {
        let partitions = reader.partitions()?;
        debug!("Image has {} partition entries", partitions.len());

        let features = if self.options.parallel {
            // Indexed collect keeps partition order regardless of finishing order
            let scanned: Vec<Option<PartitionSignals>> = partitions
                .par_iter()
                .map(|partition| self.scan_partition(reader, partition, true))
                .collect();

            scanned
                .iter()
                .flatten()
                .fold(FeatureSet::new(), |acc, signals| merge_partition_signals(&acc, signals))
        } else {
            partitions.iter().fold(FeatureSet::new(), |acc, partition| {
                match self.scan_partition(reader, partition, !acc.os_known()) {
                    Some(signals) => merge_partition_signals(&acc, &signals),
                    None => acc,
                }
            })
        };

        info!(
            "Extracted features: bios={} uefi={} cloud-init={} os={}",
            features.bios_boot_present,
            features.uefi_boot_present,
            features.cloud_init_present,
            features.detected_os
        );
        Ok(features)
    }

    /// Whether a partition is large enough and allocated
    pub fn is_scannable(&self, partition: &PartitionDescriptor) -> bool {
        partition.length_sectors > self.options.min_partition_sectors
            && !partition.is_unallocated()
    }

    /// Scan one partition; `None` when it was skipped or could not be opened
    pub fn scan_partition<R>(
        &self,
        reader: &R,
        partition: &PartitionDescriptor,
        probe_os: bool,
    ) -> Option<PartitionSignals>
    where
        R: ForensicsReader + ?Sized,
    {
        if !self.is_scannable(partition) {
            debug!(
                "Skipping partition '{}' ({} sectors)",
                partition.label, partition.length_sectors
            );
            return None;
        }

        debug!(
            "Checking partition '{}' at sector {}",
            partition.label, partition.start_sector
        );
        match reader.open_filesystem(partition) {
            Ok(fs) => Some(scan_filesystem(fs.as_ref(), probe_os)),
            Err(e) => {
                debug!("Skipping non-filesystem partition: {}", e);
                None
            }
        }
    }
}

/// Run every probe against an opened filesystem
pub fn scan_filesystem(fs: &dyn PartitionFilesystem, probe_os: bool) -> PartitionSignals {
    PartitionSignals {
        bios_boot: detect_bios_boot(fs),
        uefi_boot: detect_uefi_boot(fs),
        cloud_init_paths: detect_cloud_init(fs),
        detected_os: if probe_os { detect_os(fs) } else { None },
    }
}

fn detect_bios_boot(fs: &dyn PartitionFilesystem) -> bool {
    dir_contains(fs, "/", "boot")
        || dir_contains(fs, "/boot", "grub")
        || dir_contains(fs, "/boot", "grub2")
}

fn detect_uefi_boot(fs: &dyn PartitionFilesystem) -> bool {
    dir_contains(fs, "/", "EFI") || dir_contains(fs, "/efi", "BOOT")
}

fn detect_cloud_init(fs: &dyn PartitionFilesystem) -> Vec<String> {
    let mut found = Vec::new();
    for path in CLOUD_INIT_PATHS {
        let (parent, name) = split_parent(path);
        if path_exists(fs, path) || dir_contains(fs, parent, name) {
            debug!("Detected cloud-init path: {}", path);
            found.push(path.to_string());
        }
    }
    found
}
