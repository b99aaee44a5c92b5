// src/commands/mod.rs
//! Command implementations for the cloudfit CLI

mod catalog;
mod check;

pub use catalog::cmd_catalog;
pub use check::{cmd_check, cmd_features, cmd_inspect};

use crate::cli::{InspectorArgs, PartitionArgs};
use cloudfit::features::{ExtractorOptions, FeatureExtractor, HostDirReader};
use cloudfit::format::{CapturedInspector, FormatInspector, QemuImgInspector};
use std::time::Duration;
use tracing::warn;

/// Build the forensics reader and extractor from CLI arguments
fn partition_source(args: &PartitionArgs) -> (HostDirReader, FeatureExtractor) {
    let reader = HostDirReader::new(args.rootfs.iter().cloned());
    if reader.is_empty() {
        warn!("No --rootfs given; filesystem features will be reported as not found");
    }

    let options = if args.sequential {
        ExtractorOptions::sequential()
    } else {
        ExtractorOptions::default()
    };
    (reader, FeatureExtractor::new(options))
}

/// Build the format inspector from CLI arguments
fn format_inspector(args: &InspectorArgs) -> Box<dyn FormatInspector> {
    match args.format_info {
        Some(ref path) => Box::new(CapturedInspector::new(path)),
        None => Box::new(QemuImgInspector::new(
            &args.qemu_img,
            Duration::from_secs(args.timeout),
        )),
    }
}
