// src/commands/check.rs
//! Image evaluation commands

use super::{format_inspector, partition_source};
use crate::cli::{InspectorArgs, PartitionArgs};
use anyhow::Result;
use cloudfit::report::text;
use cloudfit::{inspect_image, OutputFormat, Pipeline};
use std::path::Path;
use tracing::info;

/// Inspect, extract and score one image
pub fn cmd_check(
    image: &Path,
    partitions: &PartitionArgs,
    inspector: &InspectorArgs,
    catalog: Option<&Path>,
    output: OutputFormat,
) -> Result<()> {
    let (reader, extractor) = partition_source(partitions);
    let pipeline = Pipeline::with_catalog_file(extractor, catalog)?;
    let inspector = format_inspector(inspector);

    let report = pipeline.evaluate(image, &reader, inspector.as_ref())?;
    if let Some(best) = report.best_provider() {
        info!("Best match: {} ({:.2})", best.provider, best.normalized_score);
    }

    print!("{}", report.render(output)?);
    if output == OutputFormat::Json {
        println!();
    }
    Ok(())
}

/// Show container signals only
pub fn cmd_inspect(image: &Path, inspector: &InspectorArgs, output: OutputFormat) -> Result<()> {
    let inspector = format_inspector(inspector);
    let signals = inspect_image(inspector.as_ref(), image)?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&signals)?),
        OutputFormat::Text => {
            println!("Container signals for {}:", image.display());
            print!("{}", text::render_rows(&text::container_rows(&signals)));
            if let Some(ref kind) = signals.format_specific_type {
                println!("  Format-specific type: {}", kind);
                for (key, value) in &signals.format_specific {
                    println!("    {} = {}", key, value);
                }
            }
        }
    }
    Ok(())
}

/// Show the feature set only
pub fn cmd_features(partitions: &PartitionArgs, output: OutputFormat) -> Result<()> {
    let (reader, extractor) = partition_source(partitions);
    let features = extractor.extract(&reader)?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&features)?),
        OutputFormat::Text => {
            println!("Boot Partition Present: {}", features.bios_boot_present);
            println!("EFI Partition Present:  {}", features.uefi_boot_present);
            println!("Cloud-Init Detected:    {}", features.cloud_init_present);
            for path in &features.cloud_init_paths {
                println!("  {}", path);
            }
            println!("Detected OS:            {}", features.detected_os);
        }
    }
    Ok(())
}
