// src/commands/catalog.rs
//! Provider catalog command

use anyhow::{Context, Result};
use cloudfit::report::text;
use cloudfit::{OutputFormat, ProviderCatalog};
use std::path::Path;

/// Validate a catalog and print it
pub fn cmd_catalog(path: Option<&Path>, output: OutputFormat) -> Result<()> {
    let catalog = match path {
        Some(path) => ProviderCatalog::load(path)
            .with_context(|| format!("Invalid provider catalog {}", path.display()))?,
        None => ProviderCatalog::builtin().context("Built-in provider catalog is invalid")?,
    };

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&catalog)?),
        OutputFormat::Text => print!("{}", text::render_catalog(&catalog)),
    }
    Ok(())
}
