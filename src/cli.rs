// src/cli.rs
//! CLI definitions for cloudfit
//!
//! Command implementations live in the `commands` module.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use cloudfit::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cloudfit")]
#[command(author, version)]
#[command(about = "Score virtual machine images for cloud provider compatibility", long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where image partitions are read from
#[derive(Args, Debug, Clone)]
pub struct PartitionArgs {
    /// Directory holding an extracted or mounted partition (repeatable, scanned in order)
    #[arg(long = "rootfs", value_name = "DIR")]
    pub rootfs: Vec<PathBuf>,

    /// Scan partitions one at a time instead of in parallel
    #[arg(long)]
    pub sequential: bool,
}

/// How container metadata is obtained
#[derive(Args, Debug, Clone)]
pub struct InspectorArgs {
    /// Read captured `qemu-img info --output json` output instead of running qemu-img
    #[arg(long, value_name = "FILE")]
    pub format_info: Option<PathBuf>,

    /// qemu-img binary
    #[arg(long, default_value = cloudfit::format::DEFAULT_QEMU_IMG)]
    pub qemu_img: PathBuf,

    /// Seconds to wait for qemu-img
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect an image and score it against every provider
    Check {
        /// Path to the disk image
        image: PathBuf,

        #[command(flatten)]
        partitions: PartitionArgs,

        #[command(flatten)]
        inspector: InspectorArgs,

        /// Provider catalog (TOML); defaults to the built-in catalog
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Show normalized container format signals for an image
    Inspect {
        /// Path to the disk image
        image: PathBuf,

        #[command(flatten)]
        inspector: InspectorArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Show the feature set detected on partition filesystems
    Features {
        #[command(flatten)]
        partitions: PartitionArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Validate and print the provider catalog
    Catalog {
        /// Provider catalog (TOML); defaults to the built-in catalog
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
