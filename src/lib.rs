// src/lib.rs

//! Cloudfit
//!
//! Inspects virtual machine disk images and scores how well each image
//! fits the import requirements of the major cloud providers.
//!
//! # Architecture
//!
//! - Feature extraction: partition filesystems are probed for boot
//!   loaders, cloud-init and OS identity, then merged into a `FeatureSet`
//! - Format normalization: image container metadata (`qemu-img info`)
//!   is flattened into `ContainerSignals`
//! - Provider catalog: validated TOML table of formats, hard requirements
//!   and weights per provider
//! - Scoring: every provider is evaluated against the combined context,
//!   with a reason recorded for each requirement and weight

pub mod catalog;
mod error;
pub mod features;
pub mod format;
pub mod pipeline;
pub mod report;
pub mod scoring;

pub use catalog::{CatalogError, FeatureKey, ProviderCatalog, ProviderProfile};
pub use error::{Error, Result, Stage};
pub use features::{
    merge_partition_signals, ExtractorOptions, FeatureExtractor, FeatureSet, ForensicsReader,
    HostDirReader, PartitionDescriptor, PartitionFilesystem, PartitionSignals, UNKNOWN_OS,
};
pub use format::{inspect_image, ContainerSignals, FormatInspector, InspectionError};
pub use pipeline::Pipeline;
pub use report::{CompatibilityReport, OutputFormat};
pub use scoring::{
    evaluate_provider, EvaluationContext, FeatureValues, ProviderScore, Reason, ReasonKind,
    ScoringEngine,
};
