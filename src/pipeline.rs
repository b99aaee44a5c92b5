// src/pipeline.rs

//! End-to-end evaluation of one image
//!
//! Container metadata is gathered first: without it no score can be
//! computed, so an inspection failure aborts the evaluation. Feature
//! extraction then scans the partitions, absorbing per-partition failures.

use crate::catalog::ProviderCatalog;
use crate::error::Result;
use crate::features::{FeatureExtractor, ForensicsReader};
use crate::format::{inspect_image, FormatInspector};
use crate::report::CompatibilityReport;
use crate::scoring::{EvaluationContext, ScoringEngine};
use std::path::Path;
use tracing::info;

/// Feature extraction and scoring for a validated catalog
#[derive(Debug, Clone)]
pub struct Pipeline {
    extractor: FeatureExtractor,
    engine: ScoringEngine,
}

impl Pipeline {
    pub fn new(extractor: FeatureExtractor, catalog: ProviderCatalog) -> Self {
        Self {
            extractor,
            engine: ScoringEngine::new(catalog),
        }
    }

    /// Pipeline over the catalog at `path`, or the built-in catalog
    pub fn with_catalog_file(extractor: FeatureExtractor, path: Option<&Path>) -> Result<Self> {
        let catalog = match path {
            Some(path) => ProviderCatalog::load(path)?,
            None => ProviderCatalog::builtin()?,
        };
        Ok(Self::new(extractor, catalog))
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Inspect, extract and score one image
    pub fn evaluate<R, I>(&self, image: &Path, reader: &R, inspector: &I) -> Result<CompatibilityReport>
    where
        R: ForensicsReader + ?Sized,
        I: FormatInspector + ?Sized,
    {
        info!("Evaluating image {}", image.display());

        let container = inspect_image(inspector, image)?;
        let features = self.extractor.extract(reader)?;
        let context = EvaluationContext::new(features, container);
        let scores = self.engine.evaluate(&context);

        Ok(CompatibilityReport::new(image, context, scores))
    }
}
