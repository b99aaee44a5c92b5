// src/report/mod.rs

//! Compatibility report output
//!
//! The report is plain structured data for an external renderer. JSON is
//! the interchange format; [`text`] renders a terminal summary.

pub mod text;

use crate::error::Result;
use crate::scoring::{EvaluationContext, ProviderScore};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything produced for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    /// Image path as given
    pub image: String,
    #[serde(flatten)]
    pub context: EvaluationContext,
    /// Per-provider results in catalog order
    pub scores: Vec<ProviderScore>,
}

impl CompatibilityReport {
    pub fn new(image: &Path, context: EvaluationContext, scores: Vec<ProviderScore>) -> Self {
        Self {
            image: image.display().to_string(),
            context,
            scores,
        }
    }

    /// Best-scoring provider; ties go to the earlier catalog entry
    pub fn best_provider(&self) -> Option<&ProviderScore> {
        self.scores
            .iter()
            .filter(|s| s.passed_hard_requirements)
            .fold(None, |best: Option<&ProviderScore>, s| match best {
                Some(b) if b.normalized_score >= s.normalized_score => Some(b),
                _ => Some(s),
            })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(text::render(self)),
            OutputFormat::Json => self.to_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSet;
    use crate::format::ContainerSignals;

    fn score(provider: &str, passed: bool, normalized: f64) -> ProviderScore {
        ProviderScore {
            provider: provider.to_string(),
            passed_hard_requirements: passed,
            raw_score: 0,
            max_possible_score: 0,
            normalized_score: normalized,
            reasons: Vec::new(),
        }
    }

    fn report(scores: Vec<ProviderScore>) -> CompatibilityReport {
        CompatibilityReport::new(
            Path::new("/images/disk.qcow2"),
            EvaluationContext::new(FeatureSet::default(), ContainerSignals::default()),
            scores,
        )
    }

    #[test]
    fn test_best_provider_prefers_first_on_tie() {
        let r = report(vec![
            score("A", false, 0.0),
            score("B", true, 7.5),
            score("C", true, 7.5),
            score("D", true, 3.0),
        ]);
        assert_eq!(r.best_provider().unwrap().provider, "B");
    }

    #[test]
    fn test_best_provider_none_when_all_fail() {
        let r = report(vec![score("A", false, 0.0)]);
        assert!(r.best_provider().is_none());
    }

    #[test]
    fn test_json_shape() {
        let r = report(vec![score("AWS", true, 8.0)]);
        let value: serde_json::Value = serde_json::from_str(&r.to_json().unwrap()).unwrap();
        assert_eq!(value["image"], "/images/disk.qcow2");
        assert_eq!(value["features"]["detected_os"], "Unknown");
        assert!(value["container"]["corrupt"].is_null());
        assert_eq!(value["scores"][0]["provider"], "AWS");
    }
}
