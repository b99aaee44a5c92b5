// src/scoring/mod.rs

//! Compatibility scoring engine
//!
//! Evaluates one image against every provider in the catalog:
//!
//! 1. Derive a boolean for each [`FeatureKey`] from the image's features
//!    and container signals.
//! 2. Check the provider's hard requirements. Any mismatch fails the
//!    provider with a score of 0; every mismatching key is reported.
//! 3. Otherwise sum the weights of the satisfied keys and normalize the
//!    total to a 0–10 scale against that provider's own maximum.
//!
//! Evaluation is a pure function of its inputs.

use crate::catalog::{FeatureKey, ProviderCatalog, ProviderProfile};
use crate::features::FeatureSet;
use crate::format::ContainerSignals;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Largest refcount width (in bits) that counts as compatible
pub const MAX_REFCOUNT_BITS: u64 = 16;

/// Upper bound of the normalized score
pub const SCORE_SCALE: f64 = 10.0;

/// Everything known about one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub features: FeatureSet,
    pub container: ContainerSignals,
}

impl EvaluationContext {
    pub fn new(features: FeatureSet, container: ContainerSignals) -> Self {
        Self {
            features,
            container,
        }
    }
}

/// Derived value of every recognized key for one provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureValues {
    pub bios_boot: bool,
    pub uefi_boot: bool,
    pub cloud_init: bool,
    pub format: bool,
    pub no_backing_file: bool,
    pub not_corrupt: bool,
    pub refcount_bits: bool,
    pub lazy_refcounts: bool,
}

impl FeatureValues {
    /// Derive key values; only `format` depends on the provider
    pub fn derive(context: &EvaluationContext, profile: &ProviderProfile) -> Self {
        let features = &context.features;
        let container = &context.container;

        Self {
            bios_boot: features.bios_boot_present,
            uefi_boot: features.uefi_boot_present,
            cloud_init: features.cloud_init_present,
            format: container
                .format
                .as_deref()
                .is_some_and(|format| profile.accepts(format)),
            no_backing_file: !container.has_backing_file(),
            not_corrupt: container.corrupt != Some(true),
            // Unknown refcount width or lazy-refcount state counts as unsatisfied
            refcount_bits: container
                .refcount_bits
                .is_some_and(|bits| bits <= MAX_REFCOUNT_BITS),
            lazy_refcounts: container.lazy_refcounts == Some(true),
        }
    }

    pub fn get(&self, key: FeatureKey) -> bool {
        match key {
            FeatureKey::BiosBoot => self.bios_boot,
            FeatureKey::UefiBoot => self.uefi_boot,
            FeatureKey::CloudInit => self.cloud_init,
            FeatureKey::Format => self.format,
            FeatureKey::NoBackingFile => self.no_backing_file,
            FeatureKey::NotCorrupt => self.not_corrupt,
            FeatureKey::RefcountBits => self.refcount_bits,
            FeatureKey::LazyRefcounts => self.lazy_refcounts,
        }
    }
}

/// Which evaluation pass produced a reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    /// A hard requirement that was not met
    Requirement,
    /// A weighted scoring key
    Weighted,
}

/// One line of evidence behind a provider score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub key: FeatureKey,
    pub satisfied: bool,
    /// Weight earned (0 when unsatisfied)
    pub weight: u32,
    pub kind: ReasonKind,
}

impl Reason {
    fn missing_requirement(key: FeatureKey) -> Self {
        Self {
            key,
            satisfied: false,
            weight: 0,
            kind: ReasonKind::Requirement,
        }
    }

    fn weighted(key: FeatureKey, satisfied: bool, weight: u32) -> Self {
        Self {
            key,
            satisfied,
            weight: if satisfied { weight } else { 0 },
            kind: ReasonKind::Weighted,
        }
    }
}

/// Compatibility result for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderScore {
    pub provider: String,
    pub passed_hard_requirements: bool,
    pub raw_score: u32,
    pub max_possible_score: u32,
    /// Score on a 0–10 scale, rounded to two decimals
    pub normalized_score: f64,
    pub reasons: Vec<Reason>,
}

impl ProviderScore {
    /// Keys of the hard requirements that were not met
    pub fn failed_requirements(&self) -> Vec<FeatureKey> {
        self.reasons
            .iter()
            .filter(|r| r.kind == ReasonKind::Requirement)
            .map(|r| r.key)
            .collect()
    }
}

/// Scale `raw / max` to 0–10 and round to two decimals; 0 when `max` is 0
pub fn normalize_score(raw: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    let scaled = f64::from(raw) / f64::from(max) * SCORE_SCALE;
    (scaled * 100.0).round() / 100.0
}

/// Evaluate one provider
pub fn evaluate_provider(context: &EvaluationContext, profile: &ProviderProfile) -> ProviderScore {
    let values = FeatureValues::derive(context, profile);

    let failed: Vec<Reason> = profile
        .hard_requirements
        .iter()
        .filter(|(key, required)| values.get(*key) != *required)
        .map(|(key, _)| Reason::missing_requirement(*key))
        .collect();

    if !failed.is_empty() {
        debug!(
            "{}: {} hard requirement(s) not met",
            profile.name,
            failed.len()
        );
        return ProviderScore {
            provider: profile.name.clone(),
            passed_hard_requirements: false,
            raw_score: 0,
            max_possible_score: 0,
            normalized_score: 0.0,
            reasons: failed,
        };
    }

    let mut raw_score = 0;
    let mut max_possible_score = 0;
    let mut reasons = Vec::with_capacity(profile.score_weights.len());
    for &(key, weight) in &profile.score_weights {
        max_possible_score += weight;
        let satisfied = values.get(key);
        if satisfied {
            raw_score += weight;
        }
        reasons.push(Reason::weighted(key, satisfied, weight));
    }

    let normalized_score = normalize_score(raw_score, max_possible_score);
    debug!(
        "{}: {}/{} -> {:.2}",
        profile.name, raw_score, max_possible_score, normalized_score
    );

    ProviderScore {
        provider: profile.name.clone(),
        passed_hard_requirements: true,
        raw_score,
        max_possible_score,
        normalized_score,
        reasons,
    }
}

/// Scores every provider of a catalog
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: ProviderCatalog,
}

impl ScoringEngine {
    pub fn new(catalog: ProviderCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ProviderCatalog {
        &self.catalog
    }

    /// One score per provider, in catalog order
    pub fn evaluate(&self, context: &EvaluationContext) -> Vec<ProviderScore> {
        self.catalog
            .providers()
            .iter()
            .map(|profile| evaluate_provider(context, profile))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(formats: &[&str], requires: &[(FeatureKey, bool)], weights: &[(FeatureKey, u32)]) -> ProviderProfile {
        ProviderProfile {
            name: "Test".to_string(),
            accepted_formats: formats.iter().map(|f| f.to_string()).collect(),
            hard_requirements: requires.to_vec(),
            score_weights: weights.to_vec(),
        }
    }

    fn context(format: Option<&str>) -> EvaluationContext {
        EvaluationContext::new(
            FeatureSet::default(),
            ContainerSignals {
                format: format.map(String::from),
                ..ContainerSignals::default()
            },
        )
    }

    #[test]
    fn test_normalize_score() {
        assert_eq!(normalize_score(0, 0), 0.0);
        assert_eq!(normalize_score(10, 10), 10.0);
        assert_eq!(normalize_score(2, 3), 6.67);
        assert_eq!(normalize_score(5, 9), 5.56);
    }

    #[test]
    fn test_derive_unknowns() {
        let values = FeatureValues::derive(&context(None), &profile(&["raw"], &[], &[]));
        assert!(!values.format, "unknown format is never accepted");
        assert!(values.no_backing_file);
        assert!(values.not_corrupt, "unknown corruption state is not corrupt");
        assert!(!values.refcount_bits);
        assert!(!values.lazy_refcounts);
    }

    #[test]
    fn test_derive_container_flags() {
        let mut ctx = context(Some("qcow2"));
        ctx.container.corrupt = Some(true);
        ctx.container.backing_file = Some("base.qcow2".to_string());
        ctx.container.refcount_bits = Some(16);
        ctx.container.lazy_refcounts = Some(true);

        let values = FeatureValues::derive(&ctx, &profile(&["qcow2"], &[], &[]));
        assert!(values.format);
        assert!(!values.not_corrupt);
        assert!(!values.no_backing_file);
        assert!(values.refcount_bits);
        assert!(values.lazy_refcounts);
    }

    #[test]
    fn test_empty_backing_file_counts_as_none() {
        let mut ctx = context(Some("qcow2"));
        ctx.container.backing_file = Some(String::new());
        let values = FeatureValues::derive(&ctx, &profile(&[], &[], &[]));
        assert!(values.no_backing_file);
    }

    #[test]
    fn test_zero_weights_score_zero() {
        let score = evaluate_provider(&context(Some("raw")), &profile(&["raw"], &[], &[]));
        assert!(score.passed_hard_requirements);
        assert_eq!(score.max_possible_score, 0);
        assert_eq!(score.normalized_score, 0.0);
        assert!(score.reasons.is_empty());
    }

    #[test]
    fn test_requirement_failures_accumulate() {
        let p = profile(
            &["raw"],
            &[(FeatureKey::CloudInit, true), (FeatureKey::Format, true), (FeatureKey::BiosBoot, true)],
            &[(FeatureKey::Format, 5)],
        );
        let score = evaluate_provider(&context(Some("vmdk")), &p);
        assert!(!score.passed_hard_requirements);
        assert_eq!(score.raw_score, 0);
        assert_eq!(score.normalized_score, 0.0);
        assert_eq!(
            score.failed_requirements(),
            vec![FeatureKey::CloudInit, FeatureKey::Format, FeatureKey::BiosBoot]
        );
        assert!(score.reasons.iter().all(|r| !r.satisfied && r.weight == 0));
    }

    #[test]
    fn test_requirement_may_demand_false() {
        let p = profile(&[], &[(FeatureKey::BiosBoot, false)], &[(FeatureKey::NotCorrupt, 1)]);
        let score = evaluate_provider(&context(None), &p);
        assert!(score.passed_hard_requirements);
        assert_eq!(score.normalized_score, 10.0);
    }

    #[test]
    fn test_weighted_reasons_in_catalog_order() {
        let p = profile(
            &["raw"],
            &[],
            &[(FeatureKey::UefiBoot, 2), (FeatureKey::Format, 3), (FeatureKey::NotCorrupt, 1)],
        );
        let score = evaluate_provider(&context(Some("raw")), &p);
        assert_eq!(score.raw_score, 4);
        assert_eq!(score.max_possible_score, 6);
        assert_eq!(score.normalized_score, 6.67);

        let keys: Vec<_> = score.reasons.iter().map(|r| (r.key, r.satisfied, r.weight)).collect();
        assert_eq!(
            keys,
            vec![
                (FeatureKey::UefiBoot, false, 0),
                (FeatureKey::Format, true, 3),
                (FeatureKey::NotCorrupt, true, 1),
            ]
        );
    }

    #[test]
    fn test_engine_evaluates_in_catalog_order() {
        let engine = ScoringEngine::new(ProviderCatalog::builtin().unwrap());
        let scores = engine.evaluate(&context(Some("raw")));
        let names: Vec<&str> = scores.iter().map(|s| s.provider.as_str()).collect();
        assert_eq!(
            names,
            vec!["AWS", "Azure", "GCP", "Oracle Cloud", "Open Source (KVM, Proxmox, etc.)"]
        );
    }
}
