// src/report/text.rs

//! Plain-text report rendering

use super::CompatibilityReport;
use crate::catalog::ProviderCatalog;
use crate::format::ContainerSignals;
use crate::scoring::{ProviderScore, ReasonKind};
use std::fmt::Write;

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "Unknown".to_string(), |v| v.to_string())
}

/// Feature and container summary rows
pub fn summary_rows(report: &CompatibilityReport) -> Vec<(&'static str, String)> {
    let features = &report.context.features;
    let container = &report.context.container;

    let mut rows = vec![
        ("Boot Partition Present", features.bios_boot_present.to_string()),
        ("EFI Partition Present", features.uefi_boot_present.to_string()),
        ("Cloud-Init Detected", features.cloud_init_present.to_string()),
        ("Detected OS", features.detected_os.clone()),
    ];
    rows.extend(container_rows(container));
    rows
}

/// Container signal rows
pub fn container_rows(container: &ContainerSignals) -> Vec<(&'static str, String)> {
    vec![
        ("Image Format", opt(container.format.as_deref())),
        ("Virtual Size", container.virtual_size_human()),
        ("Actual Size", container.actual_size_human()),
        ("Cluster Size", opt(container.cluster_size)),
        (
            "Backing File",
            match container.backing_file.as_deref() {
                Some(file) if !file.is_empty() => file.to_string(),
                _ => "None".to_string(),
            },
        ),
        ("Dirty Flag", opt(container.dirty_flag)),
        ("Refcount Bits", opt(container.refcount_bits)),
        ("Lazy Refcounts", opt(container.lazy_refcounts)),
        ("Corrupt", opt(container.corrupt)),
    ]
}

/// Render aligned `label  value` rows
pub fn render_rows(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "  {:<width$}  {}", label, value, width = width);
    }
    out
}

/// Reason lines for one provider
pub fn reason_lines(score: &ProviderScore) -> Vec<String> {
    score
        .reasons
        .iter()
        .map(|reason| match (reason.kind, reason.satisfied) {
            (ReasonKind::Requirement, _) => format!("! Missing required: {}", reason.key),
            (ReasonKind::Weighted, true) => format!("+ {} (+{})", reason.key, reason.weight),
            (ReasonKind::Weighted, false) => format!("- {} (+0)", reason.key),
        })
        .collect()
}

/// Full terminal report
pub fn render(report: &CompatibilityReport) -> String {
    let features = &report.context.features;
    let mut out = String::new();

    let _ = writeln!(out, "Compatibility report for {}", report.image);
    let _ = writeln!(out);
    let _ = writeln!(out, "Features:");
    out.push_str(&render_rows(&summary_rows(report)));
    let _ = writeln!(out);

    let _ = writeln!(out, "Cloud-init:");
    if !features.cloud_init_present {
        let _ = writeln!(
            out,
            "  Not detected. Automatic configuration on AWS, GCP and Azure may not work."
        );
    } else if features.cloud_init_paths.is_empty() {
        let _ = writeln!(out, "  Detected, but no marker paths were reported.");
    } else {
        for path in &features.cloud_init_paths {
            let _ = writeln!(out, "  {}", path);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Provider scores (out of 10):");
    for score in &report.scores {
        let status = if score.passed_hard_requirements {
            format!("{} / 10", score.normalized_score)
        } else {
            "0 / 10 (hard requirements not met)".to_string()
        };
        let _ = writeln!(out, "  {}: {}", score.provider, status);
        for line in reason_lines(score) {
            let _ = writeln!(out, "      {}", line);
        }
    }

    if let Some(best) = report.best_provider() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Best match: {} ({} / 10)", best.provider, best.normalized_score);
    }
    out
}

/// Catalog overview
pub fn render_catalog(catalog: &ProviderCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Provider catalog (version {}):", catalog.version);
    for profile in catalog.providers() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", profile.name);
        let _ = writeln!(out, "  formats:  {}", profile.accepted_formats.join(", "));

        let requires: Vec<String> = profile
            .hard_requirements
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        let _ = writeln!(
            out,
            "  requires: {}",
            if requires.is_empty() { "-".to_string() } else { requires.join(", ") }
        );

        let weights: Vec<String> = profile
            .score_weights
            .iter()
            .map(|(key, weight)| format!("{}({})", key, weight))
            .collect();
        let _ = writeln!(out, "  weights:  {} (max {})", weights.join(", "), profile.max_score());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FeatureKey;
    use crate::features::FeatureSet;
    use crate::scoring::{EvaluationContext, Reason};
    use std::path::Path;

    #[test]
    fn test_reason_lines() {
        let score = ProviderScore {
            provider: "GCP".to_string(),
            passed_hard_requirements: true,
            raw_score: 2,
            max_possible_score: 3,
            normalized_score: 6.67,
            reasons: vec![
                Reason { key: FeatureKey::Format, satisfied: true, weight: 2, kind: ReasonKind::Weighted },
                Reason { key: FeatureKey::LazyRefcounts, satisfied: false, weight: 0, kind: ReasonKind::Weighted },
            ],
        };
        assert_eq!(reason_lines(&score), vec!["+ format (+2)", "- lazy_refcounts (+0)"]);
    }

    #[test]
    fn test_render_mentions_missing_cloud_init() {
        let report = CompatibilityReport::new(
            Path::new("disk.vmdk"),
            EvaluationContext::new(FeatureSet::default(), ContainerSignals::default()),
            Vec::new(),
        );
        let text = render(&report);
        assert!(text.contains("Compatibility report for disk.vmdk"));
        assert!(text.contains("Not detected"));
        assert!(text.contains("Backing File"));
        assert!(!text.contains("Best match"));
    }

    #[test]
    fn test_render_catalog_lists_providers() {
        let catalog = ProviderCatalog::builtin().unwrap();
        let text = render_catalog(&catalog);
        assert!(text.contains("Oracle Cloud"));
        assert!(text.contains("requires: bios_boot=true, not_corrupt=true"));
        assert!(text.contains("(max 11)"));
    }
}
