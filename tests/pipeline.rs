// tests/pipeline.rs

//! End-to-end evaluation: captured inspector output plus directory partitions.

mod common;

use cloudfit::features::ExtractorOptions;
use cloudfit::format::CapturedInspector;
use cloudfit::{
    CompatibilityReport, FeatureExtractor, HostDirReader, OutputFormat, Pipeline, Stage,
};
use common::{esp_rootfs, ubuntu_rootfs, QCOW2_INFO};
use std::path::Path;
use tempfile::NamedTempFile;

fn captured(json: &str) -> (NamedTempFile, CapturedInspector) {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), json).unwrap();
    let inspector = CapturedInspector::new(file.path());
    (file, inspector)
}

#[test]
fn test_ubuntu_qcow2_end_to_end() {
    let esp = esp_rootfs();
    let root = ubuntu_rootfs();
    let reader = HostDirReader::new([esp.path(), root.path()]);
    let (_info, inspector) = captured(QCOW2_INFO);

    let pipeline = Pipeline::with_catalog_file(FeatureExtractor::default(), None).unwrap();
    let report = pipeline
        .evaluate(Path::new("/images/noble.qcow2"), &reader, &inspector)
        .unwrap();

    assert_eq!(report.context.container.filename.as_deref(), Some("noble.qcow2"));
    assert_eq!(report.context.features.detected_os, "Ubuntu 24.04 LTS");

    let scores: Vec<(&str, f64)> = report
        .scores
        .iter()
        .map(|s| (s.provider.as_str(), s.normalized_score))
        .collect();
    assert_eq!(
        scores,
        vec![
            ("AWS", 10.0),
            ("Azure", 7.0),
            ("GCP", 9.0),
            ("Oracle Cloud", 10.0),
            ("Open Source (KVM, Proxmox, etc.)", 10.0),
        ]
    );
    assert_eq!(report.best_provider().unwrap().provider, "AWS");
}

#[test]
fn test_no_partitions_fails_cloud_init_gates() {
    let reader = HostDirReader::default();
    let (_info, inspector) = captured(r#"{"format": "raw", "virtual-size": 10737418240}"#);

    let pipeline = Pipeline::with_catalog_file(
        FeatureExtractor::new(ExtractorOptions::sequential()),
        None,
    )
    .unwrap();
    let report = pipeline
        .evaluate(Path::new("disk.raw"), &reader, &inspector)
        .unwrap();

    let passed: Vec<&str> = report
        .scores
        .iter()
        .filter(|s| s.passed_hard_requirements)
        .map(|s| s.provider.as_str())
        .collect();
    assert_eq!(passed, vec!["Open Source (KVM, Proxmox, etc.)"]);
}

#[test]
fn test_malformed_inspector_output_reports_stage() {
    let reader = HostDirReader::default();
    let (_info, inspector) = captured("not json at all");

    let pipeline = Pipeline::with_catalog_file(FeatureExtractor::default(), None).unwrap();
    let err = pipeline
        .evaluate(Path::new("disk.img"), &reader, &inspector)
        .unwrap_err();
    assert_eq!(err.stage(), Some(Stage::FormatInspection));
    assert!(err.to_string().starts_with("format inspection:"));
}

#[test]
fn test_report_json_round_trips() {
    let root = ubuntu_rootfs();
    let reader = HostDirReader::new([root.path()]);
    let (_info, inspector) = captured(QCOW2_INFO);

    let pipeline = Pipeline::with_catalog_file(FeatureExtractor::default(), None).unwrap();
    let report = pipeline
        .evaluate(Path::new("noble.qcow2"), &reader, &inspector)
        .unwrap();

    let json = report.render(OutputFormat::Json).unwrap();
    let parsed: CompatibilityReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);

    let text = report.render(OutputFormat::Text).unwrap();
    assert!(text.contains("Detected OS"));
    assert!(text.contains("/etc/cloud/cloud.cfg"));
    assert!(text.contains("! Missing required: uefi_boot"));
}

#[test]
fn test_custom_catalog_file() {
    let catalog = NamedTempFile::new().unwrap();
    std::fs::write(
        catalog.path(),
        r#"
version = 1

[[provider]]
name = "Homelab"
accepted_formats = ["qcow2"]

[provider.weights]
format = 3
lazy_refcounts = 1
"#,
    )
    .unwrap();

    let reader = HostDirReader::default();
    let (_info, inspector) = captured(QCOW2_INFO);
    let pipeline =
        Pipeline::with_catalog_file(FeatureExtractor::default(), Some(catalog.path())).unwrap();
    let report = pipeline
        .evaluate(Path::new("disk.qcow2"), &reader, &inspector)
        .unwrap();

    assert_eq!(report.scores.len(), 1);
    assert_eq!(report.scores[0].normalized_score, 7.5);
}
