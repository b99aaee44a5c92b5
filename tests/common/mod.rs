// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use cloudfit::features::MemoryFilesystem;
use cloudfit::{ContainerSignals, EvaluationContext, FeatureSet};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Container signals for a clean image of the given format
pub fn container(format: &str) -> ContainerSignals {
    ContainerSignals {
        format: Some(format.to_string()),
        corrupt: Some(false),
        ..ContainerSignals::default()
    }
}

/// Feature set with the given boot/cloud-init flags
pub fn features(bios: bool, uefi: bool, cloud_init: bool) -> FeatureSet {
    FeatureSet {
        bios_boot_present: bios,
        uefi_boot_present: uefi,
        cloud_init_present: cloud_init,
        cloud_init_paths: if cloud_init {
            vec!["/etc/cloud".to_string()]
        } else {
            Vec::new()
        },
        ..FeatureSet::default()
    }
}

pub fn context(features: FeatureSet, container: ContainerSignals) -> EvaluationContext {
    EvaluationContext::new(features, container)
}

/// A Debian-style root filesystem with GRUB and cloud-init
pub fn debian_root() -> MemoryFilesystem {
    MemoryFilesystem::new()
        .with_dir("/boot/grub")
        .with_dir("/usr/lib/cloud-init")
        .with_file("/etc/cloud/cloud.cfg", b"users: [default]\n")
        .with_file("/etc/os-release", b"PRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\nID=debian\n")
}

/// An EFI system partition
pub fn efi_partition() -> MemoryFilesystem {
    MemoryFilesystem::new().with_file("/EFI/BOOT/BOOTX64.EFI", b"MZ")
}

/// Write a file below `root`, creating parents
pub fn write_file(root: &Path, path: &str, content: &str) {
    let full = root.join(path.trim_start_matches('/'));
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(full, content).unwrap();
}

/// Create an extracted Ubuntu cloud image root in a temp dir.
///
/// Returns the TempDir - keep it alive to prevent cleanup.
pub fn ubuntu_rootfs() -> TempDir {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("boot/grub")).unwrap();
    write_file(temp.path(), "/etc/cloud/cloud.cfg", "datasource_list: [ Ec2, None ]\n");
    write_file(temp.path(), "/usr/bin/cloud-init", "#!/usr/bin/python3\n");
    write_file(
        temp.path(),
        "/lib/systemd/system/cloud-init.service",
        "[Unit]\nDescription=Cloud-init: Network Stage\n",
    );
    write_file(
        temp.path(),
        "/etc/os-release",
        "NAME=\"Ubuntu\"\nPRETTY_NAME=\"Ubuntu 24.04 LTS\"\nID=ubuntu\n",
    );
    temp
}

/// Create an EFI system partition tree in a temp dir
pub fn esp_rootfs() -> TempDir {
    let temp = tempfile::tempdir().unwrap();
    write_file(temp.path(), "/EFI/BOOT/BOOTX64.EFI", "MZ");
    temp
}

/// Captured `qemu-img info --output json` for a qcow2 image
pub const QCOW2_INFO: &str = r#"{
    "children": [],
    "virtual-size": 2361393152,
    "filename": "noble-server-cloudimg-amd64.img",
    "cluster-size": 65536,
    "format": "qcow2",
    "actual-size": 586432512,
    "format-specific": {
        "type": "qcow2",
        "data": {
            "compat": "1.1",
            "compression-type": "zlib",
            "lazy-refcounts": false,
            "refcount-bits": 16,
            "corrupt": false,
            "extended-l2": false
        }
    },
    "dirty-flag": false
}"#;
