// src/features/hostdir.rs

//! Directory-backed forensics reader
//!
//! Treats each given host directory as one partition: an extracted root
//! filesystem, a loop-mounted partition, or a `guestmount` view. Lookups
//! are confined to the directory; paths with `..` components never match.

use super::probe::{
    EntryKind, ExtractionResult, ForensicsReader, PartitionDescriptor, PartitionError,
    PartitionFilesystem, ProbeError,
};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Directory partitions have no sector geometry; report them large enough to scan
const DIRECTORY_PARTITION_SECTORS: u64 = u32::MAX as u64;

/// One directory viewed as a partition filesystem
#[derive(Debug, Clone)]
pub struct HostDirFilesystem {
    root: PathBuf,
}

impl HostDirFilesystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an absolute image path onto the host, refusing escapes
    fn resolve(&self, path: &str) -> Result<PathBuf, ProbeError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ProbeError::NotFound);
                }
            }
        }
        Ok(resolved)
    }
}

impl PartitionFilesystem for HostDirFilesystem {
    fn list_dir(&self, path: &str) -> Result<Vec<String>, ProbeError> {
        let dir = self.resolve(path)?;
        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, ProbeError> {
        Ok(fs::read(self.resolve(path)?)?)
    }

    fn stat(&self, path: &str) -> Result<EntryKind, ProbeError> {
        // symlink_metadata: absolute links inside an image point at the image, not the host
        let meta = fs::symlink_metadata(self.resolve(path)?)?;
        Ok(if meta.is_dir() {
            EntryKind::Directory
        } else if meta.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        })
    }
}

/// A set of host directories, each presented as one partition
///
/// Directories have no sector geometry: every descriptor starts at sector 0
/// and is reported large enough to scan. The reader keeps its own mapping
/// from descriptor back to directory.
#[derive(Debug, Clone, Default)]
pub struct HostDirReader {
    partitions: Vec<(PartitionDescriptor, PathBuf)>,
}

impl HostDirReader {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let partitions = roots
            .into_iter()
            .map(Into::into)
            .map(|root: PathBuf| {
                let desc = PartitionDescriptor::new(
                    root.display().to_string(),
                    0,
                    DIRECTORY_PARTITION_SECTORS,
                );
                (desc, root)
            })
            .collect();
        Self { partitions }
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

impl ForensicsReader for HostDirReader {
    fn partitions(&self) -> ExtractionResult<Vec<PartitionDescriptor>> {
        Ok(self.partitions.iter().map(|(desc, _)| desc.clone()).collect())
    }

    fn open_filesystem<'a>(
        &'a self,
        partition: &PartitionDescriptor,
    ) -> Result<Box<dyn PartitionFilesystem + 'a>, PartitionError> {
        // Identical descriptors always name the same directory
        let root = self
            .partitions
            .iter()
            .find(|(desc, _)| desc == partition)
            .map(|(_, root)| root)
            .ok_or_else(|| PartitionError::new(partition, "no such directory partition"))?;

        if !root.is_dir() {
            return Err(PartitionError::new(partition, "not a directory"));
        }
        debug!("Opened directory partition {}", root.display());
        Ok(Box::new(HostDirFilesystem::new(root.clone())))
    }
}
