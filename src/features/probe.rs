// src/features/probe.rs

//! Interfaces to the image forensics reader
//!
//! The reader is an external collaborator that knows how to enumerate the
//! partition table of a disk image and open the filesystem inside a
//! partition. Feature extraction only ever talks to it through the traits
//! in this module, so the same scan runs against raw images, extracted
//! root directories, or in-memory fixtures.

use thiserror::Error;
use tracing::warn;

/// A partition as listed in the image's volume table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionDescriptor {
    /// Description reported by the volume system (e.g. "Linux (0x83)", "Unallocated")
    pub label: String,
    /// First sector of the partition
    pub start_sector: u64,
    /// Partition length in sectors
    pub length_sectors: u64,
}

impl PartitionDescriptor {
    pub fn new(label: impl Into<String>, start_sector: u64, length_sectors: u64) -> Self {
        Self {
            label: label.into(),
            start_sector,
            length_sectors,
        }
    }

    /// Whether the volume system marks this region as unallocated space
    pub fn is_unallocated(&self) -> bool {
        self.label.to_ascii_lowercase().contains("unallocated")
    }
}

/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

/// Failure of a single lookup inside a partition filesystem
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The path does not exist. This is an ordinary answer, not a fault.
    #[error("not found")]
    NotFound,

    /// Unexpected I/O or parser failure while looking the path up
    #[error("probe fault: {0}")]
    Fault(String),
}

impl ProbeError {
    pub fn fault(msg: impl Into<String>) -> Self {
        Self::Fault(msg.into())
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory => Self::NotFound,
            _ => Self::Fault(err.to_string()),
        }
    }
}

/// The partition's filesystem could not be opened ("PartitionUnreadable")
#[derive(Error, Debug)]
#[error("partition '{label}' at sector {start_sector} is unreadable: {reason}")]
pub struct PartitionError {
    pub label: String,
    pub start_sector: u64,
    pub reason: String,
}

impl PartitionError {
    pub fn new(partition: &PartitionDescriptor, reason: impl Into<String>) -> Self {
        Self {
            label: partition.label.clone(),
            start_sector: partition.start_sector,
            reason: reason.into(),
        }
    }
}

/// The volume table itself could not be enumerated
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("failed to read partition table: {0}")]
    PartitionTable(String),
}

/// Result type for feature extraction
pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Read-only view of one opened partition filesystem
pub trait PartitionFilesystem {
    /// Names of the entries directly inside `path`
    fn list_dir(&self, path: &str) -> Result<Vec<String>, ProbeError>;

    /// Full contents of the file at `path`
    fn read_file(&self, path: &str) -> Result<Vec<u8>, ProbeError>;

    /// Kind of the entry at `path`
    fn stat(&self, path: &str) -> Result<EntryKind, ProbeError>;
}

impl<T: PartitionFilesystem + ?Sized> PartitionFilesystem for &T {
    fn list_dir(&self, path: &str) -> Result<Vec<String>, ProbeError> {
        (**self).list_dir(path)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, ProbeError> {
        (**self).read_file(path)
    }

    fn stat(&self, path: &str) -> Result<EntryKind, ProbeError> {
        (**self).stat(path)
    }
}

/// Access to the partitions of one disk image
///
/// Implementations must be `Sync`: partitions may be opened from several
/// worker threads at once.
pub trait ForensicsReader: Sync {
    /// Partitions in volume-table order
    fn partitions(&self) -> ExtractionResult<Vec<PartitionDescriptor>>;

    /// Open the filesystem inside `partition`
    fn open_filesystem<'a>(
        &'a self,
        partition: &PartitionDescriptor,
    ) -> Result<Box<dyn PartitionFilesystem + 'a>, PartitionError>;
}

/// Outcome of a single existence or read probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Found(T),
    NotFound,
    /// The lookup faulted; already logged, treat as not found
    Failed,
}

impl<T> Probe<T> {
    /// Turn a collaborator result into a probe outcome, logging only faults
    pub fn from_result(path: &str, result: Result<T, ProbeError>) -> Self {
        match result {
            Ok(value) => Probe::Found(value),
            Err(ProbeError::NotFound) => Probe::NotFound,
            Err(ProbeError::Fault(reason)) => {
                warn!("Probe of {} failed: {}", path, reason);
                Probe::Failed
            }
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Probe::Found(value) => Some(value),
            Probe::NotFound | Probe::Failed => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Probe::Found(_))
    }
}

/// Whether the directory at `dir` holds an entry named `name` (ASCII case-insensitive)
pub fn dir_contains(fs: &dyn PartitionFilesystem, dir: &str, name: &str) -> bool {
    match Probe::from_result(dir, fs.list_dir(dir)) {
        Probe::Found(entries) => entries.iter().any(|e| e.eq_ignore_ascii_case(name)),
        Probe::NotFound | Probe::Failed => false,
    }
}

/// Whether anything exists at `path`
pub fn path_exists(fs: &dyn PartitionFilesystem, path: &str) -> bool {
    Probe::from_result(path, fs.stat(path)).is_found()
}

/// Split an absolute path into (parent, basename)
pub fn split_parent(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => ("/", &trimmed[1..]),
        Some(idx) => (&trimmed[..idx], &trimmed[idx + 1..]),
        None => ("/", trimmed),
    }
}
