// src/features/memory.rs

//! In-memory forensics reader
//!
//! Holds partition filesystems as plain path maps. Used to drive the
//! extractor without a disk image, and by embedders that already hold a
//! parsed file listing from another tool.

use super::probe::{
    EntryKind, ExtractionError, ExtractionResult, ForensicsReader, PartitionDescriptor,
    PartitionError, PartitionFilesystem, ProbeError, split_parent,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
enum Node {
    Directory,
    File(Vec<u8>),
}

/// A filesystem tree held in memory
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    nodes: BTreeMap<String, Node>,
    faults: BTreeSet<String>,
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Directory);
        Self {
            nodes,
            faults: BTreeSet::new(),
        }
    }
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{}", trimmed)
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory and any missing ancestors
    pub fn with_dir(mut self, path: &str) -> Self {
        self.add_ancestors(&normalize(path));
        self.nodes.insert(normalize(path), Node::Directory);
        self
    }

    /// Add a file and any missing ancestor directories
    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        let path = normalize(path);
        self.add_ancestors(&path);
        self.nodes.insert(path, Node::File(content.to_vec()));
        self
    }

    /// Make every lookup of `path` fail with an I/O fault
    pub fn with_fault(mut self, path: &str) -> Self {
        self.faults.insert(normalize(path));
        self
    }

    fn add_ancestors(&mut self, path: &str) {
        let mut current = path;
        while current != "/" {
            let (parent, _) = split_parent(current);
            self.nodes
                .entry(parent.to_string())
                .or_insert(Node::Directory);
            current = parent;
        }
    }

    fn lookup(&self, path: &str) -> Result<(&str, &Node), ProbeError> {
        let path = normalize(path);
        if self.faults.contains(&path) {
            return Err(ProbeError::fault(format!("simulated I/O error at {}", path)));
        }
        self.nodes
            .get_key_value(&path)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or(ProbeError::NotFound)
    }
}

impl PartitionFilesystem for MemoryFilesystem {
    fn list_dir(&self, path: &str) -> Result<Vec<String>, ProbeError> {
        let (dir, node) = self.lookup(path)?;
        if !matches!(node, Node::Directory) {
            return Err(ProbeError::NotFound);
        }

        Ok(self
            .nodes
            .keys()
            .filter(|key| key.as_str() != "/")
            .filter_map(|key| {
                let (parent, name) = split_parent(key);
                (parent == dir).then(|| name.to_string())
            })
            .collect())
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, ProbeError> {
        match self.lookup(path)? {
            (_, Node::File(content)) => Ok(content.clone()),
            (p, Node::Directory) => Err(ProbeError::fault(format!("{} is a directory", p))),
        }
    }

    fn stat(&self, path: &str) -> Result<EntryKind, ProbeError> {
        Ok(match self.lookup(path)?.1 {
            Node::File(_) => EntryKind::File,
            Node::Directory => EntryKind::Directory,
        })
    }
}

/// A disk image whose partitions are [`MemoryFilesystem`]s
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    partitions: Vec<(PartitionDescriptor, Option<MemoryFilesystem>)>,
    table_error: Option<String>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reader whose partition table cannot be read
    pub fn unreadable_table(reason: impl Into<String>) -> Self {
        Self {
            partitions: Vec::new(),
            table_error: Some(reason.into()),
        }
    }

    pub fn with_partition(
        mut self,
        label: &str,
        start_sector: u64,
        length_sectors: u64,
        fs: MemoryFilesystem,
    ) -> Self {
        self.partitions.push((
            PartitionDescriptor::new(label, start_sector, length_sectors),
            Some(fs),
        ));
        self
    }

    /// A partition with no recognizable filesystem (swap, raw data, ...)
    pub fn with_unreadable_partition(
        mut self,
        label: &str,
        start_sector: u64,
        length_sectors: u64,
    ) -> Self {
        self.partitions.push((
            PartitionDescriptor::new(label, start_sector, length_sectors),
            None,
        ));
        self
    }
}

impl ForensicsReader for MemoryReader {
    fn partitions(&self) -> ExtractionResult<Vec<PartitionDescriptor>> {
        if let Some(ref reason) = self.table_error {
            return Err(ExtractionError::PartitionTable(reason.clone()));
        }
        Ok(self.partitions.iter().map(|(desc, _)| desc.clone()).collect())
    }

    fn open_filesystem<'a>(
        &'a self,
        partition: &PartitionDescriptor,
    ) -> Result<Box<dyn PartitionFilesystem + 'a>, PartitionError> {
        match self.partitions.iter().find(|(desc, _)| desc == partition) {
            Some((_, Some(fs))) => Ok(Box::new(fs)),
            Some((_, None)) => Err(PartitionError::new(partition, "no recognized filesystem")),
            None => Err(PartitionError::new(partition, "no such partition")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ancestors_created() {
        let fs = MemoryFilesystem::new().with_file("/etc/cloud/cloud.cfg", b"x");
        assert_eq!(fs.stat("/etc").unwrap(), EntryKind::Directory);
        assert_eq!(fs.stat("/etc/cloud").unwrap(), EntryKind::Directory);
        assert_eq!(fs.list_dir("/").unwrap(), vec!["etc"]);
        assert_eq!(fs.list_dir("/etc/cloud").unwrap(), vec!["cloud.cfg"]);
    }

    #[test]
    fn test_missing_and_fault() {
        let fs = MemoryFilesystem::new().with_dir("/boot").with_fault("/boot");
        assert!(matches!(fs.stat("/nope"), Err(ProbeError::NotFound)));
        assert!(matches!(fs.list_dir("/boot"), Err(ProbeError::Fault(_))));
    }

    #[test]
    fn test_read_directory_is_fault() {
        let fs = MemoryFilesystem::new().with_dir("/etc/os-release");
        assert!(matches!(fs.read_file("/etc/os-release"), Err(ProbeError::Fault(_))));
    }

    #[test]
    fn test_reader_unreadable_partition() {
        let reader = MemoryReader::new().with_unreadable_partition("swap", 2048, 8192);
        let parts = reader.partitions().unwrap();
        assert!(reader.open_filesystem(&parts[0]).is_err());
    }
}
