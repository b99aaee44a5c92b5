// src/format/mod.rs

//! Container format signal normalization
//!
//! The image format inspector (`qemu-img info --output json`) reports a
//! JSON object with top-level fields shared by every format and an optional
//! `format-specific` block whose `data` fields only exist for some format
//! families (qcow2 has `refcount-bits`, `lazy-refcounts` and `corrupt`,
//! raw has none of them).
//!
//! [`normalize`] flattens both levels into [`ContainerSignals`]. A field the
//! inspector did not report stays `None`; it is never coerced to `false`
//! or `0`.

mod inspector;

pub use inspector::{
    inspect_image, CapturedInspector, FormatInspector, QemuImgInspector, DEFAULT_QEMU_IMG,
    DEFAULT_INSPECT_TIMEOUT,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Failure to obtain container metadata ("FormatInspectionFailed")
#[derive(Error, Debug)]
pub enum InspectionError {
    /// The inspector tool could not be started
    #[error("failed to run {tool}: {source}. Is qemu-img installed?")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The inspector exited unsuccessfully
    #[error("{tool} exited with code {code}: {stderr}")]
    ExitStatus {
        tool: String,
        code: i32,
        stderr: String,
    },

    /// The inspector did not finish in time
    #[error("{tool} timed out after {seconds} seconds")]
    Timeout { tool: String, seconds: u64 },

    /// Output was not JSON
    #[error("invalid JSON from inspector: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Output was JSON but not shaped like inspector output
    #[error("malformed inspector output: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for format inspection
pub type InspectionResult<T> = Result<T, InspectionError>;

/// Per-image container facts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerSignals {
    /// Image file name, when known
    pub filename: Option<String>,
    /// Container format, lower-cased ("qcow2", "raw", "vmdk", ...)
    pub format: Option<String>,
    pub virtual_size_bytes: Option<u64>,
    pub actual_size_bytes: Option<u64>,
    pub dirty_flag: Option<bool>,
    pub cluster_size: Option<u64>,
    pub backing_file: Option<String>,
    /// `type` of the format-specific block
    pub format_specific_type: Option<String>,
    pub corrupt: Option<bool>,
    pub refcount_bits: Option<u64>,
    pub lazy_refcounts: Option<bool>,
    /// Remaining format-specific data fields, verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub format_specific: BTreeMap<String, Value>,
}

impl ContainerSignals {
    /// Whether a non-empty backing file is configured
    pub fn has_backing_file(&self) -> bool {
        self.backing_file.as_deref().is_some_and(|f| !f.is_empty())
    }

    pub fn virtual_size_human(&self) -> String {
        human_readable_size(self.virtual_size_bytes)
    }

    pub fn actual_size_human(&self) -> String {
        human_readable_size(self.actual_size_bytes)
    }
}

/// Format a byte count as B/KB/MB/GB with two decimals
pub fn human_readable_size(bytes: Option<u64>) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        None => "Unknown".to_string(),
        Some(b) if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        Some(b) if b >= MB => format!("{:.2} MB", b as f64 / MB as f64),
        Some(b) if b >= KB => format!("{:.2} KB", b as f64 / KB as f64),
        Some(b) => format!("{} B", b),
    }
}

/// Flatten inspector output into container signals
pub fn normalize(info: &Value) -> InspectionResult<ContainerSignals> {
    let top = info
        .as_object()
        .ok_or_else(|| InspectionError::Malformed("expected a JSON object".to_string()))?;

    let mut signals = ContainerSignals {
        filename: None,
        format: get_string(top, "format")?.map(|f| f.to_ascii_lowercase()),
        virtual_size_bytes: get_u64(top, "virtual-size")?,
        actual_size_bytes: get_u64(top, "actual-size")?,
        dirty_flag: get_bool(top, "dirty-flag")?,
        cluster_size: get_u64(top, "cluster-size")?,
        backing_file: match get_string(top, "backing-file")? {
            Some(file) => Some(file),
            None => get_string(top, "backing-filename")?,
        },
        ..ContainerSignals::default()
    };

    if let Some(block) = top.get("format-specific").filter(|v| !v.is_null()) {
        let block = block.as_object().ok_or_else(|| {
            InspectionError::Malformed("format-specific must be an object".to_string())
        })?;
        signals.format_specific_type = get_string(block, "type")?;

        if let Some(data) = block.get("data").filter(|v| !v.is_null()) {
            let data = data.as_object().ok_or_else(|| {
                InspectionError::Malformed("format-specific data must be an object".to_string())
            })?;
            signals.corrupt = get_bool(data, "corrupt")?;
            signals.refcount_bits = get_u64(data, "refcount-bits")?;
            signals.lazy_refcounts = get_bool(data, "lazy-refcounts")?;

            for (key, value) in data {
                if !matches!(key.as_str(), "corrupt" | "refcount-bits" | "lazy-refcounts") {
                    signals.format_specific.insert(key.clone(), value.clone());
                }
            }
        }
    }

    Ok(signals)
}

fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn get_u64(obj: &Map<String, Value>, key: &str) -> InspectionResult<Option<u64>> {
    match field(obj, key) {
        None => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
            InspectionError::Malformed(format!("{} is not an unsigned integer: {}", key, n))
        }),
        Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| {
            InspectionError::Malformed(format!("{} is not an unsigned integer: {:?}", key, s))
        }),
        Some(other) => Err(InspectionError::Malformed(format!(
            "{} has unexpected type: {}",
            key, other
        ))),
    }
}

fn get_bool(obj: &Map<String, Value>, key: &str) -> InspectionResult<Option<bool>> {
    match field(obj, key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(InspectionError::Malformed(format!(
            "{} is not a boolean: {}",
            key, other
        ))),
    }
}

fn get_string(obj: &Map<String, Value>, key: &str) -> InspectionResult<Option<String>> {
    match field(obj, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(InspectionError::Malformed(format!(
            "{} is not a string: {}",
            key, other
        ))),
    }
}
