// src/format/inspector.rs

//! Image format inspector backends
//!
//! The default backend runs `qemu-img info --output json`. A captured
//! backend reads the same JSON from a file, for images inspected on
//! another host or in CI fixtures.

use super::{normalize, ContainerSignals, InspectionError, InspectionResult};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};
use wait_timeout::ChildExt;

/// Default inspector binary
pub const DEFAULT_QEMU_IMG: &str = "qemu-img";

/// Default time allowed for one inspection
pub const DEFAULT_INSPECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Source of raw container metadata for an image
pub trait FormatInspector {
    /// Inspector output for `image` as parsed JSON
    fn inspect(&self, image: &Path) -> InspectionResult<Value>;
}

/// Runs `qemu-img info` as a subprocess
#[derive(Debug, Clone)]
pub struct QemuImgInspector {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for QemuImgInspector {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_QEMU_IMG),
            timeout: DEFAULT_INSPECT_TIMEOUT,
        }
    }
}

impl QemuImgInspector {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn tool(&self) -> String {
        self.binary.display().to_string()
    }
}

impl FormatInspector for QemuImgInspector {
    fn inspect(&self, image: &Path) -> InspectionResult<Value> {
        debug!("Running {} info on {}", self.tool(), image.display());

        let mut child = Command::new(&self.binary)
            .args(["info", "--output", "json"])
            .arg(image)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| InspectionError::Spawn {
                tool: self.tool(),
                source,
            })?;

        // Drain both pipes while waiting; a child blocked on a full pipe never exits
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        match child.wait_timeout(self.timeout)? {
            Some(status) => {
                let stdout = join_output(stdout)?;
                let stderr = join_output(stderr)?;

                if !status.success() {
                    return Err(InspectionError::ExitStatus {
                        tool: self.tool(),
                        code: status.code().unwrap_or(-1),
                        stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
                    });
                }
                Ok(serde_json::from_slice(&stdout)?)
            }
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(InspectionError::Timeout {
                    tool: self.tool(),
                    seconds: self.timeout.as_secs(),
                })
            }
        }
    }
}

type OutputReader = Option<JoinHandle<std::io::Result<Vec<u8>>>>;

/// Read a child pipe to the end on its own thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> OutputReader {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn join_output(reader: OutputReader) -> InspectionResult<Vec<u8>> {
    match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| InspectionError::Malformed("output reader thread panicked".to_string()))?
            .map_err(InspectionError::from),
        None => Ok(Vec::new()),
    }
}

/// Reads previously captured `qemu-img info --output json` output
#[derive(Debug, Clone)]
pub struct CapturedInspector {
    path: PathBuf,
}

impl CapturedInspector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FormatInspector for CapturedInspector {
    fn inspect(&self, _image: &Path) -> InspectionResult<Value> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Inspect an image and normalize the result
pub fn inspect_image<I>(inspector: &I, image: &Path) -> InspectionResult<ContainerSignals>
where
    I: FormatInspector + ?Sized,
{
    let raw = inspector.inspect(image)?;
    let mut signals = normalize(&raw)?;
    signals.filename = image
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    info!(
        "Container: format={} virtual={} actual={}",
        signals.format.as_deref().unwrap_or("unknown"),
        signals.virtual_size_human(),
        signals.actual_size_human()
    );
    Ok(signals)
}
