// src/features/os.rs

//! OS identity detection from /etc/os-release and /etc/issue

use super::probe::{PartitionFilesystem, Probe};
use tracing::debug;

pub(crate) const OS_RELEASE_PATH: &str = "/etc/os-release";
pub(crate) const ISSUE_PATH: &str = "/etc/issue";

/// Extract the `PRETTY_NAME` value from os-release content
///
/// Surrounding single or double quotes are removed. Returns `None` when no
/// line carries the key or its value is empty.
pub fn parse_os_release(content: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.trim_start().strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|value| !value.is_empty())
}

/// Extract an OS name from /etc/issue content
///
/// Uses the first non-empty line up to the first backslash escape
/// (getty expands sequences like `\n` and `\l`).
pub fn parse_issue(content: &str) -> Option<String> {
    let line = content.lines().map(str::trim).find(|l| !l.is_empty())?;
    let name = line.split('\\').next().unwrap_or_default().trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Best-effort OS detection on one partition; read failures yield `None`
pub(crate) fn detect_os(fs: &dyn PartitionFilesystem) -> Option<String> {
    let from_release = Probe::from_result(OS_RELEASE_PATH, fs.read_file(OS_RELEASE_PATH))
        .found()
        .and_then(|bytes| parse_os_release(&String::from_utf8_lossy(&bytes)));
    if from_release.is_some() {
        return from_release;
    }

    debug!("No PRETTY_NAME in {}, falling back to {}", OS_RELEASE_PATH, ISSUE_PATH);
    Probe::from_result(ISSUE_PATH, fs.read_file(ISSUE_PATH))
        .found()
        .and_then(|bytes| parse_issue(&String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_os_release_quoted() {
        let content = "NAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\nPRETTY_NAME=\"Ubuntu 22.04.4 LTS\"\nID=ubuntu\n";
        assert_eq!(parse_os_release(content), Some("Ubuntu 22.04.4 LTS".to_string()));
    }

    #[test]
    fn test_parse_os_release_unquoted_and_single_quoted() {
        assert_eq!(parse_os_release("PRETTY_NAME=Alpine\n"), Some("Alpine".to_string()));
        assert_eq!(
            parse_os_release("PRETTY_NAME='Arch Linux'\n"),
            Some("Arch Linux".to_string())
        );
    }

    #[test]
    fn test_parse_os_release_missing_key() {
        assert_eq!(parse_os_release("NAME=Debian\nID=debian\n"), None);
        assert_eq!(parse_os_release("PRETTY_NAME=\"\"\n"), None);
    }

    #[test]
    fn test_parse_issue_strips_escapes() {
        assert_eq!(
            parse_issue("Debian GNU/Linux 12 \\n \\l\n\n"),
            Some("Debian GNU/Linux 12".to_string())
        );
        assert_eq!(
            parse_issue("\nCentOS Linux 7 (Core)\nKernel \\r on an \\m\n"),
            Some("CentOS Linux 7 (Core)".to_string())
        );
    }

    #[test]
    fn test_parse_issue_only_escapes() {
        assert_eq!(parse_issue("\\S\n"), None);
        assert_eq!(parse_issue(""), None);
    }
}
