//! dpkg status file parsing.

use aptaudit_core::error::Result;
use std::io::BufRead;
use tracing::warn;

/// One stanza from the dpkg status file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Package name.
    pub name: String,
    /// Version string; may be empty for `not-installed` remnants.
    pub version: String,
    /// First line of the Description field.
    pub summary: String,
    /// Whether the Status field marks the package as installed.
    pub installed: bool,
}

/// Parses the dpkg status file.
///
/// Stanzas are separated by blank lines; continuation lines (leading space or
/// tab) belong to the previous field and only matter for Description, where
/// the summary is the text on the `Description:` line itself. A package
/// counts as installed when the third word of its Status field is
/// `installed` (e.g. `install ok installed`, but not
/// `deinstall ok config-files`).
pub fn parse_status<R: BufRead>(reader: R) -> Result<Vec<StatusEntry>> {
    let mut entries = Vec::new();

    let mut name = String::new();
    let mut version = String::new();
    let mut summary = String::new();
    let mut installed = false;

    let mut flush = |name: &mut String, version: &mut String, summary: &mut String, installed: &mut bool| {
        if !name.is_empty() {
            entries.push(StatusEntry {
                name: std::mem::take(name),
                version: std::mem::take(version),
                summary: std::mem::take(summary),
                installed: *installed,
            });
        } else {
            name.clear();
            version.clear();
            summary.clear();
        }
        *installed = false;
    };

    for line in reader.lines() {
        let line = line?;

        if line.is_empty() {
            flush(&mut name, &mut version, &mut summary, &mut installed);
            continue;
        }

        // Continuation lines carry the long description, which we ignore.
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }

        if let Some(value) = line.strip_prefix("Package:") {
            name = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("Version:") {
            version = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("Description:") {
            summary = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("Status:") {
            installed = value.split_whitespace().nth(2) == Some("installed");
        } else if !line.contains(':') {
            warn!("Skipping malformed status line: {}", line);
        }
    }
    flush(&mut name, &mut version, &mut summary, &mut installed);

    Ok(entries)
}
