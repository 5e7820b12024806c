//! APT package index parsing.
//!
//! `apt-get update` leaves one `*_Packages` file per configured source under
//! the lists directory. Every record in those files describes a version some
//! source currently serves, which is exactly the downloadability information
//! the audit needs.

use aptaudit_core::error::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// One record from a package index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Package name.
    pub name: String,
    /// Version string.
    pub version: String,
    /// First line of the Description field.
    pub summary: String,
}

/// Parses a single `Packages` index.
pub fn parse_index<R: BufRead>(reader: R) -> Result<Vec<IndexEntry>> {
    let mut entries = Vec::new();

    let mut name = String::new();
    let mut version = String::new();
    let mut summary = String::new();

    let mut flush = |name: &mut String, version: &mut String, summary: &mut String| {
        if !name.is_empty() && !version.is_empty() {
            entries.push(IndexEntry {
                name: std::mem::take(name),
                version: std::mem::take(version),
                summary: std::mem::take(summary),
            });
        } else {
            name.clear();
            version.clear();
            summary.clear();
        }
    };

    for line in reader.lines() {
        let line = line?;

        if line.is_empty() {
            flush(&mut name, &mut version, &mut summary);
            continue;
        }
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }

        if let Some(value) = line.strip_prefix("Package:") {
            name = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("Version:") {
            version = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("Description:") {
            summary = value.trim().to_string();
        }
    }
    flush(&mut name, &mut version, &mut summary);

    Ok(entries)
}

/// Parses every uncompressed `*_Packages` file under the lists directory.
///
/// Compressed indexes (`Acquire::IndexTargets` with lz4/gz/xz) are skipped
/// with a warning rather than decompressed.
pub fn scan_lists_dir(dir: &Path) -> Result<Vec<IndexEntry>> {
    let mut entries = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if file_name.ends_with("_Packages") {
            let file = File::open(&path)?;
            let parsed = parse_index(BufReader::new(file))?;
            debug!(index = file_name, records = parsed.len(), "Parsed package index");
            entries.extend(parsed);
        } else if file_name.contains("_Packages.") {
            warn!("Skipping compressed package index: {}", file_name);
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
Package: bash
Version: 5.2.15-2
Installed-Size: 7160
Description: GNU Bourne Again SHell
 Long description continues here.

Package: bash
Version: 5.2.21-1
Description: GNU Bourne Again SHell
";

    #[test]
    fn test_parse_index() {
        let entries = parse_index(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "bash");
        assert_eq!(entries[0].version, "5.2.15-2");
        assert_eq!(entries[0].summary, "GNU Bourne Again SHell");
        assert_eq!(entries[1].version, "5.2.21-1");
    }

    #[test]
    fn test_scan_lists_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("deb.debian.org_debian_dists_bookworm_main_binary-amd64_Packages"),
            SAMPLE,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("deb.debian.org_debian_dists_bookworm_InRelease"),
            "not an index",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("mirror_dists_sid_main_binary-amd64_Packages.lz4"),
            "compressed",
        )
        .unwrap();

        let entries = scan_lists_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
    }
}
