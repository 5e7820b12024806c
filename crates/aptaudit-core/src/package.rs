//! Package and version types.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Represents a Debian package version with comparison support.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// The full version string (e.g., "1:2.3.4-5").
    pub full: String,
    /// Epoch (if any).
    pub epoch: Option<u64>,
    /// Upstream version.
    pub upstream: String,
    /// Debian revision (empty for native packages).
    pub revision: String,
}

impl Version {
    /// Creates a new Version from a version string.
    pub fn new(version_str: &str) -> Self {
        let (epoch, rest) = if let Some(idx) = version_str.find(':') {
            let epoch = version_str[..idx].parse().ok();
            (epoch, &version_str[idx + 1..])
        } else {
            (None, version_str)
        };

        let (upstream, revision) = if let Some(idx) = rest.rfind('-') {
            (rest[..idx].to_string(), rest[idx + 1..].to_string())
        } else {
            (rest.to_string(), String::new())
        };

        Self {
            full: version_str.to_string(),
            epoch,
            upstream,
            revision,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare epochs first; a missing epoch counts as zero.
        match self.epoch.unwrap_or(0).cmp(&other.epoch.unwrap_or(0)) {
            Ordering::Equal => {}
            ord => return ord,
        }

        // Then the upstream part.
        match verrevcmp(&self.upstream, &other.upstream) {
            Ordering::Equal => {}
            ord => return ord,
        }

        // Finally the Debian revision.
        verrevcmp(&self.revision, &other.revision)
    }
}

/// Character weight for the non-digit parts of a version.
///
/// `~` sorts before everything, including the end of the string; letters sort
/// before all other non-digit characters.
fn char_order(c: Option<u8>) -> i32 {
    match c {
        Some(b'~') => -1,
        None => 0,
        Some(c) if c.is_ascii_alphabetic() => c as i32,
        Some(c) => c as i32 + 256,
    }
}

/// Version-part comparison following dpkg's rules.
///
/// Alternates between a character-wise comparison of non-digit runs and a
/// numeric comparison of digit runs.
fn verrevcmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let mut i = 0;
    let mut j = 0;

    while i < a.len() || j < b.len() {
        // Non-digit run: compare character weights.
        while a.get(i).is_some_and(|c| !c.is_ascii_digit())
            || b.get(j).is_some_and(|c| !c.is_ascii_digit())
        {
            let ac = char_order(a.get(i).copied().filter(|c| !c.is_ascii_digit()));
            let bc = char_order(b.get(j).copied().filter(|c| !c.is_ascii_digit()));
            match ac.cmp(&bc) {
                Ordering::Equal => {}
                ord => return ord,
            }
            if a.get(i).is_some_and(|c| !c.is_ascii_digit()) {
                i += 1;
            }
            if b.get(j).is_some_and(|c| !c.is_ascii_digit()) {
                j += 1;
            }
        }

        // Digit run: skip leading zeros, then the longer run wins; equal-length
        // runs are decided by the first differing digit.
        while a.get(i) == Some(&b'0') {
            i += 1;
        }
        while b.get(j) == Some(&b'0') {
            j += 1;
        }

        let mut first_diff = Ordering::Equal;
        while a.get(i).is_some_and(u8::is_ascii_digit) && b.get(j).is_some_and(u8::is_ascii_digit) {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }
        if a.get(i).is_some_and(u8::is_ascii_digit) {
            return Ordering::Greater;
        }
        if b.get(j).is_some_and(u8::is_ascii_digit) {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }

    Ordering::Equal
}

/// Metadata for one concrete version of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// The version this record describes.
    pub version: Version,
    /// One-line human-readable summary.
    pub summary: String,
    /// Whether some configured source currently serves a file for this
    /// exact version.
    pub downloadable: bool,
}

impl VersionRecord {
    /// Creates a new VersionRecord.
    pub fn new(version: Version, summary: impl Into<String>, downloadable: bool) -> Self {
        Self {
            version,
            summary: summary.into(),
            downloadable,
        }
    }
}

/// Core package representation.
///
/// A package is identified by its unique name and carries at most one
/// installed record and at most one candidate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package name.
    pub name: String,
    /// Record of the currently installed version, if any.
    pub installed: Option<VersionRecord>,
    /// Record of the best currently-available version, if any.
    pub candidate: Option<VersionRecord>,
}

impl Package {
    /// Creates a new Package with no records.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            installed: None,
            candidate: None,
        }
    }

    /// Whether the package is currently installed.
    pub fn is_installed(&self) -> bool {
        self.installed.is_some()
    }

    /// Whether the package can be retrieved again from a configured source.
    ///
    /// True if either the installed version or the current candidate is
    /// downloadable. Note that the candidate may differ in version from the
    /// installed record, so a package counts as downloadable even when the
    /// exact installed version is no longer served but an upgrade is.
    pub fn is_downloadable(&self) -> bool {
        self.installed.as_ref().is_some_and(|r| r.downloadable)
            || self.candidate.as_ref().is_some_and(|r| r.downloadable)
    }
}
