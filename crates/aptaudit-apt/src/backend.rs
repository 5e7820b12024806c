//! APT backend implementation.

use crate::lists::{self, IndexEntry};
use crate::status::{self, StatusEntry};
use aptaudit_core::{
    database::PackageDatabase,
    error::{Error, Result},
    package::{Package, Version, VersionRecord},
};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Default paths for Debian-family systems.
const DEFAULT_STATUS_FILE: &str = "/var/lib/dpkg/status";
const DEFAULT_LISTS_DIR: &str = "/var/lib/apt/lists";

/// Configuration for the APT backend.
#[derive(Debug, Clone)]
pub struct AptConfig {
    /// Path to the dpkg status file.
    pub status_file: PathBuf,
    /// Directory holding the downloaded package indexes.
    pub lists_dir: PathBuf,
}

impl Default for AptConfig {
    fn default() -> Self {
        Self {
            status_file: PathBuf::from(DEFAULT_STATUS_FILE),
            lists_dir: PathBuf::from(DEFAULT_LISTS_DIR),
        }
    }
}

/// The APT package database.
///
/// Holds the assembled snapshot in memory; `refresh` rebuilds the on-disk
/// indexes via `apt-get update` and reloads everything.
pub struct AptDatabase {
    config: AptConfig,
    packages: HashMap<String, Package>,
}

impl AptDatabase {
    /// Creates a new APT database with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(AptConfig::default())
    }

    /// Creates a new APT database with custom configuration.
    pub fn with_config(config: AptConfig) -> Result<Self> {
        // Verify the status file exists.
        if !config.status_file.exists() {
            return Err(Error::DatabaseError(format!(
                "Status file does not exist: {}",
                config.status_file.display()
            )));
        }

        Ok(Self {
            config,
            packages: HashMap::new(),
        })
    }

    /// Runs `apt-get update` to rebuild the on-disk indexes.
    fn update_indexes(&self) -> Result<()> {
        info!("Rebuilding package indexes");

        let output = Command::new("apt-get")
            .args(["update", "-q"])
            .output()
            .map_err(|e| Error::IndexUpdateFailed(format!("failed to run apt-get: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("Permission denied") || stderr.contains("are you root") {
                return Err(Error::PermissionDenied(
                    "apt-get update requires root privileges".to_string(),
                ));
            }
            return Err(Error::IndexUpdateFailed(stderr.trim().to_string()));
        }

        Ok(())
    }

    /// Reloads the snapshot from the status file and the package indexes.
    pub fn reload(&mut self) -> Result<()> {
        let file = File::open(&self.config.status_file)?;
        let status_entries = status::parse_status(BufReader::new(file))?;
        let index_entries = lists::scan_lists_dir(&self.config.lists_dir)?;

        self.packages = build_snapshot(status_entries, index_entries);
        debug!(packages = self.packages.len(), "Snapshot assembled");

        Ok(())
    }

    /// Path to the status file this database reads.
    pub fn status_file(&self) -> &Path {
        &self.config.status_file
    }
}

impl PackageDatabase for AptDatabase {
    fn refresh(&mut self) -> Result<()> {
        self.update_indexes()?;
        self.reload()
    }

    fn package_count(&self) -> usize {
        self.packages.len()
    }

    fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    fn packages(&self) -> Box<dyn Iterator<Item = &Package> + '_> {
        Box::new(self.packages.values())
    }
}

/// Assembles the per-name snapshot from the two file sources.
///
/// Index records are downloadable by definition. An installed version is
/// downloadable iff some index record carries the same version. The candidate
/// is the highest-version record among index records and the installed
/// record; the index record wins ties so the candidate of an up-to-date
/// package stays downloadable.
fn build_snapshot(
    status_entries: Vec<StatusEntry>,
    index_entries: Vec<IndexEntry>,
) -> HashMap<String, Package> {
    let mut available: HashMap<String, Vec<VersionRecord>> = HashMap::new();
    for entry in index_entries {
        available.entry(entry.name).or_default().push(VersionRecord::new(
            Version::new(&entry.version),
            entry.summary,
            true,
        ));
    }

    let mut packages: HashMap<String, Package> = HashMap::new();

    for entry in status_entries {
        let pkg = packages
            .entry(entry.name.clone())
            .or_insert_with(|| Package::new(&entry.name));

        if entry.installed && !entry.version.is_empty() {
            let version = Version::new(&entry.version);
            let downloadable = available
                .get(&entry.name)
                .is_some_and(|records| records.iter().any(|r| r.version.cmp(&version) == Ordering::Equal));
            pkg.installed = Some(VersionRecord::new(version, entry.summary, downloadable));
        }
    }

    for (name, mut records) in available {
        records.sort_by(|a, b| a.version.cmp(&b.version));
        let best = records.pop();

        let pkg = packages
            .entry(name.clone())
            .or_insert_with(|| Package::new(&name));
        pkg.candidate = match (&pkg.installed, best) {
            (Some(installed), Some(best)) if installed.version > best.version => {
                Some(installed.clone())
            }
            (_, best) => best,
        };
    }

    // Installed packages with no index record at all: the candidate falls
    // back to the installed version.
    for pkg in packages.values_mut() {
        if pkg.candidate.is_none() {
            pkg.candidate = pkg.installed.clone();
        }
    }

    packages
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = "\
Package: bash
Status: install ok installed
Version: 5.2.15-2
Description: GNU Bourne Again SHell

Package: stale-tool
Status: install ok installed
Version: 2.0-1
Description: manually installed tool

Package: newer-than-archive
Status: install ok installed
Version: 9.9-1
Description: locally built package

Package: old-config
Status: deinstall ok config-files
Version: 0.9-1
Description: removed but configured
";

    const INDEX: &str = "\
Package: bash
Version: 5.2.15-2
Description: GNU Bourne Again SHell

Package: newer-than-archive
Version: 1.0-1
Description: archive version

Package: never-installed
Version: 3.1-4
Description: available only
";

    fn snapshot() -> HashMap<String, Package> {
        let status_entries = status::parse_status(std::io::Cursor::new(STATUS)).unwrap();
        let index_entries = lists::parse_index(std::io::Cursor::new(INDEX)).unwrap();
        build_snapshot(status_entries, index_entries)
    }

    #[test]
    fn test_snapshot_counts_all_known_names() {
        let packages = snapshot();
        // bash, stale-tool, newer-than-archive, old-config, never-installed.
        assert_eq!(packages.len(), 5);
        assert!(!packages["old-config"].is_installed());
        assert!(!packages["never-installed"].is_installed());
    }

    #[test]
    fn test_installed_version_matching_index_is_downloadable() {
        let packages = snapshot();
        let bash = &packages["bash"];
        let installed = bash.installed.as_ref().unwrap();
        assert!(installed.downloadable);
        assert_eq!(installed.version.full, "5.2.15-2");
        assert!(bash.is_downloadable());
    }

    #[test]
    fn test_missing_index_record_means_non_downloadable() {
        let packages = snapshot();
        let stale = &packages["stale-tool"];
        assert!(!stale.installed.as_ref().unwrap().downloadable);
        // Candidate falls back to the installed record.
        let candidate = stale.candidate.as_ref().unwrap();
        assert_eq!(candidate.version.full, "2.0-1");
        assert!(!candidate.downloadable);
        assert!(!stale.is_downloadable());
    }

    #[test]
    fn test_installed_newer_than_archive_wins_candidate() {
        let packages = snapshot();
        let pkg = &packages["newer-than-archive"];
        let candidate = pkg.candidate.as_ref().unwrap();
        assert_eq!(candidate.version.full, "9.9-1");
        assert!(!candidate.downloadable);
        assert!(!pkg.is_downloadable());
    }

    #[test]
    fn test_candidate_is_highest_indexed_version() {
        let status_entries = status::parse_status(std::io::Cursor::new(
            "Package: bash\nStatus: install ok installed\nVersion: 5.2.15-2\nDescription: shell\n",
        ))
        .unwrap();
        let index_entries = lists::parse_index(std::io::Cursor::new(
            "Package: bash\nVersion: 5.2.15-2\nDescription: shell\n\nPackage: bash\nVersion: 5.2.21-1\nDescription: shell\n",
        ))
        .unwrap();
        let packages = build_snapshot(status_entries, index_entries);

        let bash = &packages["bash"];
        assert_eq!(bash.candidate.as_ref().unwrap().version.full, "5.2.21-1");
        assert!(bash.candidate.as_ref().unwrap().downloadable);
        assert!(bash.installed.as_ref().unwrap().downloadable);
    }

    #[test]
    fn test_reload_from_fixture_tree() {
        let dir = tempfile::tempdir().unwrap();
        let status_file = dir.path().join("status");
        let lists_dir = dir.path().join("lists");
        std::fs::write(&status_file, STATUS).unwrap();
        std::fs::create_dir(&lists_dir).unwrap();
        std::fs::write(lists_dir.join("mirror_dists_main_binary-amd64_Packages"), INDEX).unwrap();

        let mut db = AptDatabase::with_config(AptConfig {
            status_file,
            lists_dir,
        })
        .unwrap();
        db.reload().unwrap();

        assert_eq!(db.package_count(), 5);
        assert!(db.get("bash").unwrap().is_downloadable());
        assert!(!db.get("stale-tool").unwrap().is_downloadable());
        assert!(db.get("missing").is_none());
    }

    #[test]
    fn test_missing_status_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = AptDatabase::with_config(AptConfig {
            status_file: dir.path().join("nonexistent"),
            lists_dir: dir.path().to_path_buf(),
        });
        assert!(matches!(result, Err(Error::DatabaseError(_))));
    }
}
