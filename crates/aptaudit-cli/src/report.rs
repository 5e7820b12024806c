//! The package availability reporter.
//!
//! A single linear pass: refresh the database, filter to installed packages,
//! apply the downloadability predicate, sort by name, print.

use aptaudit_core::{FilteredView, Package, PackageDatabase, Result};
use std::io::Write;

/// Normal completion, with or without matches.
pub const EXIT_OK: i32 = 0;
/// No cached packages, or no installed packages.
pub const EXIT_NO_DATA: i32 = 1;

/// Runs the audit against `db`, writing the report to `out`.
///
/// Returns the process exit code. Database errors propagate to the caller.
pub fn run<D, W>(db: &mut D, silent: bool, out: &mut W) -> Result<i32>
where
    D: PackageDatabase + ?Sized,
    W: Write,
{
    db.refresh()?;

    let cached = db.package_count();
    if cached == 0 {
        writeln!(out, "No cached packages found.")?;
        return Ok(EXIT_NO_DATA);
    }

    let installed = FilteredView::new(&*db, Package::is_installed);
    let num_installed = installed.len();
    if num_installed == 0 {
        writeln!(out, "No installed packages found.")?;
        return Ok(EXIT_NO_DATA);
    }

    if !silent {
        writeln!(
            out,
            "Checking {} installed (of {} cached) packages...",
            num_installed, cached
        )?;
    }

    // Names are unique keys in the database, so this cannot produce
    // duplicates.
    let mut matches: Vec<&Package> = installed
        .packages()
        .filter(|pkg| !pkg.is_downloadable())
        .collect();
    matches.sort_by(|a, b| a.name.cmp(&b.name));

    print_packages(&matches, silent, out)?;
    Ok(EXIT_OK)
}

/// Prints the sorted match list.
///
/// Silent mode prints bare names only. Human-readable mode prints a count
/// header and one aligned row per match: name, installed version, summary,
/// with the first two columns padded to the widest entry.
fn print_packages<W: Write>(packages: &[&Package], silent: bool, out: &mut W) -> Result<()> {
    if silent {
        for pkg in packages {
            writeln!(out, "{}", pkg.name)?;
        }
        return Ok(());
    }

    if packages.is_empty() {
        writeln!(out)?;
        writeln!(out, "No non-downloadable packages found.")?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Found {} non-downloadable packages:", packages.len())?;
    writeln!(out)?;

    let name_width = packages.iter().map(|pkg| pkg.name.len()).max().unwrap_or(0);
    let version_width = packages
        .iter()
        .filter_map(|pkg| pkg.installed.as_ref())
        .map(|record| record.version.full.len())
        .max()
        .unwrap_or(0);

    for pkg in packages {
        // Every match is installed by construction.
        let Some(record) = &pkg.installed else {
            continue;
        };
        writeln!(
            out,
            "{:<name_width$}   {:<version_width$}   {}",
            pkg.name, record.version.full, record.summary
        )?;
    }

    Ok(())
}
