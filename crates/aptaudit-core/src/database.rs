//! The package database seam.
//!
//! The reporter never talks to APT directly; it goes through this trait so
//! the pipeline can be exercised against an in-memory fake.

use crate::error::Result;
use crate::package::Package;

/// A read-only snapshot of every package known to the system.
///
/// Implementations own the lifecycle: `refresh` rebuilds the underlying index
/// from configured sources and loads the snapshot, after which the query
/// methods operate on in-memory state only.
pub trait PackageDatabase {
    /// Rebuilds the index from configured sources and reloads the snapshot.
    fn refresh(&mut self) -> Result<()>;

    /// Total number of packages in the snapshot.
    fn package_count(&self) -> usize;

    /// Name-keyed lookup.
    fn get(&self, name: &str) -> Option<&Package>;

    /// Iterates over all packages in the snapshot, in no particular order.
    fn packages(&self) -> Box<dyn Iterator<Item = &Package> + '_>;
}

/// A view of a database restricted to packages matching a predicate.
pub struct FilteredView<'a, D: PackageDatabase + ?Sized> {
    db: &'a D,
    filter: Box<dyn Fn(&Package) -> bool + 'a>,
}

impl<'a, D: PackageDatabase + ?Sized> FilteredView<'a, D> {
    /// Creates a view over `db` containing only packages accepted by `filter`.
    pub fn new(db: &'a D, filter: impl Fn(&Package) -> bool + 'a) -> Self {
        Self {
            db,
            filter: Box::new(filter),
        }
    }

    /// Number of packages matching the filter.
    pub fn len(&self) -> usize {
        self.packages().count()
    }

    /// Whether no package matches the filter.
    pub fn is_empty(&self) -> bool {
        self.packages().next().is_none()
    }

    /// Name-keyed lookup, restricted to the filter.
    pub fn get(&self, name: &str) -> Option<&'a Package> {
        self.db.get(name).filter(|pkg| (self.filter)(pkg))
    }

    /// Iterates over the packages matching the filter.
    pub fn packages(&self) -> impl Iterator<Item = &'a Package> + '_ {
        self.db.packages().filter(|pkg| (self.filter)(pkg))
    }
}
