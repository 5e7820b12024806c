//! APT snapshot backend for aptaudit.
//!
//! Builds an in-memory [`aptaudit_core::PackageDatabase`] from the files APT
//! itself maintains: the dpkg status file and the downloaded package indexes.

pub mod backend;
pub mod lists;
pub mod status;

pub use backend::{AptConfig, AptDatabase};
