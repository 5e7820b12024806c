//! Core types and traits for aptaudit.
//!
//! This crate provides the foundational abstractions shared by the APT
//! snapshot backend and the reporter.

pub mod database;
pub mod error;
pub mod package;

pub use database::{FilteredView, PackageDatabase};
pub use error::{Error, Result};
pub use package::{Package, Version, VersionRecord};
