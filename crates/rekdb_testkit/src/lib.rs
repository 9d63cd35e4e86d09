//! # rekdb Testkit
//!
//! Test utilities for rekdb.
//!
//! This crate provides:
//! - Test fixtures and database helpers
//! - Sample clients and machines
//! - Property-based test generators using proptest
//! - A storage backend with injectable write failures
//!
//! ## Usage
//!
//! ```rust
//! use rekdb_testkit::prelude::*;
//!
//! with_temp_db(|db| {
//!     assert_eq!(db.count("clients").unwrap(), 0);
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;
pub mod samples;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::samples::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
pub use samples::*;
