#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(any(feature = "std", test)), no_std)]

extern crate alloc;

/// The open-addressing table itself.
///
/// This module provides [`BucketTable`], a string-keyed table with linear
/// probing, quarter-load growth and tombstone-free removal.
pub mod bucket_table;

mod error;

pub mod hash;

#[cfg(test)]
mod logger;

pub mod stats;

mod value;

pub use bucket_table::BucketTable;
pub use error::TableError;
pub use stats::TableStats;
pub use value::Primitive;
pub use value::Value;
