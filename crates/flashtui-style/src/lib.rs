#![forbid(unsafe_code)]

//! Style: the tag table that gives markup tags their terminal attributes.

pub mod tag_table;

pub use tag_table::TagTable;
