//! File handling layer for the tweet snapshot tools.
//!
//! Selects the raw files and archive members of a date window, normalizes
//! them into per-file snapshots, and merges the snapshots of two collection
//! periods into the cleaned corpus.

pub mod archive;
pub mod builder;
pub mod merger;
pub mod selector;
pub mod writer;

#[cfg(test)]
mod testing;
