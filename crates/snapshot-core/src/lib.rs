//! Core types for the tweet snapshot tools.
//!
//! Holds the canonical record model, the three provider normalizers and the
//! rules used to pick among them, the client allowlist, date helpers, the
//! reporting interface and CLI settings.

pub mod clients;
pub mod error;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod report;
pub mod settings;
pub mod time_utils;
