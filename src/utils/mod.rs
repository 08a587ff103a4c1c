//! Utility functions and helpers

pub mod version;
