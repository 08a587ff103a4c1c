//! Version information

/// Crate version as set in Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name and version, as logged at startup
pub fn version_banner() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), VERSION)
}
