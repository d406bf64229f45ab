//! Utility modules.

/// Date/time serialization and vendor timestamp parsing.
pub mod datetime;

/// Log sanitization utilities to prevent credential exposure.
pub mod log_sanitizer;
