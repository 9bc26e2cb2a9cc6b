//! Utility helpers shared across layers.
//!
//! - [`redact`] - URL redaction for log output

pub mod redact;
