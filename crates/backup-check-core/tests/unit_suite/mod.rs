//! Unit tests for backup-check-core.

pub mod helpers;
pub mod http;
pub mod validation;
