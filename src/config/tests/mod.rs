//! Config module tests
//!
//! - INI patching (replacement, append, idempotence)
//! - Write transactions (symlinks, permissions, temp cleanup)
//! - Keybind file loading and commits
//! - Theme registry scanning and source-line replacement

#[cfg(test)]
mod transaction_tests;
