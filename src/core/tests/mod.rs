//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Conflict detection and the pending edit stack
//! - Item adjustment, cycling and reset
//! - Bind line parsing and flag correction
//! - Scroll window clamping
//! - Type tests (KeyCombo, BindLine, etc.)

#[cfg(test)]
mod conflict_tests;
