//! UI tests
//!
//! - Byte stream decoding (keys, mouse reports, signals)
//! - Line editor
//! - Frame layout and hitboxes
//! - Router flows driven by scripted events

#[cfg(test)]
mod app_tests;
