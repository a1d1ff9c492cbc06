//! Profile tests
//!
//! - logind schema, value loading and saves
//! - Keybind rows and commits
//! - Theme switcher, including the empty registry
