//! CLI utilities for apkbuilder
//!
//! Provides shared CLI functionality:
//! - Global arguments
//! - Terminal output formatting
//! - Progress display for remote builds

#![warn(missing_docs)]

pub mod args;
pub mod output;
pub mod progress;
pub mod sink;

pub use args::GlobalArgs;
pub use sink::TerminalSink;
