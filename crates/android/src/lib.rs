//! Android-specific tools for apkbuilder
//!
//! - Build types and the artifacts they produce
//! - Gradle wrapper integration for local builds

#![warn(missing_docs)]

pub mod gradle;

pub use gradle::BuildType;
