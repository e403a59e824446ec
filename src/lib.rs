//! clientkit - record merging and client environment detection
//!
//! This crate ties together the `clientkit-merge` and `clientkit-env`
//! libraries with layered configuration, JSON document handling, and
//! explain output used by the `clientkit` command-line tool.

pub mod config;
pub mod document;
pub mod explain;

pub use clientkit_env::{
    classify, probe, EnvironmentClassification, HostEnvironment, PlatformFamily, StaticHost,
};
pub use clientkit_merge::{extend, ArrayMerge, MergeError, MergeOptions, Merger, Record, Value};
pub use config::{ConfigError, EffectiveConfig};
pub use document::DocumentError;
pub use explain::ExplainOutput;
