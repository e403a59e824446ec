//! In-place record merging.
//!
//! Merges any number of source records into a destination record, left to
//! right, with optional recursion into nested records:
//! - Records: deep-merge by key when `deep` is set, otherwise replace
//! - Sequences: merge by index (default) or replace, in deep mode only
//! - Record vs sequence: merge by key and index under `ArrayMerge::Index`
//! - Scalars and `Null`: override (last wins)
//! - `Undefined`: skipped, the destination keeps its value

mod error;
mod value;

pub use error::MergeError;
pub use value::{Record, Value};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// Default nesting limit for deep merges.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// How a deep merge treats two sequences at the same key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayMerge {
    /// Element `i` of the source merges into element `i` of the destination.
    #[default]
    Index,
    /// The source sequence replaces the destination sequence.
    Replace,
}

impl fmt::Display for ArrayMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index => write!(f, "index"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for ArrayMerge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "index" => Ok(Self::Index),
            "replace" => Ok(Self::Replace),
            other => Err(format!(
                "unknown array strategy '{}' (expected 'index' or 'replace')",
                other
            )),
        }
    }
}

/// Merge settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Recurse into nested records instead of replacing them.
    #[serde(default)]
    pub deep: bool,

    /// Sequence handling in deep mode.
    #[serde(default)]
    pub arrays: ArrayMerge,

    /// Maximum nesting level a deep merge may reach.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            deep: false,
            arrays: ArrayMerge::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl MergeOptions {
    /// Shallow merge with default settings.
    pub fn shallow() -> Self {
        Self::default()
    }

    /// Deep merge with by-index sequences.
    pub fn deep() -> Self {
        Self {
            deep: true,
            ..Self::default()
        }
    }

    pub fn with_arrays(mut self, arrays: ArrayMerge) -> Self {
        self.arrays = arrays;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Record merger. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Merger {
    options: MergeOptions,
}

impl Merger {
    pub fn new(options: MergeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge `sources` into `destination`, left to right.
    ///
    /// Returns the destination it was given. The destination and every
    /// source must be records; this is checked before anything is written.
    pub fn merge<'a>(
        &self,
        destination: &'a mut Value,
        sources: &[&Value],
    ) -> Result<&'a mut Value, MergeError> {
        let records = sources
            .iter()
            .enumerate()
            .map(|(index, source)| {
                source.as_record().ok_or_else(|| {
                    MergeError::InvalidArgument(format!(
                        "source {} must be a record, got {}",
                        index,
                        source.kind()
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let dest = match &mut *destination {
            Value::Record(record) => record,
            other => {
                return Err(MergeError::InvalidArgument(format!(
                    "destination must be a record, got {}",
                    other.kind()
                )))
            }
        };

        debug!(
            deep = self.options.deep,
            arrays = %self.options.arrays,
            sources = records.len(),
            "Merging records"
        );

        for source in records {
            self.merge_record(dest, source, 0)?;
        }

        Ok(destination)
    }

    fn merge_record(&self, dest: &mut Record, src: &Record, depth: usize) -> Result<(), MergeError> {
        self.check_depth(depth)?;

        for (key, incoming) in src {
            self.merge_entry(dest, key, incoming, depth)?;
        }

        Ok(())
    }

    fn merge_sequence(
        &self,
        dest: &mut Vec<Value>,
        src: &[Value],
        depth: usize,
    ) -> Result<(), MergeError> {
        self.check_depth(depth)?;

        for (index, incoming) in src.iter().enumerate() {
            self.merge_element(dest, index, incoming, depth)?;
        }

        Ok(())
    }

    /// Source element `i` lands on key `"i"` of the destination record.
    fn merge_sequence_into_record(
        &self,
        dest: &mut Record,
        src: &[Value],
        depth: usize,
    ) -> Result<(), MergeError> {
        self.check_depth(depth)?;

        for (index, incoming) in src.iter().enumerate() {
            self.merge_entry(dest, &index.to_string(), incoming, depth)?;
        }

        Ok(())
    }

    /// Index keys of the source record land on the matching element.
    ///
    /// Keys that are not canonical indices (`"name"`, `"01"`) have no slot in
    /// a sequence and are skipped, as are indices at or past
    /// `dest.len() + src.len()`. Accepted indices apply in numeric order.
    fn merge_record_into_sequence(
        &self,
        dest: &mut Vec<Value>,
        src: &Record,
        depth: usize,
    ) -> Result<(), MergeError> {
        self.check_depth(depth)?;

        let bound = dest.len() + src.len();
        let mut slots = Vec::with_capacity(src.len());
        for (key, incoming) in src {
            match sequence_index(key) {
                Some(index) if index < bound => slots.push((index, incoming)),
                _ => trace!(key = %key, depth, "Skipping key with no sequence slot"),
            }
        }
        slots.sort_by_key(|(index, _)| *index);

        for (index, incoming) in slots {
            self.merge_element(dest, index, incoming, depth)?;
        }

        Ok(())
    }

    fn merge_entry(
        &self,
        dest: &mut Record,
        key: &str,
        incoming: &Value,
        depth: usize,
    ) -> Result<(), MergeError> {
        if incoming.is_undefined() {
            return Ok(());
        }

        if let Some(existing) = dest.get_mut(key) {
            if self.descends(existing, incoming) {
                trace!(key = %key, depth, "Descending into nested value");
                return self.merge_nested(existing, incoming, depth + 1);
            }
            *existing = incoming.clone();
        } else {
            dest.insert(key.to_string(), incoming.clone());
        }

        Ok(())
    }

    fn merge_element(
        &self,
        dest: &mut Vec<Value>,
        index: usize,
        incoming: &Value,
        depth: usize,
    ) -> Result<(), MergeError> {
        if incoming.is_undefined() {
            return Ok(());
        }

        if index >= dest.len() {
            // Skipped source slots leave holes behind.
            dest.resize(index, Value::Undefined);
            dest.push(incoming.clone());
            return Ok(());
        }

        let existing = &mut dest[index];
        if self.descends(existing, incoming) {
            trace!(index, depth, "Descending into nested element");
            self.merge_nested(existing, incoming, depth + 1)
        } else {
            *existing = incoming.clone();
            Ok(())
        }
    }

    /// The destination keeps its shape; mixed shapes merge by key and index.
    fn merge_nested(&self, existing: &mut Value, incoming: &Value, depth: usize) -> Result<(), MergeError> {
        match (existing, incoming) {
            (Value::Record(dest), Value::Record(src)) => self.merge_record(dest, src, depth),
            (Value::Sequence(dest), Value::Sequence(src)) => self.merge_sequence(dest, src, depth),
            (Value::Record(dest), Value::Sequence(src)) => {
                self.merge_sequence_into_record(dest, src, depth)
            }
            (Value::Sequence(dest), Value::Record(src)) => {
                self.merge_record_into_sequence(dest, src, depth)
            }
            (slot, incoming) => {
                *slot = incoming.clone();
                Ok(())
            }
        }
    }

    /// Whether `incoming` is merged into `existing` rather than assigned.
    ///
    /// Two records always merge in deep mode. Any pairing that involves a
    /// sequence merges only under `ArrayMerge::Index`.
    fn descends(&self, existing: &Value, incoming: &Value) -> bool {
        if !self.options.deep {
            return false;
        }
        match (existing, incoming) {
            (Value::Record(_), Value::Record(_)) => true,
            (Value::Record(_) | Value::Sequence(_), Value::Record(_) | Value::Sequence(_)) => {
                self.options.arrays == ArrayMerge::Index
            }
            _ => false,
        }
    }

    fn check_depth(&self, depth: usize) -> Result<(), MergeError> {
        if depth > self.options.max_depth {
            return Err(MergeError::RecursionLimitExceeded {
                depth,
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }
}

/// Parse a record key as a sequence index. Only canonical decimal forms
/// count, so `"01"` and `"+1"` are plain keys.
fn sequence_index(key: &str) -> Option<usize> {
    let index: usize = key.parse().ok()?;
    (index.to_string() == key).then_some(index)
}

/// Merge `sources` into `destination`, recursing when `deep` is set.
pub fn extend<'a>(
    deep: bool,
    destination: &'a mut Value,
    sources: &[&Value],
) -> Result<&'a mut Value, MergeError> {
    let options = if deep {
        MergeOptions::deep()
    } else {
        MergeOptions::shallow()
    };
    Merger::new(options).merge(destination, sources)
}

/// Fold layers into one record, first is base and last has highest precedence.
pub fn merge_layers(options: MergeOptions, layers: &[Value]) -> Result<Value, MergeError> {
    let mut merged = Value::record();
    let sources: Vec<&Value> = layers.iter().collect();
    Merger::new(options).merge(&mut merged, &sources)?;
    Ok(merged)
}
