//! Predicate stages and the iterator adaptor that chains them.
//!
//! A stage decides, one record at a time, whether the record continues
//! downstream. [`Staged`] wraps an upstream iterator of decoded records
//! and pulls from it until the stage accepts a record, so a chain of
//! stages reads the backing file only as fast as the consumer pulls.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::record::Record;
use crate::value::Value;

/// A record-at-a-time predicate stage.
pub trait Stage {
    /// Should `record` be passed downstream?
    fn accepts(&self, record: &Record) -> bool;

    /// The display name of this stage.
    fn name(&self) -> &str;
}

/// Keeps records where every `key == value` pair holds.
///
/// Setting a key twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterStage {
    predicates: BTreeMap<String, Value>,
}

impl FilterStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.predicates.insert(key.into(), value.into());
    }

    pub fn predicates(&self) -> &BTreeMap<String, Value> {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl Stage for FilterStage {
    fn accepts(&self, record: &Record) -> bool {
        self.predicates
            .iter()
            .all(|(k, v)| record.get(k) == Some(v))
    }

    fn name(&self) -> &str {
        "FILTER"
    }
}

/// Drops records where any `key == value` pair holds.
///
/// Setting a key twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExcludeStage {
    predicates: BTreeMap<String, Value>,
}

impl ExcludeStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.predicates.insert(key.into(), value.into());
    }

    pub fn predicates(&self) -> &BTreeMap<String, Value> {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl Stage for ExcludeStage {
    fn accepts(&self, record: &Record) -> bool {
        !self
            .predicates
            .iter()
            .any(|(k, v)| record.get(k) == Some(v))
    }

    fn name(&self) -> &str {
        "EXCLUDE"
    }
}

/// Iterator adaptor running one stage over an upstream of decoded records.
///
/// Errors from upstream are passed through untouched.
pub struct Staged<I, S> {
    upstream: I,
    stage: S,
}

impl<I, S> Staged<I, S> {
    pub fn new(upstream: I, stage: S) -> Self {
        Self { upstream, stage }
    }
}

impl<I, S> Iterator for Staged<I, S>
where
    I: Iterator<Item = Result<Record>>,
    S: Stage,
{
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let stage = &self.stage;
        self.upstream.find(|item| match item {
            Ok(record) => stage.accepts(record),
            Err(_) => true,
        })
    }
}
