//! Lazy filter/exclude pipeline over a stream of decoded records.
//!
//! A pipeline is a source plus one [`FilterStage`] and one
//! [`ExcludeStage`]. Repeated `filter`/`exclude` calls fold into those two
//! stages, and records always flow source → filter → exclude no matter
//! the order the predicates were added in.

use std::fmt;

use tracing::debug;

use crate::error::Result;
use crate::query::Query;
use crate::record::Record;
use crate::stage::{ExcludeStage, FilterStage, Stage, Staged};
use crate::value::Value;

/// The iterator a pipeline turns into.
pub type Stages<I> = Staged<Staged<I, FilterStage>, ExcludeStage>;

/// Counts reported by a terminal operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Records pulled from the source.
    pub read: usize,
    /// Records handed to the consumer or written back.
    pub kept: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in -> {} out", self.read, self.kept)
    }
}

/// A source of decoded records narrowed by filter and exclude predicates.
pub struct Pipeline<I> {
    source: I,
    filter: FilterStage,
    exclude: ExcludeStage,
}

impl<I> Pipeline<I>
where
    I: Iterator<Item = Result<Record>>,
{
    pub fn new(source: I) -> Self {
        Self {
            source,
            filter: FilterStage::new(),
            exclude: ExcludeStage::new(),
        }
    }

    /// Keep only records where `key == value`.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.set(key, value);
        self
    }

    /// Drop records where `key == value`.
    pub fn exclude(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.exclude.set(key, value);
        self
    }

    /// Apply every predicate of a parsed query.
    pub fn with_query(mut self, query: &Query) -> Self {
        for (k, v) in query.filter_stage().predicates() {
            self.filter.set(k.clone(), v.clone());
        }
        for (k, v) in query.exclude_stage().predicates() {
            self.exclude.set(k.clone(), v.clone());
        }
        self
    }

    /// Hand each surviving record to `sink`, one at a time.
    ///
    /// Stops at the first decode error or sink error. Nothing is buffered,
    /// and lines after the point where iteration stops are never read.
    pub fn stream<F>(self, mut sink: F) -> Result<Summary>
    where
        F: FnMut(Record) -> Result<()>,
    {
        let Pipeline {
            source,
            filter,
            exclude,
        } = self;
        for (stage, predicates) in [
            (filter.name(), filter.predicates().len()),
            (exclude.name(), exclude.predicates().len()),
        ] {
            debug!(stage, predicates, "streaming");
        }
        let mut read = 0;
        let mut kept = 0;
        {
            let counted = source.inspect(|item| {
                if item.is_ok() {
                    read += 1;
                }
            });
            for item in Staged::new(Staged::new(counted, filter), exclude) {
                sink(item?)?;
                kept += 1;
            }
        }
        Ok(Summary { read, kept })
    }

    /// Drain the source and return the records the predicates approve.
    pub fn collect_approved(self) -> Result<(Vec<Record>, Summary)> {
        self.partition_into(false)
    }

    /// Drain the source and return the records the predicates reject.
    pub fn collect_rejected(self) -> Result<(Vec<Record>, Summary)> {
        self.partition_into(true)
    }

    fn partition_into(self, invert: bool) -> Result<(Vec<Record>, Summary)> {
        let Pipeline {
            source,
            filter,
            exclude,
        } = self;
        let mut records = Vec::new();
        let mut read = 0;
        for item in source {
            let record = item?;
            read += 1;
            if approves(&filter, &exclude, &record) != invert {
                records.push(record);
            }
        }
        let summary = Summary {
            read,
            kept: records.len(),
        };
        Ok((records, summary))
    }
}

fn approves(filter: &FilterStage, exclude: &ExcludeStage, record: &Record) -> bool {
    filter.accepts(record) && exclude.accepts(record)
}

impl<I> IntoIterator for Pipeline<I>
where
    I: Iterator<Item = Result<Record>>,
{
    type Item = Result<Record>;
    type IntoIter = Stages<I>;

    fn into_iter(self) -> Self::IntoIter {
        Staged::new(Staged::new(self.source, self.filter), self.exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OmnidatError;

    fn source(lines: &[&str]) -> std::vec::IntoIter<Result<Record>> {
        lines
            .iter()
            .map(|l| Record::decode(l))
            .collect::<Vec<_>>()
            .into_iter()
    }

    fn ids<I: IntoIterator<Item = Result<Record>>>(records: I) -> Vec<i64> {
        records
            .into_iter()
            .map(|r| match r.unwrap().get("id") {
                Some(Value::Int(n)) => *n,
                other => panic!("no id: {other:?}"),
            })
            .collect()
    }

    const TWO: [&str; 2] = ["status='open' id=1", "status='closed' id=2"];
    const THREE: [&str; 3] = [
        "status='open' owner='a' id=1",
        "status='open' owner='b' id=2",
        "status='closed' owner='a' id=3",
    ];

    #[test]
    fn test_filter_semantics() {
        let p = Pipeline::new(source(&TWO)).filter("status", "open");
        assert_eq!(ids(p), vec![1]);
    }

    #[test]
    fn test_exclude_semantics() {
        let p = Pipeline::new(source(&TWO)).exclude("status", "closed");
        assert_eq!(ids(p), vec![1]);
        let p = Pipeline::new(source(&TWO)).exclude("status", "open");
        assert_eq!(ids(p), vec![2]);
    }

    #[test]
    fn test_filter_then_exclude() {
        let p = Pipeline::new(source(&THREE))
            .filter("status", "open")
            .exclude("owner", "b");
        assert_eq!(ids(p), vec![1]);
    }

    #[test]
    fn test_composition_order_does_not_matter() {
        let a = Pipeline::new(source(&THREE))
            .exclude("owner", "b")
            .filter("status", "open");
        let b = Pipeline::new(source(&THREE))
            .filter("status", "open")
            .exclude("owner", "b");
        assert_eq!(ids(a), ids(b));
    }

    #[test]
    fn test_repeated_filter_same_key_last_wins() {
        let p = Pipeline::new(source(&TWO))
            .filter("status", "open")
            .filter("status", "closed");
        assert_eq!(ids(p), vec![2]);
    }

    #[test]
    fn test_no_predicates_yields_everything() {
        assert_eq!(ids(Pipeline::new(source(&THREE))), vec![1, 2, 3]);
    }

    #[test]
    fn test_with_query() {
        let q = Query::parse(&["status=open", "owner^b"]).unwrap();
        let p = Pipeline::new(source(&THREE)).with_query(&q);
        assert_eq!(ids(p), vec![1]);
    }

    #[test]
    fn test_stream_counts_and_stops_on_error() {
        let upstream = vec![
            Record::decode("id=1"),
            Record::decode("id=2"),
            Record::decode("x=\"broken"),
            Record::decode("id=4"),
        ];
        let mut seen = Vec::new();
        let err = Pipeline::new(upstream.into_iter())
            .stream(|r| {
                seen.push(r);
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, OmnidatError::MalformedValue { .. }));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_stream_summary() {
        let summary = Pipeline::new(source(&THREE))
            .filter("owner", "a")
            .stream(|_| Ok(()))
            .unwrap();
        assert_eq!(summary, Summary { read: 3, kept: 2 });
        assert_eq!(summary.to_string(), "3 in -> 2 out");
    }

    #[test]
    fn test_laziness_pulls_only_what_is_consumed() {
        let mut pulled = 0;
        let upstream = source(&THREE).inspect(|_| pulled += 1);
        let first = Pipeline::new(upstream)
            .filter("owner", "a")
            .into_iter()
            .next();
        assert!(first.is_some());
        assert_eq!(pulled, 1);
    }

    #[test]
    fn test_approved_and_rejected_are_complementary() {
        let (kept, s1) = Pipeline::new(source(&THREE))
            .filter("status", "open")
            .exclude("owner", "b")
            .collect_approved()
            .unwrap();
        let (dropped, s2) = Pipeline::new(source(&THREE))
            .filter("status", "open")
            .exclude("owner", "b")
            .collect_rejected()
            .unwrap();
        assert_eq!(kept.len() + dropped.len(), 3);
        assert_eq!(s1.read, 3);
        assert_eq!(s2.kept, 2);
        assert!(kept.iter().all(|r| !dropped.contains(r)));
    }

    #[test]
    fn test_collect_fails_on_malformed_line() {
        let upstream = vec![Record::decode("id=1"), Record::decode("x='oops")];
        assert!(Pipeline::new(upstream.into_iter()).collect_approved().is_err());
    }
}
