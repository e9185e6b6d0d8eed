//! Action dispatch.
//!
//! Each command-line action maps to one handler. Arguments are parsed
//! before the file is touched, so a bad token never causes partial I/O.

use std::io::Write;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::{OmnidatError, Result};
use crate::pipeline::Summary;
use crate::query::{Query, parse_assignment};
use crate::record::Record;
use crate::render::render;
use crate::store::Store;

/// Supported actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Print matching records.
    List,
    /// Append one record.
    Add,
    /// Rewrite the file keeping only matching records.
    Trim,
    /// Rewrite the file dropping matching records.
    Remove,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::List, Action::Add, Action::Trim, Action::Remove];

    pub fn name(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Add => "add",
            Action::Trim => "trim",
            Action::Remove => "remove",
        }
    }
}

/// Case-insensitive.
impl FromStr for Action {
    type Err = OmnidatError;

    fn from_str(s: &str) -> Result<Self> {
        Action::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| OmnidatError::UnknownAction(s.to_string()))
    }
}

/// Per-invocation switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// On add, set `_id` to the number of records already in the file.
    pub assign_id: bool,
}

/// Run `action` against `store`. `list` output goes to `out`.
pub fn execute<S, W>(
    store: &Store,
    action: Action,
    args: &[S],
    options: &Options,
    out: &mut W,
) -> Result<Summary>
where
    S: AsRef<str>,
    W: Write,
{
    debug!(action = action.name(), args = args.len(), path = %store.path().display(), "executing");
    match action {
        Action::List => run_list(store, args, out),
        Action::Add => run_add(store, args, options),
        Action::Trim => run_rewrite(store, action, args),
        Action::Remove => run_rewrite(store, action, args),
    }
}

fn run_list<S: AsRef<str>, W: Write>(store: &Store, args: &[S], out: &mut W) -> Result<Summary> {
    let query = Query::parse(args)?;
    let summary = store.list(&query, |record| {
        if let Some(line) = render(&record, query.keys()) {
            writeln!(out, "{line}")?;
        }
        Ok(())
    })?;
    out.flush()?;
    Ok(summary)
}

fn run_add<S: AsRef<str>>(store: &Store, args: &[S], options: &Options) -> Result<Summary> {
    let mut record = Record::new();
    for token in args {
        let (key, value) = parse_assignment(token.as_ref())?;
        record.insert(key, value);
    }
    if record.is_empty() {
        return Err(OmnidatError::EmptyRecord);
    }
    let read = if options.assign_id {
        let existing = store.count()?;
        record.set("_id", i64::try_from(existing).unwrap_or(i64::MAX));
        existing
    } else {
        0
    };
    let kept = store.add(&[record])?;
    Ok(Summary { read, kept })
}

fn run_rewrite<S: AsRef<str>>(store: &Store, action: Action, args: &[S]) -> Result<Summary> {
    let query = Query::parse(args)?;
    if !query.keys().is_empty() {
        warn!(
            action = action.name(),
            keys = ?query.keys(),
            "projection keys do not apply to rewrites, whole records are kept"
        );
    }
    match action {
        Action::Remove => store.remove(&query),
        _ => store.trim(&query),
    }
}
