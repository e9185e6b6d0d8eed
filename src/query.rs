//! Command-line query expressions.
//!
//! ```text
//! omnidat FILE list name owner status=open priority^0
//!                   ^^^^^^^^^^ ^^^^^^^^^^^^^^^^^^^^^^^^^
//!                   projection predicates
//! ```
//!
//! Predicate values are parsed more loosely than stored values: text that
//! is not a valid literal is compared as a plain string, so `status=open`
//! means `status == 'open'`.

use crate::error::{OmnidatError, Result};
use crate::grammar::{self, Delim};
use crate::stage::{ExcludeStage, FilterStage};
use crate::value::Value;

/// One parsed command-line token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A bare key restricting which fields are printed.
    Projection(String),
    /// `key=value`
    Filter(String, Value),
    /// `key^value`
    Exclude(String, Value),
}

impl Term {
    pub fn parse(token: &str) -> Result<Term> {
        let (key, delim, rest) = grammar::split_head(token)
            .ok_or_else(|| malformed(token, "expected a key at the start"))?;
        let Some(delim) = delim else {
            if rest.is_empty() {
                return Ok(Term::Projection(key.to_string()));
            }
            return Err(malformed(token, "expected '=' or '^' after the key"));
        };
        let value = predicate_value(rest);
        match delim {
            Delim::Filter => Ok(Term::Filter(key.to_string(), value)),
            Delim::Exclude => Ok(Term::Exclude(key.to_string(), value)),
            other => Err(malformed(
                token,
                &format!("operator '{}' is reserved", other.as_char()),
            )),
        }
    }
}

/// Parse a predicate value: a literal if possible, the raw text otherwise.
pub fn predicate_value(text: &str) -> Value {
    Value::from_literal(text).unwrap_or_else(|| Value::Str(text.to_string()))
}

/// Parse a `key=value` assignment for adding a record.
pub fn parse_assignment(token: &str) -> Result<(String, Value)> {
    match grammar::split_head(token) {
        Some((key, Some(Delim::Filter), rest)) => Ok((key.to_string(), predicate_value(rest))),
        Some((_, Some(other), _)) => Err(malformed(
            token,
            &format!("can only add with '=', not '{}'", other.as_char()),
        )),
        Some((_, None, _)) => Err(malformed(token, "expected key=value")),
        None => Err(malformed(token, "expected a key at the start")),
    }
}

fn malformed(token: &str, reason: &str) -> OmnidatError {
    OmnidatError::MalformedPredicate {
        token: token.to_string(),
        reason: reason.to_string(),
    }
}

/// Projection keys plus accumulated filter and exclude predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    keys: Vec<String>,
    filter: FilterStage,
    exclude: ExcludeStage,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse command-line tokens. All projection keys must come before the
    /// first predicate.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Query> {
        let mut query = Query::new();
        let mut seen_predicate = false;
        for token in tokens {
            match Term::parse(token.as_ref())? {
                Term::Projection(key) if seen_predicate => {
                    return Err(OmnidatError::MisplacedProjection { key });
                }
                Term::Projection(key) => query = query.project(key),
                Term::Filter(key, value) => {
                    seen_predicate = true;
                    query = query.filter(key, value);
                }
                Term::Exclude(key, value) => {
                    seen_predicate = true;
                    query = query.exclude(key, value);
                }
            }
        }
        Ok(query)
    }

    /// Add a projection key. Repeats are ignored.
    pub fn project(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if !self.keys.contains(&key) {
            self.keys.push(key);
        }
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.set(key, value);
        self
    }

    pub fn exclude(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.exclude.set(key, value);
        self
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn filter_stage(&self) -> &FilterStage {
        &self.filter
    }

    pub fn exclude_stage(&self) -> &ExcludeStage {
        &self.exclude
    }

    pub fn has_predicates(&self) -> bool {
        !self.filter.is_empty() || !self.exclude.is_empty()
    }
}
