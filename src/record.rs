//! Record type and the line codec.
//!
//! A record is an insertion-ordered mapping from key to [`Value`]. On disk
//! a record is one line of `key=literal` tokens separated by spaces; a key
//! that appears more than once holds a list.

use std::fmt;
use std::iter;
use std::str::FromStr;

use crate::error::{OmnidatError, Result};
use crate::grammar::{self, Delim};
use crate::value::Value;

/// One decoded line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    key: String,
    value: Value,
    /// The delimiter each scalar of `value` was written with, in order.
    delims: Vec<Delim>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one line.
    ///
    /// Every token must carry a value that parses as a literal; a single
    /// bad token fails the whole line with [`OmnidatError::MalformedValue`].
    /// A blank line decodes to an empty record. Each token's delimiter is
    /// kept and written back by [`Record::encode`].
    pub fn decode(line: &str) -> Result<Record> {
        let mut record = Record::new();
        for token in grammar::tokens(line) {
            let value = token.value.and_then(Value::from_literal).ok_or_else(|| {
                OmnidatError::MalformedValue {
                    key: token.key.to_string(),
                    text: unparsed_text(&token).to_string(),
                    line: None,
                }
            })?;
            let delim = token.delim.unwrap_or(Delim::Filter);
            record.append(token.key.to_string(), delim, value);
        }
        Ok(record)
    }

    /// Encode as one line, without the trailing newline.
    ///
    /// List values are written as one `key=literal` token per element.
    /// An empty list writes nothing; [`Record::validate`] rejects it.
    pub fn encode(&self) -> String {
        let mut terms = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            for (scalar, delim) in field.value.scalars().zip(&field.delims) {
                terms.push(format!(
                    "{}{}{}",
                    field.key,
                    delim.as_char(),
                    scalar.to_literal()
                ));
            }
        }
        terms.join(" ")
    }

    /// Check that every field survives [`Record::encode`] and decodes back
    /// unchanged.
    pub fn validate(&self) -> Result<()> {
        for field in &self.fields {
            let reason = if !grammar::is_key(&field.key) {
                "keys may only hold letters, digits, '_' and '-'"
            } else if matches!(&field.value, Value::List(items) if items.is_empty()) {
                "an empty list has no stored form"
            } else {
                continue;
            };
            return Err(OmnidatError::UnstorableField {
                key: field.key.clone(),
                reason,
            });
        }
        Ok(())
    }

    /// Add a field. If the key is already present its value becomes a
    /// list and `value` is appended to it.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.append(key.into(), Delim::Filter, value.into());
    }

    /// Set a field, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value: Value = value.into();
        let value = value.normalize();
        let delims = vec![Delim::Filter; value.scalars().len()];
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => {
                field.value = value;
                field.delims = delims;
            }
            None => self.fields.push(Field { key, value, delims }),
        }
    }

    fn append(&mut self, key: String, delim: Delim, value: Value) {
        let value = value.normalize();
        let added = value.scalars().len();
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => {
                field.value.push(value);
                field.delims.extend(iter::repeat_n(delim, added));
            }
            None => self.fields.push(Field {
                key,
                value,
                delims: vec![delim; added],
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| &f.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|f| (f.key.as_str(), &f.value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The text shown for a value that did not parse. When the grammar matched
/// no value at all (an unterminated quote, say) this is what follows the
/// delimiter up to the end of the line.
fn unparsed_text<'a>(token: &grammar::Token<'a>) -> &'a str {
    match (token.value, token.delim) {
        (Some(text), _) => text,
        (None, Some(_)) if !token.rest.starts_with(char::is_whitespace) => {
            token.rest.trim_end()
        }
        (None, _) => "",
    }
}

impl FromStr for Record {
    type Err = OmnidatError;

    fn from_str(line: &str) -> Result<Self> {
        Record::decode(line)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
