//! # omnidat
//!
//! A loose, line-oriented record store.
//!
//! Every line of a data file is one record written as space-separated
//! `key=literal` tokens:
//!
//! ```text
//! id=1 title='Fix the build' status='open' tag='ci' tag='urgent'
//! id=2 title="Ann's report" status='closed' done=True
//! ```
//!
//! ## Overview
//!
//! - **Codec**: [`Record::decode`] and [`Record::encode`] convert between a
//!   line and a [`Record`]. Values are integers, booleans, quoted strings,
//!   or lists built by repeating a key.
//! - **Queries**: [`Query::parse`] reads command-line tokens: bare keys
//!   choose printed fields, `key=value` keeps matching records, and
//!   `key^value` drops them.
//! - **Pipeline**: [`Pipeline`] pulls records from a source one at a time
//!   through a filter stage and then an exclude stage.
//! - **Store**: [`Store`] streams a file into a pipeline, appends records,
//!   and rewrites the file for trim and remove.
//!
//! ## Example
//!
//! ```
//! use omnidat::{Pipeline, Record, Value};
//!
//! let lines = [
//!     "id=1 status='open' owner='ann'",
//!     "id=2 status='open' owner='bob'",
//!     "id=3 status='closed' owner='ann'",
//! ];
//!
//! let result: Vec<Record> = Pipeline::new(lines.iter().map(|l| Record::decode(l)))
//!     .filter("status", "open")
//!     .exclude("owner", "bob")
//!     .into_iter()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//!
//! assert_eq!(result.len(), 1);
//! assert_eq!(result[0].get("id"), Some(&Value::Int(1)));
//! ```

pub mod error;
pub mod executor;
pub mod grammar;
pub mod pipeline;
pub mod query;
pub mod record;
pub mod render;
pub mod stage;
pub mod store;
pub mod value;

pub use error::{OmnidatError, Result};
pub use executor::{Action, Options, execute};
pub use grammar::{Delim, Token};
pub use pipeline::{Pipeline, Stages, Summary};
pub use query::{Query, Term};
pub use record::Record;
pub use render::render;
pub use stage::{ExcludeStage, FilterStage, Stage, Staged};
pub use store::{Records, Store};
pub use value::Value;
