//! Token grammar shared by stored lines and command-line predicates.
//!
//! A token is `KEY DELIM? VALUE?`:
//!
//! ```text
//! KEY   = [\w-]+
//! DELIM = [\^+=:/\\]?
//! VALUE = "(?:[^"\\]|\\.)*" | '(?:[^'\\]|\\.)*' | -\d[\d_]* | \w+
//! ```
//!
//! Characters that do not start a token (normally the separating spaces)
//! are skipped.

use lazy_static::lazy_static;
use regex::Regex;

const KEY: &str = r"([\w-]+)";
const DELIM: &str = r"([\^+=:/\\])?";
const VALUE: &str = r#"("(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|-\d[\d_]*|\w+)?"#;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(&format!("{KEY}{DELIM}{VALUE}")).unwrap();
    static ref HEAD: Regex = Regex::new(&format!("^{KEY}{DELIM}")).unwrap();
    static ref WHOLE_KEY: Regex = Regex::new(&format!("^{KEY}$")).unwrap();
}

/// The operator character between a key and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    /// `=`: keep records where the key equals the value.
    Filter,
    /// `^`: drop records where the key equals the value.
    Exclude,
    Plus,
    Colon,
    Slash,
    Backslash,
}

impl Delim {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '=' => Some(Delim::Filter),
            '^' => Some(Delim::Exclude),
            '+' => Some(Delim::Plus),
            ':' => Some(Delim::Colon),
            '/' => Some(Delim::Slash),
            '\\' => Some(Delim::Backslash),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Delim::Filter => '=',
            Delim::Exclude => '^',
            Delim::Plus => '+',
            Delim::Colon => ':',
            Delim::Slash => '/',
            Delim::Backslash => '\\',
        }
    }
}

/// One `KEY DELIM? VALUE?` match within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub key: &'a str,
    pub delim: Option<Delim>,
    /// Raw value text, quotes included.
    pub value: Option<&'a str>,
    /// The rest of the line after this token.
    pub rest: &'a str,
}

/// Scan a line for tokens, left to right.
pub fn tokens(line: &str) -> impl Iterator<Item = Token<'_>> {
    TOKEN.captures_iter(line).map(move |caps| Token {
        key: caps.get(1).map_or("", |m| m.as_str()),
        delim: caps
            .get(2)
            .and_then(|m| m.as_str().chars().next())
            .and_then(Delim::from_char),
        value: caps.get(3).map(|m| m.as_str()),
        rest: caps.get(0).map_or("", |m| &line[m.end()..]),
    })
}

/// Split a command-line token into its key, optional delimiter and the
/// remaining text after them. Returns `None` if the token does not start
/// with a key.
pub fn split_head(token: &str) -> Option<(&str, Option<Delim>, &str)> {
    let caps = HEAD.captures(token)?;
    let key = caps.get(1)?.as_str();
    let delim = caps
        .get(2)
        .and_then(|m| m.as_str().chars().next())
        .and_then(Delim::from_char);
    let end = caps.get(0)?.end();
    Some((key, delim, &token[end..]))
}

/// Does the whole string form a single key?
pub fn is_key(s: &str) -> bool {
    WHOLE_KEY.is_match(s)
}
