//! Field values and their literal syntax.
//!
//! A stored value is written as a literal: a decimal integer, `True` or
//! `False`, or a single- or double-quoted string with backslash escapes.
//! [`Value::from_literal`] is strict and returns `None` for anything else;
//! the caller decides whether that is an error (stored lines) or a reason
//! to fall back to the raw text (command-line predicates).

use std::fmt;

/// A decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    /// Built when a key repeats within one line. Decoding only produces
    /// lists of two or more scalars; see [`Value::normalize`].
    List(Vec<Value>),
}

impl Value {
    /// Parse a literal token. Returns `None` when the text is not a valid
    /// integer, boolean or quoted string literal.
    pub fn from_literal(text: &str) -> Option<Value> {
        match text {
            "True" | "true" => return Some(Value::Bool(true)),
            "False" | "false" => return Some(Value::Bool(false)),
            _ => {}
        }
        match text.chars().next()? {
            quote @ ('\'' | '"') => parse_quoted(text, quote).map(Value::Str),
            _ => parse_int(text).map(Value::Int),
        }
    }

    /// Render the value as a literal that [`Value::from_literal`] reads back.
    ///
    /// Lists render as `[a, b]`, which is for display only: lists are
    /// stored by repeating the key, one token per element.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Str(s) => quote(s),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::to_literal).collect();
                format!("[{}]", inner.join(", "))
            }
        }
    }

    /// Append another occurrence of the same key, promoting a scalar to a
    /// list. Appending a list appends its elements.
    pub fn push(&mut self, value: Value) {
        let mut items = match std::mem::replace(self, Value::List(Vec::new())) {
            Value::List(items) => items,
            scalar => vec![scalar],
        };
        match value.normalize() {
            Value::List(more) => items.extend(more),
            scalar => items.push(scalar),
        }
        *self = Value::List(items).normalize();
    }

    /// The shape decoding produces: nested lists are flattened and a
    /// one-element list collapses to its scalar. An empty list stays empty.
    pub fn normalize(self) -> Value {
        let Value::List(items) = self else {
            return self;
        };
        let mut flat = Vec::with_capacity(items.len());
        for item in items {
            match item.normalize() {
                Value::List(inner) => flat.extend(inner),
                scalar => flat.push(scalar),
            }
        }
        match <[Value; 1]>::try_from(flat) {
            Ok([only]) => only,
            Err(flat) => Value::List(flat),
        }
    }

    /// Iterate the scalars held by this value: itself, or each list element.
    pub fn scalars(&self) -> std::slice::Iter<'_, Value> {
        match self {
            Value::List(items) => items.iter(),
            scalar => std::slice::from_ref(scalar).iter(),
        }
    }
}

/// Strings display bare, everything else as its literal.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            other => f.write_str(&other.to_literal()),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items).normalize()
    }
}

/// Decimal integer with optional sign and `_` digit separators.
/// Leading zeros are only allowed when the number is zero.
fn parse_int(text: &str) -> Option<i64> {
    let (sign, body) = match text.as_bytes().first()? {
        b'-' => ("-", &text[1..]),
        b'+' => ("", &text[1..]),
        _ => ("", text),
    };
    if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return None;
    }
    let digits: String = body.chars().filter(|&c| c != '_').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') && digits.bytes().any(|b| b != b'0') {
        return None;
    }
    format!("{sign}{digits}").parse().ok()
}

fn parse_quoted(text: &str, quote: char) -> Option<String> {
    let inner = text.strip_prefix(quote)?.strip_suffix(quote)?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == quote {
            return None;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            'x' => out.push(hex_char(&mut chars, 2)?),
            'u' => out.push(hex_char(&mut chars, 4)?),
            'U' => out.push(hex_char(&mut chars, 8)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

fn hex_char(chars: &mut std::str::Chars<'_>, width: usize) -> Option<char> {
    let digits: String = chars.by_ref().take(width).collect();
    if digits.len() != width || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    char::from_u32(u32::from_str_radix(&digits, 16).ok()?)
}

fn quote(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xff {
                    out.push_str(&format!("\\x{code:02x}"));
                } else if code <= 0xffff {
                    out.push_str(&format!("\\u{code:04x}"));
                } else {
                    out.push_str(&format!("\\U{code:08x}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
