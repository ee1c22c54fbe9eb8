//! Field path parsing

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use super::FieldPathError;

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object field name
    Field(String),
    /// Array index
    Index(usize),
}

impl Segment {
    /// Name of the container this segment steps into
    pub(crate) fn container(&self) -> &'static str {
        match self {
            Segment::Field(_) => "an object",
            Segment::Index(_) => "an array",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => f.write_str(name),
            Segment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Parse a field path into its segments
///
/// # Errors
///
/// Returns `InvalidPath` for an empty path, empty field names (`a..b`,
/// leading or trailing dots), unbalanced brackets, or empty brackets.
pub fn parse(path: &str) -> Result<Vec<Segment>, FieldPathError> {
    let invalid = |reason: &str| FieldPathError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut after_bracket = false;
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if current.is_empty() && !after_bracket {
                    return Err(invalid("empty field name"));
                }
                if !current.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut current)));
                }
                match chars.peek() {
                    None => return Err(invalid("trailing '.'")),
                    Some('[') => return Err(invalid("'[' cannot follow '.'")),
                    _ => {}
                }
                after_bracket = false;
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(Segment::Field(std::mem::take(&mut current)));
                } else if segments.is_empty() {
                    return Err(invalid("path cannot start with '['"));
                }
                segments.push(bracketed(&mut chars).map_err(invalid)?);
                match chars.peek() {
                    None | Some('.') | Some('[') => {}
                    Some(_) => return Err(invalid("expected '.' or '[' after ']'")),
                }
                after_bracket = true;
            }
            ']' => return Err(invalid("unexpected ']'")),
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        segments.push(Segment::Field(current));
    }
    if segments.is_empty() {
        return Err(invalid("path is empty"));
    }
    Ok(segments)
}

/// Parse the inside of `[...]`; the opening bracket is already consumed
fn bracketed(chars: &mut Peekable<Chars<'_>>) -> Result<Segment, &'static str> {
    if let Some(quote @ ('"' | '\'')) = chars.peek().copied() {
        chars.next();
        let mut key = String::new();
        loop {
            match chars.next() {
                Some(c) if c == quote => break,
                Some(c) => key.push(c),
                None => return Err("unterminated quoted key"),
            }
        }
        return match chars.next() {
            Some(']') => Ok(Segment::Field(key)),
            _ => Err("expected ']' after quoted key"),
        };
    }

    let mut inner = String::new();
    loop {
        match chars.next() {
            Some(']') => break,
            Some('[') => return Err("nested '['"),
            Some(c) => inner.push(c),
            None => return Err("unterminated '['"),
        }
    }
    if inner.is_empty() {
        return Err("empty brackets");
    }
    if inner.bytes().all(|b| b.is_ascii_digit()) {
        return inner
            .parse::<usize>()
            .map(Segment::Index)
            .map_err(|_| "array index too large");
    }
    Ok(Segment::Field(inner))
}
