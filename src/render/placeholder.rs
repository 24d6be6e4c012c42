//! The `{{ name | filter }}` placeholder grammar.
//!
//! ```text
//! placeholder = "{{" ws* ident ws* ( "|" ws* ident ws* )* "}}"
//! ident       = [A-Za-z_] [A-Za-z0-9_]*
//! ws          = " " | "\t"
//! ```
//!
//! Text that does not match the grammar is left alone, so stray `{{`, JSON
//! braces or another engine's `{{ a + b }}` pass through untouched. Scanning
//! works on bytes: text templates are not required to be valid UTF-8.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::bindings::VariableBindings;

const OPEN: &[u8] = b"{{";
const CLOSE: &[u8] = b"}}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub name: &'a str,
    pub filters: Vec<&'a str>,
    /// Byte range of the whole token, braces included.
    pub span: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// `com.example.app` -> `com/example/app`
    Path,
    Upper,
    Lower,
}

impl Filter {
    pub fn apply(self, value: &str) -> String {
        match self {
            Filter::Path => value.replace('.', "/"),
            Filter::Upper => value.to_uppercase(),
            Filter::Lower => value.to_lowercase(),
        }
    }
}

impl FromStr for Filter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Filter::Path),
            "upper" => Ok(Filter::Upper),
            "lower" => Ok(Filter::Lower),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubstitutionError {
    Unresolved(String),
    UnknownFilter(String),
}

impl fmt::Display for SubstitutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubstitutionError::Unresolved(name) => write!(f, "unresolved placeholder '{name}'"),
            SubstitutionError::UnknownFilter(filter) => write!(f, "unknown filter '{filter}'"),
        }
    }
}

/// Iterate over every well-formed placeholder in `input`, in order.
pub fn placeholders(input: &[u8]) -> Placeholders<'_> {
    Placeholders { input, pos: 0 }
}

pub struct Placeholders<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Placeholders<'a> {
    type Item = Placeholder<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(offset) = find(&self.input[self.pos..], OPEN) {
            let start = self.pos + offset;
            match parse_at(self.input, start) {
                Some(placeholder) => {
                    self.pos = placeholder.span.end;
                    return Some(placeholder);
                }
                // Not a placeholder; retry from the next byte so `{{{name}}}` still matches
                None => self.pos = start + 1,
            }
        }
        self.pos = self.input.len();
        None
    }
}

/// Replace every placeholder in `input` with its bound (and filtered) value.
///
/// Fails on the first placeholder that cannot be resolved.
pub fn substitute(
    input: &[u8],
    bindings: &VariableBindings,
) -> Result<Vec<u8>, SubstitutionError> {
    let mut output = Vec::with_capacity(input.len());
    let mut last = 0;

    for placeholder in placeholders(input) {
        output.extend_from_slice(&input[last..placeholder.span.start]);
        output.extend_from_slice(resolve(&placeholder, bindings)?.as_bytes());
        last = placeholder.span.end;
    }
    output.extend_from_slice(&input[last..]);

    Ok(output)
}

/// [`substitute`] for text that is known to be UTF-8, such as paths.
pub fn substitute_str(
    input: &str,
    bindings: &VariableBindings,
) -> Result<String, SubstitutionError> {
    let bytes = substitute(input.as_bytes(), bindings)?;
    // Splicing &str values into &str input keeps it valid UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn resolve(
    placeholder: &Placeholder<'_>,
    bindings: &VariableBindings,
) -> Result<String, SubstitutionError> {
    let value = bindings
        .get(placeholder.name)
        .ok_or_else(|| SubstitutionError::Unresolved(placeholder.name.to_string()))?;

    placeholder
        .filters
        .iter()
        .try_fold(value.to_string(), |acc, name| {
            let filter = Filter::from_str(name)
                .map_err(|_| SubstitutionError::UnknownFilter(name.to_string()))?;
            Ok(filter.apply(&acc))
        })
}

fn parse_at(input: &[u8], start: usize) -> Option<Placeholder<'_>> {
    let mut cursor = Cursor {
        input,
        pos: start + OPEN.len(),
    };

    cursor.skip_ws();
    let name = cursor.ident()?;
    cursor.skip_ws();

    let mut filters = Vec::new();
    while cursor.eat(b'|') {
        cursor.skip_ws();
        filters.push(cursor.ident()?);
        cursor.skip_ws();
    }

    if !input[cursor.pos..].starts_with(CLOSE) {
        return None;
    }

    Some(Placeholder {
        name,
        filters,
        span: start..cursor.pos + CLOSE.len(),
    })
}

struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            _ => return None,
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        std::str::from_utf8(&self.input[start..self.pos]).ok()
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
