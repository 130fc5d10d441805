//! Placeholder expressions embedded in template trees.
//!
//! Grammar: `{{ path }}`, `{{ path | downcase }}` and
//! `{{ path | replace: '{{ a }}', '30' }}`; filters chain left to right.
//! Quoted filter arguments may themselves contain `{{`, `}}` and `|`.

use std::fmt;

pub const OPEN: &str = "{{";
pub const CLOSE: &str = "}}";

/// A post-processing step applied to the resolved dictionary value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Replace every occurrence of `from` with `to`.
    Replace { from: String, to: String },
    /// Lowercase the whole value.
    Downcase,
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Replace { from, to } => write!(f, "replace: '{}', '{}'", from, to),
            Filter::Downcase => write!(f, "downcase"),
        }
    }
}

/// A reference to a dictionary path plus its filter chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub path: String,
    pub filters: Vec<Filter>,
}

impl Placeholder {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", OPEN, self.path)?;
        for filter in &self.filters {
            write!(f, " | {}", filter)?;
        }
        write!(f, " {}", CLOSE)
    }
}

/// Why a template string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderError {
    /// `{{` without a matching `}}`.
    Unterminated { offset: usize },
    /// Nothing between the braces, or a filter chain without a path.
    EmptyPath,
    /// A filter name outside the supported set.
    UnknownFilter(String),
    /// A known filter with the wrong number of arguments.
    FilterArity {
        filter: String,
        expected: usize,
        found: usize,
    },
    /// A quoted argument that never closes.
    UnterminatedQuote,
}

impl fmt::Display for PlaceholderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderError::Unterminated { offset } => {
                write!(f, "unterminated placeholder starting at byte {}", offset)
            }
            PlaceholderError::EmptyPath => write!(f, "placeholder has no path"),
            PlaceholderError::UnknownFilter(name) => write!(f, "unknown filter '{}'", name),
            PlaceholderError::FilterArity {
                filter,
                expected,
                found,
            } => write!(
                f,
                "filter '{}' takes {} argument(s), found {}",
                filter, expected, found
            ),
            PlaceholderError::UnterminatedQuote => write!(f, "unterminated quoted argument"),
        }
    }
}

impl std::error::Error for PlaceholderError {}

/// A piece of a template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    /// The text between `{{` and `}}`, untrimmed.
    Expression(&'a str),
}

/// Whether a string carries at least one placeholder marker.
pub fn contains_placeholder(text: &str) -> bool {
    text.contains(OPEN)
}

/// Splits a template string into literal text and placeholder expressions.
pub fn split_segments(text: &str) -> Result<Vec<Segment<'_>>, PlaceholderError> {
    let mut segments = Vec::new();
    let mut rest = text;
    let mut consumed = 0;

    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            segments.push(Segment::Literal(&rest[..start]));
        }

        let body_start = start + OPEN.len();
        let body_len = find_close(&rest[body_start..]).ok_or(PlaceholderError::Unterminated {
            offset: consumed + start,
        })?;

        segments.push(Segment::Expression(&rest[body_start..body_start + body_len]));

        let next = body_start + body_len + CLOSE.len();
        consumed += next;
        rest = &rest[next..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }

    Ok(segments)
}

/// Byte offset of the first `}}` that is not inside a quoted argument.
fn find_close(body: &str) -> Option<usize> {
    let mut quote: Option<char> = None;

    for (i, c) in body.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if body[i..].starts_with(CLOSE) => return Some(i),
            None => {}
        }
    }

    None
}

/// Splits on `separator` outside single or double quotes.
fn split_unquoted(text: &str, separator: char) -> Result<Vec<&str>, PlaceholderError> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == separator => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            None => {}
        }
    }

    if quote.is_some() {
        return Err(PlaceholderError::UnterminatedQuote);
    }

    parts.push(&text[start..]);
    Ok(parts)
}

fn parse_argument(raw: &str) -> Result<String, PlaceholderError> {
    let arg = raw.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = arg.strip_prefix(quote) {
            return inner
                .strip_suffix(quote)
                .map(str::to_string)
                .ok_or(PlaceholderError::UnterminatedQuote);
        }
    }
    Ok(arg.to_string())
}

fn parse_filter(raw: &str) -> Result<Filter, PlaceholderError> {
    let (name, args) = match raw.split_once(':') {
        Some((name, args)) => (name.trim(), Some(args)),
        None => (raw.trim(), None),
    };

    let args = match args {
        Some(args) => split_unquoted(args, ',')?
            .into_iter()
            .map(parse_argument)
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let arity = |expected: usize| {
        if args.len() == expected {
            Ok(())
        } else {
            Err(PlaceholderError::FilterArity {
                filter: name.to_string(),
                expected,
                found: args.len(),
            })
        }
    };

    match name {
        "replace" => {
            arity(2)?;
            let mut args = args.into_iter();
            let from = args.next().unwrap_or_default();
            let to = args.next().unwrap_or_default();
            Ok(Filter::Replace { from, to })
        }
        "downcase" => {
            arity(0)?;
            Ok(Filter::Downcase)
        }
        other => Err(PlaceholderError::UnknownFilter(other.to_string())),
    }
}

/// Parses the inside of one `{{ ... }}` expression.
pub fn parse_expression(expression: &str) -> Result<Placeholder, PlaceholderError> {
    let mut parts = split_unquoted(expression, '|')?.into_iter();

    let path = parts.next().map(str::trim).unwrap_or_default();
    if path.is_empty() {
        return Err(PlaceholderError::EmptyPath);
    }

    let filters = parts.map(parse_filter).collect::<Result<Vec<_>, _>>()?;

    Ok(Placeholder {
        path: path.to_string(),
        filters,
    })
}
