//! Common text helpers shared by extraction and rendering.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::placeholder::Placeholder;

static NON_WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

static DECIMAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$|^[+-]?Infinity$").unwrap()
});

static RADIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0(?:[xX][0-9a-fA-F]+|[oO][0-7]+|[bB][01]+)$").unwrap());

/// Dictionary path of the plain "and" list delimiter.
pub const AND_DELIMITER_PATH: &str = "common.delimiters.and";

/// Dictionary path of the "and" list delimiter preceded by an Oxford comma.
pub const OXFORD_DELIMITER_PATH: &str = "common.delimiters.and_with_oxford_comma";

/// Turns free text into a dictionary key segment.
///
/// Splits on single spaces and slashes, drops empty tokens, joins with `_`,
/// strips every remaining non-word character and lowercases.
///
/// ```
/// use lexis::utils::sanitize;
///
/// assert_eq!(sanitize("Light Crossbow"), "light_crossbow");
/// assert_eq!(sanitize("Melee/Ranged"), "melee_ranged");
/// assert_eq!(sanitize("1 action, or 8 hours"), "1_action_or_8_hours");
/// ```
pub fn sanitize(text: &str) -> String {
    let joined = text
        .split([' ', '/'])
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    NON_WORD_REGEX.replace_all(&joined, "").to_lowercase()
}

/// Positional variable name for the `index`-th captured number.
///
/// `0` is `a`, `25` is `z`, and the sequence wraps after that.
pub fn to_variable(index: usize) -> String {
    let offset = u8::try_from(index % 26).unwrap_or_default();
    char::from(b'a' + offset).to_string()
}

/// Text with every match of `pattern` replaced by successive variables.
///
/// When the pattern has a first capture group only that group is replaced,
/// the rest of the match is kept. Returns the rewritten text and the
/// captured literals in order of appearance.
pub fn replace_with_variables(
    text: &str,
    pattern: &Regex,
    curly_brackets: bool,
) -> (String, Vec<String>) {
    let mut output = String::with_capacity(text.len());
    let mut captured = Vec::new();
    let mut last = 0;

    for caps in pattern.captures_iter(text) {
        let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
            continue;
        };

        let variable = to_variable(captured.len());
        output.push_str(&text[last..m.start()]);
        if curly_brackets {
            output.push_str(&variable_token(&variable));
        } else {
            output.push_str(&variable);
        }
        captured.push(m.as_str().to_string());
        last = m.end();
    }

    output.push_str(&text[last..]);
    (output, captured)
}

/// The `{{ var }}` token a measurement value carries in place of a number.
pub fn variable_token(variable: &str) -> String {
    format!("{{{{ {} }}}}", variable)
}

/// Joins already-templated list items, inserting the localized conjunction
/// before the last item.
///
/// No conjunction for one item, the plain "and" delimiter for two, and the
/// Oxford-comma delimiter for more than two when the source used one.
pub fn make_comma_separated_string(items: &[String], use_oxford_comma: bool) -> String {
    let Some((last, head)) = items.split_last() else {
        return String::new();
    };

    let conjunction = if items.len() <= 1 {
        String::new()
    } else if use_oxford_comma && items.len() > 2 {
        Placeholder::new(OXFORD_DELIMITER_PATH).to_string()
    } else {
        Placeholder::new(AND_DELIMITER_PATH).to_string()
    };

    [head.join(", "), last.clone()].join(&conjunction)
}

/// Uppercases the first character and lowercases the rest.
///
/// ```
/// use lexis::utils::capitalize;
///
/// assert_eq!(capitalize("fire"), "Fire");
/// assert_eq!(capitalize("cOLD"), "Cold");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// Whether a string would be read as a number by a loose numeric parse.
///
/// Blank strings count as numeric (they coerce to zero), as do decimal,
/// exponent, `Infinity` and `0x`/`0o`/`0b` forms.
pub fn is_numeric_like(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || DECIMAL_REGEX.is_match(trimmed) || RADIX_REGEX.is_match(trimmed)
}
