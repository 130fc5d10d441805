//! Evaluates placeholder expressions against a locale dictionary.

use std::fmt;

use serde_json::Value;

use super::dictionary::{Dictionary, json_kind};
use super::placeholder::{
    CLOSE, Filter, OPEN, Placeholder, PlaceholderError, Segment, parse_expression, split_segments,
};

/// Why a template string could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    Syntax(PlaceholderError),
    /// The dictionary has no entry at the path.
    MissingPath(String),
    /// The path resolves to an object, array or null.
    NotText { path: String, kind: &'static str },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Syntax(err) => write!(f, "invalid placeholder: {}", err),
            RenderError::MissingPath(path) => write!(f, "no entry for '{}'", path),
            RenderError::NotText { path, kind } => {
                write!(f, "'{}' resolves to {}, expected text", path, kind)
            }
        }
    }
}

impl std::error::Error for RenderError {}

impl From<PlaceholderError> for RenderError {
    fn from(err: PlaceholderError) -> Self {
        RenderError::Syntax(err)
    }
}

/// Renders every placeholder in `template`; text outside placeholders is
/// copied through unchanged.
///
/// ```
/// use lexis::core::dictionary::Dictionary;
/// use lexis::core::render::render_str;
/// use serde_json::json;
///
/// let dictionary = Dictionary::from_value(json!({
///     "common": { "measurements": { "a_feet": "{{a}} pés" } }
/// })).unwrap();
///
/// let rendered = render_str(
///     "{{ common.measurements.a_feet | replace: '{{ a }}', '30' }}",
///     &dictionary,
/// );
/// assert_eq!(rendered.unwrap(), "30 pés");
/// ```
pub fn render_str(template: &str, dictionary: &Dictionary) -> Result<String, RenderError> {
    let mut output = String::with_capacity(template.len());

    for segment in split_segments(template)? {
        match segment {
            Segment::Literal(text) => output.push_str(text),
            Segment::Expression(expression) => {
                let placeholder = parse_expression(expression)?;
                output.push_str(&evaluate(&placeholder, dictionary)?);
            }
        }
    }

    Ok(output)
}

/// Resolves one placeholder and applies its filters in order.
pub fn evaluate(placeholder: &Placeholder, dictionary: &Dictionary) -> Result<String, RenderError> {
    let path = &placeholder.path;
    let resolved = match dictionary.get(path) {
        None => return Err(RenderError::MissingPath(path.clone())),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => {
            return Err(RenderError::NotText {
                path: path.clone(),
                kind: json_kind(other),
            });
        }
    };

    Ok(placeholder
        .filters
        .iter()
        .fold(resolved, |text, filter| apply_filter(&text, filter)))
}

fn apply_filter(text: &str, filter: &Filter) -> String {
    match filter {
        Filter::Downcase => text.to_lowercase(),
        Filter::Replace { from, to } => match variable_name(from) {
            Some(variable) => replace_variable(text, variable, to),
            None => text.replace(from.as_str(), to),
        },
    }
}

/// The variable inside a `{{ var }}` token, if `token` is one.
fn variable_name(token: &str) -> Option<&str> {
    let name = token.strip_prefix(OPEN)?.strip_suffix(CLOSE)?.trim();
    let valid = !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some(name)
}

/// Replaces `{{ var }}` in `text` regardless of the spacing inside the
/// braces, so translators may write `{{a}}` as well as `{{ a }}`.
fn replace_variable(text: &str, variable: &str, replacement: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(OPEN) {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];

        let token_len = after_open
            .trim_start()
            .strip_prefix(variable)
            .map(str::trim_start)
            .and_then(|tail| tail.strip_prefix(CLOSE))
            .map(|tail| after_open.len() - tail.len());

        match token_len {
            Some(len) => {
                output.push_str(replacement);
                rest = &after_open[len..];
            }
            None => {
                output.push_str(OPEN);
                rest = after_open;
            }
        }
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn dictionary(value: Value) -> Dictionary {
        Dictionary::from_value(value).unwrap()
    }

    #[test]
    fn test_plain_path() {
        let dictionary = dictionary(json!({ "spells": { "fireball": { "name": "Bola de Fogo" } } }));
        assert_eq!(
            render_str("{{ spells.fireball.name }}", &dictionary).unwrap(),
            "Bola de Fogo"
        );
    }

    #[test]
    fn test_measurement_preserves_number() {
        let dictionary = dictionary(json!({
            "common": { "measurements": { "a_feet": "{{ a }} feet" } }
        }));
        assert_eq!(
            render_str(
                "{{ common.measurements.a_feet | replace: '{{ a }}', '30' }}",
                &dictionary
            )
            .unwrap(),
            "30 feet"
        );
    }

    #[test]
    fn test_measurement_tolerates_compact_variable() {
        let dictionary = dictionary(json!({
            "common": { "measurements": { "a_feet": "{{a}} pés", "a_ft_b_ft": "{{ b }}/{{a }}" } }
        }));
        assert_eq!(
            render_str(
                "{{ common.measurements.a_feet | replace: '{{ a }}', '30' }}",
                &dictionary
            )
            .unwrap(),
            "30 pés"
        );
        assert_eq!(
            render_str(
                "{{ common.measurements.a_ft_b_ft | replace: '{{ a }}', '1,000' | replace: '{{ b }}', '60' }}",
                &dictionary
            )
            .unwrap(),
            "60/1,000"
        );
    }

    #[test]
    fn test_replace_leaves_other_variables() {
        assert_eq!(replace_variable("{{ ab }} {{a}}", "a", "1"), "{{ ab }} 1");
        assert_eq!(replace_variable("{{ a", "a", "1"), "{{ a");
    }

    #[test]
    fn test_replace_with_plain_needle() {
        let filter = Filter::Replace {
            from: "cold".to_string(),
            to: "warm".to_string(),
        };
        assert_eq!(apply_filter("cold and cold", &filter), "warm and warm");
    }

    #[test]
    fn test_downcase() {
        let dictionary = dictionary(json!({ "damage_types": { "fire": { "name": "Fire" } } }));
        assert_eq!(
            render_str("{{ damage_types.fire.name | downcase }}", &dictionary).unwrap(),
            "fire"
        );
    }

    #[test]
    fn test_mixed_text_and_list_join() {
        let dictionary = dictionary(json!({
            "common": {
                "delimiters": { "and": " e ", "and_with_oxford_comma": " e " },
                "damage_types": { "fire": "fogo", "cold": "frio", "lightning": "relâmpago" }
            }
        }));
        let template = "{{ common.damage_types.fire }}, {{ common.damage_types.cold }}{{ common.delimiters.and_with_oxford_comma }}{{ common.damage_types.lightning }}";
        assert_eq!(
            render_str(template, &dictionary).unwrap(),
            "fogo, frio e relâmpago"
        );
    }

    #[test]
    fn test_scalars_render_as_text() {
        let dictionary = dictionary(json!({ "n": 3, "b": false }));
        assert_eq!(render_str("{{ n }}/{{ b }}", &dictionary).unwrap(), "3/false");
    }

    #[test]
    fn test_missing_path() {
        let dictionary = Dictionary::new();
        assert_eq!(
            render_str("{{ spells.x.name }}", &dictionary),
            Err(RenderError::MissingPath("spells.x.name".to_string()))
        );
    }

    #[test]
    fn test_non_text_value() {
        let dictionary = dictionary(json!({ "spells": { "x": { "name": "X" } } }));
        assert_eq!(
            render_str("{{ spells.x }}", &dictionary),
            Err(RenderError::NotText {
                path: "spells.x".to_string(),
                kind: "an object",
            })
        );
    }

    #[test]
    fn test_syntax_error() {
        let err = render_str("{{ a | upcase }}", &Dictionary::new()).unwrap_err();
        assert_eq!(
            err,
            RenderError::Syntax(PlaceholderError::UnknownFilter("upcase".to_string()))
        );
        assert_eq!(err.to_string(), "invalid placeholder: unknown filter 'upcase'");
    }

    #[test]
    fn test_text_without_placeholders() {
        assert_eq!(render_str("plain", &Dictionary::new()).unwrap(), "plain");
    }
}
