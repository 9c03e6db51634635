//! Filter query parser for index entries.
//!
//! # Syntax
//!
//! ```text
//! filter_expr  := field_filter (operator? field_filter)*
//! field_filter := field_name:value | field_name:"quoted value"
//! operator     := AND | OR (case-insensitive)
//! field_name   := project | tag | source | since | until (case-insensitive)
//! ```
//!
//! Without an explicit operator, consecutive filters on the same field are OR'd and
//! filters on different fields are AND'd.
//!
//! # Examples
//!
//! ```rust
//! # use session_vault::filters::parse_filter;
//! let expr = parse_filter("project:api tag:auth").unwrap();
//! assert_eq!(expr.filters.len(), 2);
//!
//! let expr = parse_filter("tag:bug OR tag:regression since:2026-01-01").unwrap();
//! assert_eq!(expr.operators.len(), 2);
//!
//! assert!(parse_filter("source:robot").is_err());
//! ```

use std::iter::Peekable;
use std::str::Chars;

use chrono::NaiveDate;

use super::ast::{FieldFilter, FilterExpr, FilterField, FilterOperator};
use crate::error::{Result, VaultError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    FieldValue { field: String, value: String },
    And,
    Or,
}

fn invalid(message: impl Into<String>) -> VaultError {
    VaultError::InvalidFilter(message.into())
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let word = read_word(&mut chars);
        match word.to_uppercase().as_str() {
            "AND" => tokens.push(Token::And),
            "OR" => tokens.push(Token::Or),
            _ => {
                let Some((field, value)) = word.split_once(':') else {
                    return Err(invalid(format!(
                        "'{}' is not a field:value pair or AND/OR",
                        word
                    )));
                };

                let value = match value.strip_prefix('"') {
                    Some(rest) => read_quoted_value(&mut chars, rest)?,
                    None => value.to_string(),
                };

                if field.is_empty() || value.is_empty() {
                    return Err(invalid(format!("'{}' needs both a field and a value", word)));
                }

                tokens.push(Token::FieldValue { field: field.to_string(), value });
            }
        }
    }

    Ok(tokens)
}

/// Read until whitespace or end
fn read_word(chars: &mut Peekable<Chars>) -> String {
    let mut word = String::new();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            break;
        }
        word.push(ch);
        chars.next();
    }
    word
}

/// `started` is what followed the opening quote inside the current word
fn read_quoted_value(chars: &mut Peekable<Chars>, started: &str) -> Result<String> {
    if let Some(end) = started.find('"') {
        return Ok(started[..end].to_string());
    }

    let mut value = started.to_string();
    for ch in chars.by_ref() {
        if ch == '"' {
            return Ok(value);
        }
        value.push(ch);
    }

    Err(invalid("unterminated quoted value"))
}

fn parse_field(field: &str) -> Result<FilterField> {
    match field.to_lowercase().as_str() {
        "project" => Ok(FilterField::Project),
        "tag" => Ok(FilterField::Tag),
        "source" => Ok(FilterField::Source),
        "since" => Ok(FilterField::Since),
        "until" => Ok(FilterField::Until),
        _ => Err(invalid(format!(
            "unknown field '{}' (valid fields: project, tag, source, since, until)",
            field
        ))),
    }
}

fn validate_value(field: FilterField, value: &str) -> Result<()> {
    match field {
        FilterField::Source => match value.to_lowercase().as_str() {
            "manual" | "auto" => Ok(()),
            _ => Err(invalid(format!("source must be 'manual' or 'auto', got '{}'", value))),
        },
        FilterField::Since | FilterField::Until => parse_day(value).map(|_| ()).ok_or_else(|| {
            invalid(format!("{} expects a YYYY-MM-DD date, got '{}'", field.name(), value))
        }),
        FilterField::Project | FilterField::Tag => Ok(()),
    }
}

/// Strict `YYYY-MM-DD` (rejects `2026-2-1` and impossible days)
pub(crate) fn parse_day(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Parse a filter string into a [`FilterExpr`]
///
/// Blank input parses to an empty expression, which matches everything.
///
/// # Errors
///
/// [`VaultError::InvalidFilter`] for unknown fields, bad values, dangling or doubled
/// operators and unterminated quotes.
pub fn parse_filter(input: &str) -> Result<FilterExpr> {
    let mut expr = FilterExpr::new();
    let mut expecting_filter = true;
    let mut last_field: Option<FilterField> = None;

    for token in tokenize(input)? {
        match token {
            Token::FieldValue { field, value } => {
                let field = parse_field(&field)?;
                validate_value(field, &value)?;

                if !expecting_filter {
                    let implicit = if last_field == Some(field) {
                        FilterOperator::Or
                    } else {
                        FilterOperator::And
                    };
                    expr.add_operator(implicit);
                }

                expr.add_filter(FieldFilter::new(field, value));
                last_field = Some(field);
                expecting_filter = false;
            }
            Token::And | Token::Or if expecting_filter => {
                return Err(invalid("operator must follow a field:value filter"));
            }
            Token::And => {
                expr.add_operator(FilterOperator::And);
                expecting_filter = true;
            }
            Token::Or => {
                expr.add_operator(FilterOperator::Or);
                expecting_filter = true;
            }
        }
    }

    if expecting_filter && !expr.is_empty() {
        return Err(invalid("filter ends with an operator"));
    }

    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(parse_filter("").unwrap().is_empty());
        assert!(parse_filter("   ").unwrap().is_empty());
    }

    #[test]
    fn test_implicit_operators() {
        let expr = parse_filter("tag:a tag:b project:api").unwrap();
        assert_eq!(expr.operators, vec![FilterOperator::Or, FilterOperator::And]);
    }

    #[test]
    fn test_explicit_operators_case_insensitive() {
        let expr = parse_filter("tag:a and project:api Or source:auto").unwrap();
        assert_eq!(expr.operators, vec![FilterOperator::And, FilterOperator::Or]);
        assert_eq!(expr.filters[2], FieldFilter::new(FilterField::Source, "auto"));
    }

    #[test]
    fn test_field_names_case_insensitive() {
        let expr = parse_filter("TAG:x").unwrap();
        assert_eq!(expr.filters[0].field, FilterField::Tag);
    }

    #[test]
    fn test_quoted_values() {
        let expr = parse_filter(r#"project:"My Project" tag:"a""#).unwrap();
        assert_eq!(expr.filters[0].value, "My Project");
        assert_eq!(expr.filters[1].value, "a");
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(matches!(parse_filter(r#"project:"open"#), Err(VaultError::InvalidFilter(_))));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse_filter("source:robot").is_err());
        assert!(parse_filter("since:2026-02-31").is_err());
        assert!(parse_filter("until:2026-2-1").is_err());
        assert!(parse_filter("color:red").is_err());
        assert!(parse_filter("tag:").is_err());
        assert!(parse_filter(":x").is_err());
        assert!(parse_filter("plainword").is_err());
    }

    #[test]
    fn test_rejects_misplaced_operators() {
        assert!(parse_filter("AND tag:a").is_err());
        assert!(parse_filter("tag:a OR").is_err());
        assert!(parse_filter("tag:a AND OR tag:b").is_err());
    }

    #[test]
    fn test_value_may_contain_colon() {
        let expr = parse_filter(r"project:C:\work").unwrap();
        assert_eq!(expr.filters[0].value, r"C:\work");
    }
}
