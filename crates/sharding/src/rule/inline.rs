//! Inline expressions for actual data nodes.
//!
//! An inline expression is a compact notation for a cartesian set of names:
//!
//! | Expression | Expands to |
//! |------------|------------|
//! | `ds_${0..1}.t_order` | `ds_0.t_order`, `ds_1.t_order` |
//! | `ds_0.t_order_${[0, 2]}` | `ds_0.t_order_0`, `ds_0.t_order_2` |
//! | `ds_${0..1}.t_order_${0..1}` | all four combinations, left placeholder outermost |
//! | `ds_0.t_a, ds_1.t_b` | both names, in order |
//!
//! `$->{...}` is accepted as a synonym of `${...}`.

use regex::Regex;

use crate::error::ConfigError;

const PLACEHOLDER_PATTERN: &str = r"\$(?:->)?\{([^}]*)\}";

/// Expands an inline expression into the ordered list of names it denotes.
pub fn expand(expression: &str) -> Result<Vec<String>, ConfigError> {
    let placeholder =
        Regex::new(PLACEHOLDER_PATTERN).map_err(|e| invalid(expression, &e.to_string()))?;

    let mut result = Vec::new();
    for segment in split_top_level(expression) {
        if segment.is_empty() {
            return Err(invalid(expression, "empty segment"));
        }
        result.extend(expand_segment(&placeholder, expression, &segment)?);
    }
    if result.is_empty() {
        return Err(invalid(expression, "expression is empty"));
    }
    Ok(result)
}

/// Splits on commas that are not inside a placeholder.
fn split_top_level(expression: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for ch in expression.chars() {
        match ch {
            '{' => {
                depth += 1;
                current.push(ch);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                segments.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    segments.push(current.trim().to_string());
    segments
}

fn expand_segment(
    placeholder: &Regex,
    expression: &str,
    segment: &str,
) -> Result<Vec<String>, ConfigError> {
    // Alternating literal and choice lists, combined left to right.
    let mut parts: Vec<Vec<String>> = Vec::new();
    let mut cursor = 0;
    for captures in placeholder.captures_iter(segment) {
        let (Some(whole), Some(body)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        parts.push(vec![segment[cursor..whole.start()].to_string()]);
        parts.push(parse_choices(expression, body.as_str())?);
        cursor = whole.end();
    }
    parts.push(vec![segment[cursor..].to_string()]);

    if parts.iter().flatten().any(|p| p.contains("${") || p.contains("$->{")) {
        return Err(invalid(expression, "unterminated placeholder"));
    }

    let mut combinations = vec![String::new()];
    for choices in parts {
        let mut next = Vec::with_capacity(combinations.len() * choices.len());
        for prefix in &combinations {
            for choice in &choices {
                next.push(format!("{prefix}{choice}"));
            }
        }
        combinations = next;
    }
    Ok(combinations)
}

fn parse_choices(expression: &str, body: &str) -> Result<Vec<String>, ConfigError> {
    let body = body.trim();
    if let Some(list) = body.strip_prefix('[').and_then(|b| b.strip_suffix(']')) {
        let items: Vec<String> = list
            .split(',')
            .map(|item| item.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
            .filter(|item| !item.is_empty())
            .collect();
        if items.is_empty() {
            return Err(invalid(expression, "empty list placeholder"));
        }
        return Ok(items);
    }
    if let Some((lower, upper)) = body.split_once("..") {
        let lower: i64 = lower
            .trim()
            .parse()
            .map_err(|_| invalid(expression, &format!("invalid range start '{lower}'")))?;
        let upper: i64 = upper
            .trim()
            .parse()
            .map_err(|_| invalid(expression, &format!("invalid range end '{upper}'")))?;
        if lower > upper {
            return Err(invalid(expression, &format!("range {lower}..{upper} is empty")));
        }
        return Ok((lower..=upper).map(|i| i.to_string()).collect());
    }
    if body.is_empty() {
        return Err(invalid(expression, "empty placeholder"));
    }
    Ok(vec![body.to_string()])
}

fn invalid(expression: &str, message: &str) -> ConfigError {
    ConfigError::InvalidDataNodeExpression {
        expression: expression.to_string(),
        message: message.to_string(),
    }
}
