//! Statement context helpers.
//!
//! These locate segments in SQL text by searching for identifiers, so tests
//! can describe statements without hand-counting byte offsets.

use helios_sharding::SqlValue;
use helios_sharding::context::{
    ColumnSegment, ExpressionSegment, InsertColumnsSegment, InsertStatementContext,
    InsertValuesSegment, OwnerSegment, StatementContext, StatementKind, TableSegment,
};

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Inclusive spans of every whole-word occurrence of `word`.
pub fn word_spans(sql: &str, word: &str) -> Vec<(usize, usize)> {
    let bytes = sql.as_bytes();
    sql.match_indices(word)
        .map(|(start, _)| (start, start + word.len()))
        .filter(|&(start, end)| {
            let before = start.checked_sub(1).map(|i| bytes[i]);
            let after = bytes.get(end).copied();
            !before.is_some_and(is_identifier_byte) && !after.is_some_and(is_identifier_byte)
        })
        .map(|(start, end)| (start, end - 1))
        .collect()
}

/// Inclusive span of the `n`th whole-word occurrence of `word`.
pub fn nth_span(sql: &str, word: &str, n: usize) -> (usize, usize) {
    word_spans(sql, word)
        .get(n)
        .copied()
        .unwrap_or_else(|| panic!("occurrence {n} of '{word}' not found in {sql}"))
}

/// Inclusive span of the first whole-word occurrence of `word`.
pub fn span(sql: &str, word: &str) -> (usize, usize) {
    nth_span(sql, word, 0)
}

/// The `n`th reference to a table.
pub fn table(sql: &str, name: &str, n: usize) -> TableSegment {
    let (start, stop) = nth_span(sql, name, n);
    TableSegment::new(start, stop, name)
}

/// The `n`th reference to a column, picking up an `owner.` qualifier.
pub fn column(sql: &str, name: &str, n: usize) -> ColumnSegment {
    let (start, stop) = nth_span(sql, name, n);
    let segment = ColumnSegment::new(start, stop, name);
    if start == 0 || sql.as_bytes()[start - 1] != b'.' {
        return segment;
    }
    let owner_stop = start - 2;
    let owner_start = sql[..=owner_stop]
        .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .map_or(0, |i| i + 1);
    segment.with_owner(OwnerSegment::new(
        owner_start,
        owner_stop,
        &sql[owner_start..=owner_stop],
    ))
}

/// The `n`th occurrence of an integer literal.
pub fn int_literal(sql: &str, text: &str, n: usize) -> ExpressionSegment {
    let (start, stop) = nth_span(sql, text, n);
    ExpressionSegment::Literal {
        start,
        stop,
        value: SqlValue::Int(text.parse().expect("integer literal")),
    }
}

/// The `n`th `?` marker, bound to parameter `n`.
pub fn parameter(sql: &str, n: usize) -> ExpressionSegment {
    let start = sql
        .match_indices('?')
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or_else(|| panic!("parameter {n} not found in {sql}"));
    ExpressionSegment::Parameter {
        start,
        stop: start,
        index: n,
    }
}

/// Binds a simple `INSERT INTO t [(cols)] VALUES (...), ...` statement.
///
/// Values may be `?`, integers or single-quoted strings; anything else is
/// treated as an opaque expression.
pub fn insert_statement(sql: &str) -> StatementContext {
    let table_start = "INSERT INTO ".len();
    let table_end = sql[table_start..]
        .find([' ', '('])
        .map_or(sql.len(), |i| table_start + i);
    let table_name = &sql[table_start..table_end];
    let values_at = sql.find("VALUES").expect("VALUES clause");

    let head = &sql[table_end..values_at];
    let columns_segment = match (head.find('('), head.find(')')) {
        (Some(open), Some(close)) => {
            let (open, close) = (table_end + open, table_end + close);
            let columns = items(sql, open + 1, close)
                .into_iter()
                .map(|(start, stop)| ColumnSegment::new(start, stop, &sql[start..=stop]))
                .collect();
            InsertColumnsSegment::new(open, close, columns)
        }
        _ => InsertColumnsSegment::omitted(table_end),
    };

    let mut rows = Vec::new();
    let mut parameter_index = 0;
    let mut cursor = values_at;
    while let Some(open) = sql[cursor..].find('(').map(|i| cursor + i) {
        let close = open + sql[open..].find(')').expect("closing parenthesis");
        let values = items(sql, open + 1, close)
            .into_iter()
            .map(|(start, stop)| expression(sql, start, stop, &mut parameter_index))
            .collect();
        rows.push(InsertValuesSegment::new(open, close, values));
        cursor = close + 1;
    }

    StatementContext::builder(StatementKind::Insert, sql)
        .table(TableSegment::new(table_start, table_end - 1, table_name))
        .insert(InsertStatementContext::new(
            table_name,
            Some(columns_segment),
            rows,
        ))
        .build()
}

/// Trimmed inclusive spans of the comma-separated items in `sql[start..end]`.
fn items(sql: &str, start: usize, end: usize) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut item_start = start;
    for (offset, c) in sql[start..end].char_indices().chain([(end - start, ',')]) {
        if c != ',' {
            continue;
        }
        let item_end = start + offset;
        let text = &sql[item_start..item_end];
        let leading = text.len() - text.trim_start().len();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            let s = item_start + leading;
            spans.push((s, s + trimmed.len() - 1));
        }
        item_start = item_end + 1;
    }
    spans
}

fn expression(
    sql: &str,
    start: usize,
    stop: usize,
    parameter_index: &mut usize,
) -> ExpressionSegment {
    let text = &sql[start..=stop];
    if text == "?" {
        let index = *parameter_index;
        *parameter_index += 1;
        return ExpressionSegment::Parameter { start, stop, index };
    }
    if let Some(inner) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        return ExpressionSegment::Literal {
            start,
            stop,
            value: SqlValue::text(inner),
        };
    }
    match text.parse::<i64>() {
        Ok(value) => ExpressionSegment::Literal {
            start,
            stop,
            value: SqlValue::Int(value),
        },
        Err(_) => {
            let parameter_count = text.matches('?').count();
            *parameter_index += parameter_count;
            ExpressionSegment::Complex {
                start,
                stop,
                parameter_count,
            }
        }
    }
}
