//! VALUES clause tokens.

use crate::error::{RewriteError, RewriteResultOf};
use crate::rewrite::generator::TokenGenerateContext;
use crate::rewrite::generator::generated_key;
use crate::rewrite::token::{InsertValuesRow, SqlToken};

pub(super) fn is_applicable(context: &TokenGenerateContext<'_>) -> bool {
    let Some(insert) = context.statement.insert() else {
        return false;
    };
    let injects_key = context.generated_key.is_some_and(|k| k.is_generated());
    context.rule.is_sharding_table(&insert.table) && (insert.values.len() > 1 || injects_key)
}

/// One token spanning every row, carrying each row's text (with the
/// generated key appended when injected) and its routed data nodes.
pub(super) fn generate(context: &TokenGenerateContext<'_>) -> RewriteResultOf<Vec<SqlToken>> {
    let Some(insert) = context.statement.insert() else {
        return Ok(Vec::new());
    };
    let (Some(first), Some(last)) = (insert.values.first(), insert.values.last()) else {
        return Ok(Vec::new());
    };
    let sql = context.statement.sql();
    let original_data_nodes = context.route_result.original_data_nodes();

    let mut rows = Vec::with_capacity(insert.values.len());
    for (index, row) in insert.values.iter().enumerate() {
        let original = sql
            .get(row.start..=row.stop)
            .ok_or(RewriteError::InvalidSpan {
                start: row.start,
                end: row.stop + 1,
                length: sql.len(),
            })?;
        let text = match generated_key::injected_value(context, index) {
            Some(value) => {
                let body = original.strip_suffix(')').ok_or(RewriteError::InvalidSpan {
                    start: row.start,
                    end: row.stop + 1,
                    length: sql.len(),
                })?;
                format!("{body}, {value})")
            }
            None => original.to_string(),
        };
        rows.push(InsertValuesRow {
            text,
            data_nodes: original_data_nodes.get(index).cloned(),
        });
    }

    Ok(vec![SqlToken::InsertValues {
        start: first.start,
        stop: last.stop,
        rows,
    }])
}
