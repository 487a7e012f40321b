//! Generated key column tokens.

use crate::error::{RewriteError, RewriteResultOf};
use crate::rewrite::generator::TokenGenerateContext;
use crate::rewrite::token::SqlToken;

/// Adds the key column to the column list, or writes a full column list
/// when the statement omits it.
pub(super) fn generate(context: &TokenGenerateContext<'_>) -> RewriteResultOf<Vec<SqlToken>> {
    let (Some(insert), Some(key)) = (context.statement.insert(), context.generated_key) else {
        return Ok(Vec::new());
    };
    if !key.is_generated() {
        return Ok(Vec::new());
    }
    let segment = insert
        .columns_segment
        .as_ref()
        .ok_or_else(|| RewriteError::InsertColumnsSegmentMissing {
            logic_table: insert.table.clone(),
            column: key.column_name().to_string(),
        })?;

    let token = if segment.is_omitted() {
        let mut columns = context.insert_columns.to_vec();
        columns.push(key.column_name().to_string());
        SqlToken::UseDefaultInsertColumns {
            position: segment.start,
            columns,
        }
    } else {
        SqlToken::GeneratedKeyInsertColumn {
            position: segment.stop,
            column: key.column_name().to_string(),
        }
    };
    Ok(vec![token])
}

/// The text injected into a row for its generated key: a parameter marker
/// when the statement is parameterized, a literal otherwise.
pub(super) fn injected_value(context: &TokenGenerateContext<'_>, row: usize) -> Option<String> {
    let key = context.generated_key.filter(|k| k.is_generated())?;
    let value = key.values().get(row)?;
    Some(if context.parameters.is_empty() {
        value.to_sql_literal()
    } else {
        "?".to_string()
    })
}
