//! LIMIT/OFFSET revision.
//!
//! A query spread over several units must return the first `offset + count`
//! rows from every unit, leaving the merger to skip `offset` of them.
//! Literal values are rewritten through tokens, parameter markers through
//! parameter replacement.

use crate::context::{PaginationContext, PaginationValueSegment, StatementContext, StatementKind};
use crate::error::{RewriteError, RewriteResultOf};
use crate::rewrite::generator::TokenGenerateContext;
use crate::rewrite::token::SqlToken;
use crate::route::RouteResult;
use crate::value::SqlValue;

/// Resolved pagination of a revised query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PaginationRevision {
    pub offset: i64,
    pub row_count: Option<i64>,
}

impl PaginationRevision {
    /// The row count every unit must return.
    pub fn revised_row_count(&self) -> Option<i64> {
        self.row_count.map(|count| self.offset.saturating_add(count))
    }
}

fn needs_revision(statement: &StatementContext, route_result: &RouteResult) -> bool {
    statement.kind() == StatementKind::Select
        && route_result.len() > 1
        && statement.pagination().is_some()
}

pub(super) fn is_applicable(context: &TokenGenerateContext<'_>) -> bool {
    needs_revision(context.statement, context.route_result)
}

/// Resolves the pagination of a statement that must be revised.
pub(crate) fn revision(
    statement: &StatementContext,
    route_result: &RouteResult,
    parameters: &[SqlValue],
) -> RewriteResultOf<Option<(PaginationContext, PaginationRevision)>> {
    if !needs_revision(statement, route_result) {
        return Ok(None);
    }
    let Some(pagination) = statement.pagination() else {
        return Ok(None);
    };
    let offset = match &pagination.offset {
        Some(segment) => resolve(segment, parameters)?,
        None => 0,
    };
    let row_count = pagination
        .row_count
        .as_ref()
        .map(|segment| resolve(segment, parameters))
        .transpose()?;
    Ok(Some((*pagination, PaginationRevision { offset, row_count })))
}

fn resolve(segment: &PaginationValueSegment, parameters: &[SqlValue]) -> RewriteResultOf<i64> {
    match segment {
        PaginationValueSegment::Literal { value, .. } => Ok(*value),
        PaginationValueSegment::Parameter { index, .. } => parameters
            .get(*index)
            .and_then(SqlValue::as_i64)
            .ok_or(RewriteError::InvalidPaginationParameter { index: *index }),
    }
}

pub(super) fn generate(context: &TokenGenerateContext<'_>) -> RewriteResultOf<Vec<SqlToken>> {
    let Some((pagination, resolved)) =
        revision(context.statement, context.route_result, context.parameters)?
    else {
        return Ok(Vec::new());
    };
    let mut tokens = Vec::new();
    if let Some(PaginationValueSegment::Literal { start, stop, .. }) = pagination.offset {
        tokens.push(SqlToken::Offset { start, stop });
    }
    if let Some(PaginationValueSegment::Literal { start, stop, .. }) = pagination.row_count
        && let Some(revised) = resolved.revised_row_count()
    {
        tokens.push(SqlToken::RowCount { start, stop, revised });
    }
    Ok(tokens)
}
