//! The rewrite engine.
//!
//! Applies sorted tokens to the original SQL text in one left-to-right scan
//! per unit: literal text up to the next token, the token's rendering, then
//! on past its span. Renderings that do not depend on the unit are computed
//! once and reused.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{RewriteError, RewriteResultOf};
use crate::rewrite::generator::validate;
use crate::rewrite::parameter::ParameterBuilder;
use crate::rewrite::token::SqlToken;
use crate::route::{RouteResult, RouteUnit};
use crate::value::SqlValue;

/// One rewritten statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlRewriteResult {
    /// The SQL text to execute.
    pub sql: String,
    /// Its parameters.
    pub parameters: Vec<SqlValue>,
}

/// Rewritten statements of a routed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlRewriteOutput {
    /// The statement routed to no unit; a single unbound rewrite.
    Single(SqlRewriteResult),
    /// One rewrite per unit, in routing order.
    Routed(IndexMap<RouteUnit, SqlRewriteResult>),
}

impl SqlRewriteOutput {
    /// The number of rewritten statements.
    pub fn len(&self) -> usize {
        match self {
            SqlRewriteOutput::Single(_) => 1,
            SqlRewriteOutput::Routed(results) => results.len(),
        }
    }

    /// Returns true when nothing was produced.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The rewrite of a unit.
    pub fn get(&self, unit: &RouteUnit) -> Option<&SqlRewriteResult> {
        match self {
            SqlRewriteOutput::Single(_) => None,
            SqlRewriteOutput::Routed(results) => results.get(unit),
        }
    }

    /// Every rewrite with its unit (`None` for a single unbound rewrite).
    pub fn iter(
        &self,
    ) -> Box<dyn Iterator<Item = (Option<&RouteUnit>, &SqlRewriteResult)> + '_> {
        match self {
            SqlRewriteOutput::Single(result) => Box::new(std::iter::once((None, result))),
            SqlRewriteOutput::Routed(results) => {
                Box::new(results.iter().map(|(u, r)| (Some(u), r)))
            }
        }
    }
}

/// Merges tokens into the original SQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlRewriteEngine;

impl SqlRewriteEngine {
    /// Rewrites `sql` for every unit of `route_result`.
    ///
    /// `tokens` must be sorted by position. An empty route result yields a
    /// single rewrite rendered without a unit.
    pub fn rewrite(
        sql: &str,
        tokens: &[SqlToken],
        route_result: &RouteResult,
        parameters: &ParameterBuilder,
    ) -> RewriteResultOf<SqlRewriteOutput> {
        validate(sql, tokens)?;
        let cached: Vec<Option<String>> = tokens
            .iter()
            .map(|t| (!t.is_route_dependent()).then(|| t.render(None)))
            .collect();

        if route_result.is_empty() {
            return Ok(SqlRewriteOutput::Single(SqlRewriteResult {
                sql: Self::render(sql, tokens, &cached, None)?,
                parameters: parameters.parameters_for(route_result, None),
            }));
        }

        let mut results = IndexMap::with_capacity(route_result.len());
        for unit in route_result.units() {
            let result = SqlRewriteResult {
                sql: Self::render(sql, tokens, &cached, Some(unit))?,
                parameters: parameters.parameters_for(route_result, Some(unit)),
            };
            results.insert(unit.clone(), result);
        }
        Ok(SqlRewriteOutput::Routed(results))
    }

    fn render(
        sql: &str,
        tokens: &[SqlToken],
        cached: &[Option<String>],
        unit: Option<&RouteUnit>,
    ) -> RewriteResultOf<String> {
        let mut output = String::with_capacity(sql.len() + 16 * tokens.len());
        let mut cursor = 0;
        for (token, cached) in tokens.iter().zip(cached) {
            output.push_str(Self::slice(sql, cursor, token.start())?);
            match cached {
                Some(text) => output.push_str(text),
                None => output.push_str(&token.render(unit)),
            }
            cursor = token.end();
        }
        output.push_str(Self::slice(sql, cursor, sql.len())?);
        Ok(output)
    }

    fn slice(sql: &str, start: usize, end: usize) -> RewriteResultOf<&str> {
        sql.get(start..end).ok_or(RewriteError::InvalidSpan {
            start,
            end,
            length: sql.len(),
        })
    }
}
