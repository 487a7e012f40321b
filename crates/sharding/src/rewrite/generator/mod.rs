//! Token generators.
//!
//! Each generator is a pure function of the statement, its route result and
//! its parameters. The registry runs every applicable generator, orders the
//! tokens by position and rejects spans that overlap or fall outside the SQL
//! text, so the rewrite engine can apply them in a single scan.

mod generated_key;
mod insert_values;
mod pagination;
mod table;

use crate::context::StatementContext;
use crate::error::{RewriteError, RewriteResultOf};
use crate::keygen::GeneratedKeyContext;
use crate::rewrite::token::SqlToken;
use crate::route::RouteResult;
use crate::rule::ShardingRule;
use crate::value::SqlValue;

pub(crate) use pagination::revision as pagination_revision;

/// Inputs shared by all generators.
#[derive(Debug, Clone, Copy)]
pub struct TokenGenerateContext<'a> {
    /// The rule snapshot the statement was routed with.
    pub rule: &'a ShardingRule,
    /// The statement.
    pub statement: &'a StatementContext,
    /// Its route result.
    pub route_result: &'a RouteResult,
    /// Its parameters.
    pub parameters: &'a [SqlValue],
    /// Key values of an INSERT into a table with a key generator.
    pub generated_key: Option<&'a GeneratedKeyContext>,
    /// Columns every INSERT row supplies, before key injection.
    pub insert_columns: &'a [String],
}

/// The closed set of generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenGenerator {
    /// Table names and owner qualifiers.
    Table,
    /// Per-unit VALUES rows of an INSERT.
    InsertValues,
    /// Generated key column injection.
    GeneratedKey,
    /// LIMIT/OFFSET revision for multi-unit queries.
    Pagination,
}

impl TokenGenerator {
    /// Every generator, in registry order.
    pub const ALL: [TokenGenerator; 4] = [
        TokenGenerator::Table,
        TokenGenerator::InsertValues,
        TokenGenerator::GeneratedKey,
        TokenGenerator::Pagination,
    ];

    /// Returns true when the generator has anything to contribute.
    pub fn is_applicable(self, context: &TokenGenerateContext<'_>) -> bool {
        match self {
            TokenGenerator::Table => !context.statement.tables().is_empty(),
            TokenGenerator::InsertValues => insert_values::is_applicable(context),
            TokenGenerator::GeneratedKey => context
                .generated_key
                .is_some_and(GeneratedKeyContext::is_generated),
            TokenGenerator::Pagination => pagination::is_applicable(context),
        }
    }

    /// Produces the generator's tokens.
    pub fn generate(self, context: &TokenGenerateContext<'_>) -> RewriteResultOf<Vec<SqlToken>> {
        match self {
            TokenGenerator::Table => Ok(table::generate(context)),
            TokenGenerator::InsertValues => insert_values::generate(context),
            TokenGenerator::GeneratedKey => generated_key::generate(context),
            TokenGenerator::Pagination => pagination::generate(context),
        }
    }
}

/// Runs every applicable generator and returns the tokens sorted by position.
pub fn generate_tokens(context: &TokenGenerateContext<'_>) -> RewriteResultOf<Vec<SqlToken>> {
    let mut tokens = Vec::new();
    for generator in TokenGenerator::ALL {
        if !generator.is_applicable(context) {
            continue;
        }
        for token in generator.generate(context)? {
            tracing::trace!(
                ?generator,
                start = token.start(),
                end = token.end(),
                "Generated SQL token"
            );
            tokens.push(token);
        }
    }
    tokens.sort_by_key(|t| (t.start(), t.end()));
    validate(context.statement.sql(), &tokens)?;
    Ok(tokens)
}

/// Checks that sorted tokens lie on character boundaries of `sql` and do
/// not overlap.
pub fn validate(sql: &str, tokens: &[SqlToken]) -> RewriteResultOf<()> {
    for token in tokens {
        let (start, end) = (token.start(), token.end());
        if start > end
            || end > sql.len()
            || !sql.is_char_boundary(start)
            || !sql.is_char_boundary(end)
        {
            return Err(RewriteError::InvalidSpan {
                start,
                end,
                length: sql.len(),
            });
        }
    }
    for pair in tokens.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        if second.start() < first.end() || second.start() == first.start() {
            return Err(RewriteError::OverlappingTokens {
                first_start: first.start(),
                first_end: first.end(),
                second_start: second.start(),
                second_end: second.end(),
            });
        }
    }
    Ok(())
}
