//! Positioned SQL segments.
//!
//! Every segment carries `start`/`stop`, inclusive byte offsets into the
//! original SQL text. Token generators address the original text only
//! through these offsets.

// Offsets and names are described once here rather than on every field
#![allow(missing_docs)]

use crate::error::{RouteError, RouteResultOf};
use crate::value::SqlValue;

/// Quoting style of an identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QuoteCharacter {
    /// Unquoted.
    #[default]
    None,
    /// MySQL backquotes.
    BackQuote,
    /// ANSI double quotes.
    DoubleQuote,
    /// SQL Server brackets.
    Brackets,
}

impl QuoteCharacter {
    /// Wraps a name in this quote style.
    pub fn wrap(self, name: &str) -> String {
        match self {
            QuoteCharacter::None => name.to_string(),
            QuoteCharacter::BackQuote => format!("`{name}`"),
            QuoteCharacter::DoubleQuote => format!("\"{name}\""),
            QuoteCharacter::Brackets => format!("[{name}]"),
        }
    }

    /// Detects the quote style of raw identifier text.
    pub fn detect(text: &str) -> Self {
        let quoted = |open: char, close: char| {
            text.len() >= 2 && text.starts_with(open) && text.ends_with(close)
        };
        if quoted('`', '`') {
            QuoteCharacter::BackQuote
        } else if quoted('"', '"') {
            QuoteCharacter::DoubleQuote
        } else if quoted('[', ']') {
            QuoteCharacter::Brackets
        } else {
            QuoteCharacter::None
        }
    }
}

/// An identifier with its quote style stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentifierValue {
    value: String,
    quote: QuoteCharacter,
}

impl IdentifierValue {
    /// Parses raw identifier text such as `` `t_order` `` or `t_order`.
    pub fn parse(text: &str) -> Self {
        let quote = QuoteCharacter::detect(text);
        let value = match quote {
            QuoteCharacter::None => text,
            _ => &text[1..text.len() - 1],
        };
        Self {
            value: value.to_string(),
            quote,
        }
    }

    /// Returns the unquoted name.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the quote style.
    pub fn quote(&self) -> QuoteCharacter {
        self.quote
    }
}

/// An owner qualifier (`o` in `o.order_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSegment {
    pub start: usize,
    pub stop: usize,
    pub identifier: IdentifierValue,
}

impl OwnerSegment {
    /// Creates an owner segment from its raw text.
    pub fn new(start: usize, stop: usize, text: &str) -> Self {
        Self {
            start,
            stop,
            identifier: IdentifierValue::parse(text),
        }
    }
}

/// A table reference; `start`/`stop` cover the table name only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSegment {
    pub start: usize,
    pub stop: usize,
    pub identifier: IdentifierValue,
    /// Schema qualifier, left untouched by rewriting.
    pub owner: Option<OwnerSegment>,
    pub alias: Option<String>,
}

impl TableSegment {
    /// Creates a table segment from its raw text.
    pub fn new(start: usize, stop: usize, text: &str) -> Self {
        Self {
            start,
            stop,
            identifier: IdentifierValue::parse(text),
            owner: None,
            alias: None,
        }
    }

    /// Sets the alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the schema qualifier.
    pub fn with_owner(mut self, owner: OwnerSegment) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Returns the unquoted table name.
    pub fn table_name(&self) -> &str {
        self.identifier.value()
    }
}

/// A column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSegment {
    pub start: usize,
    pub stop: usize,
    pub identifier: IdentifierValue,
    pub owner: Option<OwnerSegment>,
}

impl ColumnSegment {
    /// Creates a column segment from its raw text.
    pub fn new(start: usize, stop: usize, text: &str) -> Self {
        Self {
            start,
            stop,
            identifier: IdentifierValue::parse(text),
            owner: None,
        }
    }

    /// Sets the owner qualifier.
    pub fn with_owner(mut self, owner: OwnerSegment) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Returns the unquoted column name.
    pub fn name(&self) -> &str {
        self.identifier.value()
    }
}

/// A value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionSegment {
    /// A literal such as `1` or `'a'`.
    Literal {
        start: usize,
        stop: usize,
        value: SqlValue,
    },

    /// A `?` marker; `index` is its position in the parameter list.
    Parameter {
        start: usize,
        stop: usize,
        index: usize,
    },

    /// A column reference.
    Column(ColumnSegment),

    /// Anything else (function calls, arithmetic). Carries the number of
    /// parameter markers it contains.
    Complex {
        start: usize,
        stop: usize,
        parameter_count: usize,
    },
}

impl ExpressionSegment {
    /// Start offset.
    pub fn start(&self) -> usize {
        match self {
            ExpressionSegment::Literal { start, .. }
            | ExpressionSegment::Parameter { start, .. }
            | ExpressionSegment::Complex { start, .. } => *start,
            ExpressionSegment::Column(column) => column.start,
        }
    }

    /// Inclusive stop offset.
    pub fn stop(&self) -> usize {
        match self {
            ExpressionSegment::Literal { stop, .. }
            | ExpressionSegment::Parameter { stop, .. }
            | ExpressionSegment::Complex { stop, .. } => *stop,
            ExpressionSegment::Column(column) => column.stop,
        }
    }

    /// Evaluates a literal or parameter marker.
    ///
    /// Returns `None` for expressions whose value is only known to the
    /// database (columns, functions).
    pub fn evaluate(&self, parameters: &[SqlValue]) -> RouteResultOf<Option<SqlValue>> {
        match self {
            ExpressionSegment::Literal { value, .. } => Ok(Some(value.clone())),
            ExpressionSegment::Parameter { index, .. } => parameters
                .get(*index)
                .cloned()
                .map(Some)
                .ok_or(RouteError::ParameterOutOfRange {
                    index: *index,
                    count: parameters.len(),
                }),
            ExpressionSegment::Column(_) | ExpressionSegment::Complex { .. } => Ok(None),
        }
    }

    /// Number of `?` markers in the expression.
    pub fn parameter_count(&self) -> usize {
        match self {
            ExpressionSegment::Parameter { .. } => 1,
            ExpressionSegment::Complex {
                parameter_count, ..
            } => *parameter_count,
            _ => 0,
        }
    }
}

/// Comparison operators usable as shard conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// The right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateRightValue {
    /// `column <op> expr`.
    Compare {
        operator: CompareOperator,
        value: ExpressionSegment,
    },
    /// `column IN (...)`.
    In(Vec<ExpressionSegment>),
    /// `column BETWEEN lower AND upper`.
    Between {
        lower: ExpressionSegment,
        upper: ExpressionSegment,
    },
    /// `column = other_column`, a join condition.
    Column(ColumnSegment),
}

/// A single predicate with a column on its left side.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateSegment {
    pub start: usize,
    pub stop: usize,
    pub column: ColumnSegment,
    pub right: PredicateRightValue,
}

impl PredicateSegment {
    /// Creates `column = value`.
    pub fn equal(column: ColumnSegment, value: ExpressionSegment) -> Self {
        Self::compare(column, CompareOperator::Eq, value)
    }

    /// Creates `column <op> value`.
    pub fn compare(
        column: ColumnSegment,
        operator: CompareOperator,
        value: ExpressionSegment,
    ) -> Self {
        let (start, stop) = (column.start, value.stop());
        Self {
            start,
            stop,
            column,
            right: PredicateRightValue::Compare { operator, value },
        }
    }

    /// Creates `column IN (values)`; `stop` is the closing parenthesis.
    pub fn in_list(column: ColumnSegment, values: Vec<ExpressionSegment>, stop: usize) -> Self {
        Self {
            start: column.start,
            stop,
            column,
            right: PredicateRightValue::In(values),
        }
    }

    /// Creates `column BETWEEN lower AND upper`.
    pub fn between(
        column: ColumnSegment,
        lower: ExpressionSegment,
        upper: ExpressionSegment,
    ) -> Self {
        let (start, stop) = (column.start, upper.stop());
        Self {
            start,
            stop,
            column,
            right: PredicateRightValue::Between { lower, upper },
        }
    }

    /// Creates `column = other`.
    pub fn join(column: ColumnSegment, other: ColumnSegment) -> Self {
        let (start, stop) = (column.start, other.stop);
        Self {
            start,
            stop,
            column,
            right: PredicateRightValue::Column(other),
        }
    }

    /// Every column this predicate references.
    pub fn columns(&self) -> Vec<&ColumnSegment> {
        let mut columns = vec![&self.column];
        for expr in self.expressions() {
            if let ExpressionSegment::Column(column) = expr {
                columns.push(column);
            }
        }
        if let PredicateRightValue::Column(other) = &self.right {
            columns.push(other);
        }
        columns
    }

    fn expressions(&self) -> Vec<&ExpressionSegment> {
        match &self.right {
            PredicateRightValue::Compare { value, .. } => vec![value],
            PredicateRightValue::In(values) => values.iter().collect(),
            PredicateRightValue::Between { lower, upper } => vec![lower, upper],
            PredicateRightValue::Column(_) => Vec::new(),
        }
    }
}

/// A conjunction of predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AndPredicate {
    pub predicates: Vec<PredicateSegment>,
}

impl AndPredicate {
    /// Creates a conjunction.
    pub fn new(predicates: Vec<PredicateSegment>) -> Self {
        Self { predicates }
    }
}

/// A WHERE clause normalized to an OR of AND groups.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereSegment {
    pub start: usize,
    pub stop: usize,
    pub and_predicates: Vec<AndPredicate>,
}

impl WhereSegment {
    /// Creates a WHERE segment with a single AND group.
    pub fn and(start: usize, stop: usize, predicates: Vec<PredicateSegment>) -> Self {
        Self {
            start,
            stop,
            and_predicates: vec![AndPredicate::new(predicates)],
        }
    }

    /// Creates a WHERE segment from several OR-ed AND groups.
    pub fn or(start: usize, stop: usize, groups: Vec<AndPredicate>) -> Self {
        Self {
            start,
            stop,
            and_predicates: groups,
        }
    }
}

/// A SELECT projection.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionSegment {
    /// A column projection, optionally owner-qualified.
    Column(ColumnSegment),
    /// `*` or `owner.*`.
    Shorthand {
        start: usize,
        stop: usize,
        owner: Option<OwnerSegment>,
    },
    /// Any other expression.
    Expression { start: usize, stop: usize },
}

impl ProjectionSegment {
    /// The owner qualifier, if any.
    pub fn owner(&self) -> Option<&OwnerSegment> {
        match self {
            ProjectionSegment::Column(column) => column.owner.as_ref(),
            ProjectionSegment::Shorthand { owner, .. } => owner.as_ref(),
            ProjectionSegment::Expression { .. } => None,
        }
    }
}

/// An index name in DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSegment {
    pub start: usize,
    pub stop: usize,
    pub identifier: IdentifierValue,
}

impl IndexSegment {
    /// Creates an index segment from its raw text.
    pub fn new(start: usize, stop: usize, text: &str) -> Self {
        Self {
            start,
            stop,
            identifier: IdentifierValue::parse(text),
        }
    }
}

/// A LIMIT/OFFSET value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationValueSegment {
    /// A literal number.
    Literal { start: usize, stop: usize, value: i64 },
    /// A `?` marker.
    Parameter {
        start: usize,
        stop: usize,
        index: usize,
    },
}

impl PaginationValueSegment {
    /// Start offset.
    pub fn start(&self) -> usize {
        match self {
            PaginationValueSegment::Literal { start, .. }
            | PaginationValueSegment::Parameter { start, .. } => *start,
        }
    }

    /// Inclusive stop offset.
    pub fn stop(&self) -> usize {
        match self {
            PaginationValueSegment::Literal { stop, .. }
            | PaginationValueSegment::Parameter { stop, .. } => *stop,
        }
    }
}
