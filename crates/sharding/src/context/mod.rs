//! Statement context: the positioned, semantic view of a parsed statement.
//!
//! Parsing and binding happen outside this crate. The binder hands over a
//! [`StatementContext`] carrying every table, column, predicate, insert row
//! and pagination value together with its byte span in the original SQL.
//! Routing reads the semantics; token generators read the spans.

pub mod insert;
pub mod segment;
pub mod statement;
pub mod tables;

pub use insert::{
    InsertColumnsSegment, InsertStatementContext, InsertValueContext, InsertValuesSegment,
};
pub use segment::{
    AndPredicate, ColumnSegment, CompareOperator, ExpressionSegment, IdentifierValue, IndexSegment,
    OwnerSegment, PaginationValueSegment, PredicateRightValue, PredicateSegment, ProjectionSegment,
    QuoteCharacter, TableSegment, WhereSegment,
};
pub use statement::{
    DdlKind, PaginationContext, StatementContext, StatementContextBuilder, StatementKind,
};
pub use tables::TablesContext;
