//! Statement contexts handed over by the binder.

use crate::context::insert::InsertStatementContext;
use crate::context::segment::{
    ColumnSegment, IndexSegment, PaginationValueSegment, ProjectionSegment, TableSegment,
    WhereSegment,
};
use crate::context::tables::TablesContext;

/// Kinds of DDL statements the router distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdlKind {
    /// `CREATE TABLE`
    CreateTable,
    /// `ALTER TABLE`
    AlterTable,
    /// `DROP TABLE`
    DropTable,
    /// `TRUNCATE TABLE`
    Truncate,
    /// `CREATE INDEX`
    CreateIndex,
    /// `DROP INDEX`
    DropIndex,
    /// Anything else, such as `CREATE SCHEMA`.
    Other,
}

/// The statement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `SELECT`
    Select,
    /// `INSERT`
    Insert,
    /// `UPDATE`
    Update,
    /// `DELETE`
    Delete,
    /// Data definition.
    Ddl(DdlKind),
    /// Data control (`GRANT`, `REVOKE`, ...).
    Dcl,
    /// Administrative statements (`SHOW`, `DESCRIBE`, ...).
    Dal,
}

impl StatementKind {
    /// Returns true for SELECT/INSERT/UPDATE/DELETE.
    pub fn is_dml(self) -> bool {
        matches!(
            self,
            StatementKind::Select
                | StatementKind::Insert
                | StatementKind::Update
                | StatementKind::Delete
        )
    }
}

/// `LIMIT`/`OFFSET` of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationContext {
    /// The offset value.
    pub offset: Option<PaginationValueSegment>,
    /// The row count value.
    pub row_count: Option<PaginationValueSegment>,
}

/// The semantic view of one parsed statement.
#[derive(Debug, Clone)]
pub struct StatementContext {
    sql: String,
    kind: StatementKind,
    tables: TablesContext,
    where_segment: Option<WhereSegment>,
    projections: Vec<ProjectionSegment>,
    group_by: Vec<ColumnSegment>,
    order_by: Vec<ColumnSegment>,
    pagination: Option<PaginationContext>,
    insert: Option<InsertStatementContext>,
    indexes: Vec<IndexSegment>,
}

impl StatementContext {
    /// Creates a builder.
    pub fn builder(kind: StatementKind, sql: impl Into<String>) -> StatementContextBuilder {
        StatementContextBuilder::new(kind, sql)
    }

    /// The original SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The statement category.
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Referenced tables.
    pub fn tables(&self) -> &TablesContext {
        &self.tables
    }

    /// The WHERE clause.
    pub fn where_segment(&self) -> Option<&WhereSegment> {
        self.where_segment.as_ref()
    }

    /// SELECT projections.
    pub fn projections(&self) -> &[ProjectionSegment] {
        &self.projections
    }

    /// GROUP BY columns.
    pub fn group_by(&self) -> &[ColumnSegment] {
        &self.group_by
    }

    /// ORDER BY columns.
    pub fn order_by(&self) -> &[ColumnSegment] {
        &self.order_by
    }

    /// Pagination.
    pub fn pagination(&self) -> Option<&PaginationContext> {
        self.pagination.as_ref()
    }

    /// INSERT details.
    pub fn insert(&self) -> Option<&InsertStatementContext> {
        self.insert.as_ref()
    }

    /// Index names of DDL statements.
    pub fn indexes(&self) -> &[IndexSegment] {
        &self.indexes
    }

    /// Every column segment whose owner may need rewriting.
    pub fn owned_columns(&self) -> Vec<&ColumnSegment> {
        let mut columns: Vec<&ColumnSegment> = Vec::new();
        if let Some(where_segment) = &self.where_segment {
            for group in &where_segment.and_predicates {
                for predicate in &group.predicates {
                    columns.extend(predicate.columns());
                }
            }
        }
        columns.extend(self.group_by.iter());
        columns.extend(self.order_by.iter());
        columns.retain(|c| c.owner.is_some());
        columns
    }
}

/// Builder for [`StatementContext`].
#[derive(Debug)]
pub struct StatementContextBuilder {
    context: StatementContext,
    tables: Vec<TableSegment>,
}

impl StatementContextBuilder {
    /// Creates a builder.
    pub fn new(kind: StatementKind, sql: impl Into<String>) -> Self {
        Self {
            context: StatementContext {
                sql: sql.into(),
                kind,
                tables: TablesContext::default(),
                where_segment: None,
                projections: Vec::new(),
                group_by: Vec::new(),
                order_by: Vec::new(),
                pagination: None,
                insert: None,
                indexes: Vec::new(),
            },
            tables: Vec::new(),
        }
    }

    /// Adds a table reference.
    pub fn table(mut self, table: TableSegment) -> Self {
        self.tables.push(table);
        self
    }

    /// Sets the WHERE clause.
    pub fn where_segment(mut self, where_segment: WhereSegment) -> Self {
        self.context.where_segment = Some(where_segment);
        self
    }

    /// Adds a projection.
    pub fn projection(mut self, projection: ProjectionSegment) -> Self {
        self.context.projections.push(projection);
        self
    }

    /// Adds a GROUP BY column.
    pub fn group_by(mut self, column: ColumnSegment) -> Self {
        self.context.group_by.push(column);
        self
    }

    /// Adds an ORDER BY column.
    pub fn order_by(mut self, column: ColumnSegment) -> Self {
        self.context.order_by.push(column);
        self
    }

    /// Sets pagination.
    pub fn pagination(
        mut self,
        offset: Option<PaginationValueSegment>,
        row_count: Option<PaginationValueSegment>,
    ) -> Self {
        self.context.pagination = Some(PaginationContext { offset, row_count });
        self
    }

    /// Sets INSERT details.
    pub fn insert(mut self, insert: InsertStatementContext) -> Self {
        self.context.insert = Some(insert);
        self
    }

    /// Adds an index name.
    pub fn index(mut self, index: IndexSegment) -> Self {
        self.context.indexes.push(index);
        self
    }

    /// Finishes the context.
    pub fn build(mut self) -> StatementContext {
        self.context.tables = TablesContext::new(self.tables);
        self.context
    }
}
