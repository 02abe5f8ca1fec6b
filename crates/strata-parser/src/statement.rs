//! Analyzed statement model.

use strata_core::{ShardingValue, SqlValue};

/// Everything routing and rewriting need to know about one statement.
#[derive(Debug, Clone)]
pub struct StatementContext {
    /// The statement kind.
    pub kind: StatementKind,

    /// Tables referenced by the statement, in appearance order.
    pub tables: Vec<TableReference>,

    /// INSERT structure, present for INSERT ... VALUES statements.
    pub insert: Option<InsertContext>,

    /// Equality predicates of the WHERE conjunction, in appearance order.
    /// Only simple `column = value` terms joined by AND are surfaced.
    pub where_predicates: Vec<EqualityPredicate>,

    /// Values produced for an auto-generated key column, one per INSERT
    /// value row. Filled during routing; consumed by the caller for
    /// returned-keys support.
    pub generated_key_values: Vec<ShardingValue>,
}

impl StatementContext {
    /// Whether this statement is a plain (non-locking) SELECT.
    pub fn is_plain_select(&self) -> bool {
        matches!(self.kind, StatementKind::Select { has_lock: false })
    }

    /// The first referenced table name, if any.
    pub fn primary_table(&self) -> Option<&str> {
        self.tables.first().map(|t| t.name.as_str())
    }
}

/// Statement classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select {
        /// The query carries a lock clause (e.g. FOR UPDATE).
        has_lock: bool,
    },
    Insert,
    Update,
    Delete,
    Ddl,
    Other,
}

/// A reference to a table in a SQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReference {
    /// The table name as written (schema prefix stripped).
    pub name: String,
    /// Optional alias.
    pub alias: Option<String>,
}

/// INSERT ... VALUES structure.
#[derive(Debug, Clone)]
pub struct InsertContext {
    /// The target table.
    pub table: String,

    /// Column names in declaration order.
    pub columns: Vec<String>,

    /// Value rows, each an ordered list of column expressions.
    pub value_rows: Vec<Vec<ValueExpr>>,
}

impl InsertContext {
    pub fn row_count(&self) -> usize {
        self.value_rows.len()
    }
}

/// One value expression inside a VALUES row or a WHERE equality.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    /// A literal value, including NULL.
    Literal(SqlValue),

    /// A `?` parameter marker, resolved by its position in the bound
    /// parameter list.
    Marker(usize),

    /// A current-time expression such as `now()`.
    Now,

    /// Anything else (nested expressions, function calls).
    Complex,
}

/// A `column = value` term of a WHERE conjunction.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualityPredicate {
    pub column: String,
    pub value: ValueExpr,
}
