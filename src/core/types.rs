use serde::{Deserialize, Serialize};

use super::{DataType, Value};

/// One stored row, values in descriptor column order.
pub type Row = Vec<Value>;

/// How the store treats a column on write. `Plain` columns hold whatever the
/// caller supplies; the other roles are server-managed and overwritten by the
/// store (create_time/update_time stamped, version counted from 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Plain,
    CreateTime,
    UpdateTime,
    Version,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub primary_key: bool,
    pub role: ColumnRole,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
            role: ColumnRole::Plain,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn create_time(mut self) -> Self {
        self.role = ColumnRole::CreateTime;
        self
    }

    pub fn update_time(mut self) -> Self {
        self.role = ColumnRole::UpdateTime;
        self
    }

    pub fn version(mut self) -> Self {
        self.role = ColumnRole::Version;
        self
    }

    pub fn validate(&self, value: &Value) -> crate::core::Result<()> {
        if value.is_null() {
            if !self.nullable {
                return Err(crate::core::Error::internal(
                    "rowwise.column",
                    format!("column '{}' cannot be NULL", self.name),
                ));
            }
            return Ok(());
        }
        if !self.data_type.is_compatible(value) {
            return Err(crate::core::Error::internal(
                "rowwise.column",
                format!(
                    "column '{}' expects type {}, got {}",
                    self.name,
                    self.data_type,
                    value.type_name()
                ),
            ));
        }
        Ok(())
    }
}

/// Per-resource-type schema descriptor, built once and registered as a
/// static. Replaces per-call shape reflection: the write engine and the store
/// both consult it for column order, primary-key flags and server-managed
/// roles.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    table: String,
    columns: Vec<Column>,
}

impl ResourceDescriptor {
    pub fn new(table: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column lookup is case-insensitive, matching how field-mask paths are
    /// supplied by callers.
    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(name))
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.find_column_index(name).map(|idx| &self.columns[idx])
    }

    pub fn primary_key_columns(&self) -> Vec<(usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, col)| col.primary_key)
            .collect()
    }

    pub fn version_column(&self) -> Option<&Column> {
        self.columns.iter().find(|col| col.role == ColumnRole::Version)
    }

    pub fn create_time_column(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.role == ColumnRole::CreateTime)
    }

    pub fn update_time_column(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.role == ColumnRole::UpdateTime)
    }

    pub fn version_column_index(&self) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.role == ColumnRole::Version)
    }
}

/// A raw SQL fragment with positional `?` arguments, supplied by the caller
/// through the `with_where` option or a lookup call.
#[derive(Debug, Clone)]
pub struct RawClause {
    pub clause: String,
    pub args: Vec<Value>,
}

impl RawClause {
    pub fn new(clause: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            clause: clause.into(),
            args,
        }
    }
}

/// Structured row-restricting predicate handed to the store. The engine only
/// ever composes equality sets, key-tuple alternation for batch deletes, raw
/// caller fragments, and conjunctions of those.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `col = value AND col = value ...`
    Eq(Vec<(String, Value)>),
    /// `(k1 = .. AND k2 = ..) OR (k1 = .. AND k2 = ..) ...` over key tuples.
    AnyOf(Vec<Vec<(String, Value)>>),
    /// Caller-supplied fragment, evaluated by the store dialect.
    Raw(RawClause),
    And(Vec<Predicate>),
}

impl Predicate {
    /// Collapses a list of parts into the smallest equivalent predicate.
    pub fn all(mut parts: Vec<Predicate>) -> Option<Predicate> {
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Predicate::And(parts)),
        }
    }
}
