//! Primary-key inference over arbitrary resource shapes.

use crate::core::{Error, Predicate, Result, Value};
use crate::resource::Resource;

/// The resolved primary key of a resource: column names paired with the
/// resource's current values for them.
#[derive(Debug, Clone)]
pub struct PrimaryKeys {
    pub columns: Vec<(String, Value)>,
}

impl PrimaryKeys {
    /// Names of key columns currently holding a zero value.
    pub fn zero_fields(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, v)| v.is_zero())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn any_zero(&self) -> bool {
        self.columns.iter().any(|(_, v)| v.is_zero())
    }
}

/// Resolves the primary-key column set for a resource.
///
/// Checks the public-id capability first, then private-id; either one makes
/// that single column the whole key and an empty value is an error. Resources
/// without identifier capabilities fall back to descriptor columns flagged
/// primary-key.
pub fn primary_key_columns<R: Resource>(resource: &R) -> Result<PrimaryKeys> {
    const OP: &str = "rowwise.primary_key_columns";

    if let Some(id) = resource.public_id() {
        if id.is_empty() {
            return Err(Error::invalid_parameter(OP, "missing public id"));
        }
        return Ok(PrimaryKeys {
            columns: vec![("public_id".to_string(), Value::Text(id.to_string()))],
        });
    }
    if let Some(id) = resource.private_id() {
        if id.is_empty() {
            return Err(Error::invalid_parameter(OP, "missing private id"));
        }
        return Ok(PrimaryKeys {
            columns: vec![("private_id".to_string(), Value::Text(id.to_string()))],
        });
    }

    let desc = R::descriptor();
    let row = resource.to_row();
    if row.len() != desc.column_count() {
        return Err(Error::invalid_parameter(
            OP,
            format!(
                "resource row has {} values, table {} has {} columns",
                row.len(),
                desc.table(),
                desc.column_count()
            ),
        ));
    }

    let columns: Vec<(String, Value)> = desc
        .primary_key_columns()
        .into_iter()
        .map(|(idx, col)| (col.name.clone(), row[idx].clone()))
        .collect();
    if columns.is_empty() {
        return Err(Error::invalid_parameter(
            OP,
            format!("no primary key(s) for {}", desc.table()),
        ));
    }
    Ok(PrimaryKeys { columns })
}

/// Builds the primary-key equality predicate for a resource, rejecting keys
/// with any zero column.
pub(crate) fn primary_key_predicate<R: Resource>(
    resource: &R,
    op: &'static str,
) -> Result<Predicate> {
    let keys = primary_key_columns(resource)?;
    let zero = keys.zero_fields();
    if !zero.is_empty() {
        return Err(Error::invalid_parameter(
            op,
            format!("primary key is not set for: {}", zero.join(", ")),
        ));
    }
    Ok(Predicate::Eq(keys.columns))
}
