//! Declarative upsert intent and its compilation into a single on-conflict
//! clause.

use crate::core::{Error, Result, Value};

/// What uniqueness target a colliding insert is judged against: either an
/// ordered column set forming a uniqueness constraint, or a named constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictTarget {
    Columns(Vec<String>),
    Constraint(String),
}

impl ConflictTarget {
    pub fn columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Columns(names.into_iter().map(Into::into).collect())
    }

    pub fn constraint(name: impl Into<String>) -> Self {
        Self::Constraint(name.into())
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Columns(cols) => cols.is_empty() || cols.iter().any(|c| c.is_empty()),
            Self::Constraint(name) => name.is_empty(),
        }
    }
}

/// The value side of an explicit conflict assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum SetValue {
    /// A literal value.
    Value(Value),
    /// A raw SQL expression with positional `?` arguments.
    Expr(String, Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    pub column: String,
    pub value: SetValue,
}

impl ColumnValue {
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: SetValue::Value(value.into()),
        }
    }

    pub fn expr(column: impl Into<String>, expr: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            column: column.into(),
            value: SetValue::Expr(expr.into(), args),
        }
    }
}

/// One declarative action to take when the insert collides with its target.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    /// Skip the insert, reporting zero affected rows.
    DoNothing,
    /// Overwrite every non-primary-key column from the incoming row.
    UpdateAll,
    /// Overwrite the listed columns from the incoming row.
    SetColumns(Vec<String>),
    /// Overwrite columns with explicit values or expressions.
    SetColumnValues(Vec<ColumnValue>),
}

impl ConflictAction {
    pub fn set_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::SetColumns(names.into_iter().map(Into::into).collect())
    }

    fn is_exclusive(&self) -> bool {
        matches!(self, Self::DoNothing | Self::UpdateAll)
    }
}

/// Declarative upsert intent attached to a Create call through the
/// `with_on_conflict` option.
#[derive(Debug, Clone)]
pub struct OnConflict {
    pub target: ConflictTarget,
    pub actions: Vec<ConflictAction>,
}

impl OnConflict {
    pub fn new(target: ConflictTarget, action: ConflictAction) -> Self {
        Self {
            target,
            actions: vec![action],
        }
    }

    /// Adds another action; only `SetColumns`/`SetColumnValues` combine.
    pub fn and_action(mut self, action: ConflictAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Compiles the declared intent into a single upsert clause.
    ///
    /// `DoNothing` and `UpdateAll` must be the sole action. `SetColumns` and
    /// `SetColumnValues` merge column-wise; when the same column is named
    /// more than once the last entry wins, keeping the position of the first
    /// occurrence.
    pub fn compile(&self) -> Result<UpsertClause> {
        const OP: &str = "rowwise.on_conflict";

        if self.target.is_empty() {
            return Err(Error::invalid_parameter(OP, "missing conflict target"));
        }
        if self.actions.is_empty() {
            return Err(Error::invalid_parameter(OP, "missing conflict action"));
        }
        if self.actions.iter().any(ConflictAction::is_exclusive) && self.actions.len() > 1 {
            return Err(Error::invalid_parameter(
                OP,
                "do-nothing and update-all cannot be combined with other actions",
            ));
        }

        let action = match &self.actions[0] {
            ConflictAction::DoNothing => UpsertAction::DoNothing,
            ConflictAction::UpdateAll => UpsertAction::UpdateAll,
            _ => {
                let mut assignments: Vec<Assignment> = Vec::new();
                for action in &self.actions {
                    match action {
                        ConflictAction::SetColumns(cols) => {
                            for col in cols {
                                upsert_assignment(
                                    &mut assignments,
                                    col,
                                    AssignmentSource::Excluded,
                                );
                            }
                        }
                        ConflictAction::SetColumnValues(col_values) => {
                            for cv in col_values {
                                let source = match &cv.value {
                                    SetValue::Value(v) => AssignmentSource::Value(v.clone()),
                                    SetValue::Expr(e, args) => {
                                        AssignmentSource::Expr(e.clone(), args.clone())
                                    }
                                };
                                upsert_assignment(&mut assignments, &cv.column, source);
                            }
                        }
                        ConflictAction::DoNothing | ConflictAction::UpdateAll => unreachable!(),
                    }
                }
                if assignments.is_empty() {
                    return Err(Error::invalid_parameter(OP, "empty set of conflict columns"));
                }
                UpsertAction::Set(assignments)
            }
        };

        Ok(UpsertClause {
            target: self.target.clone(),
            action,
        })
    }
}

fn upsert_assignment(assignments: &mut Vec<Assignment>, column: &str, source: AssignmentSource) {
    if let Some(existing) = assignments
        .iter_mut()
        .find(|a| a.column.eq_ignore_ascii_case(column))
    {
        existing.source = source;
    } else {
        assignments.push(Assignment {
            column: column.to_string(),
            source,
        });
    }
}

/// Where a compiled conflict assignment takes its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentSource {
    /// The incoming (excluded) row's value for the column.
    Excluded,
    Value(Value),
    Expr(String, Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub source: AssignmentSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertAction {
    DoNothing,
    UpdateAll,
    Set(Vec<Assignment>),
}

/// A compiled on-conflict clause, ready for the store to attach to a single
/// insert statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertClause {
    pub target: ConflictTarget,
    pub action: UpsertAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_do_nothing_compiles_alone() {
        let clause = OnConflict::new(
            ConflictTarget::columns(["public_id"]),
            ConflictAction::DoNothing,
        )
        .compile()
        .unwrap();
        assert_eq!(clause.action, UpsertAction::DoNothing);
    }

    #[test]
    fn test_empty_target_rejected() {
        let err = OnConflict::new(
            ConflictTarget::Columns(vec![]),
            ConflictAction::DoNothing,
        )
        .compile()
        .unwrap_err();
        assert!(err.is_invalid_parameter());

        let err = OnConflict::new(ConflictTarget::constraint(""), ConflictAction::UpdateAll)
            .compile()
            .unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_exclusive_action_cannot_combine() {
        let err = OnConflict::new(
            ConflictTarget::columns(["public_id"]),
            ConflictAction::DoNothing,
        )
        .and_action(ConflictAction::set_columns(["name"]))
        .compile()
        .unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_set_actions_merge_last_wins() {
        let clause = OnConflict::new(
            ConflictTarget::columns(["public_id"]),
            ConflictAction::set_columns(["name", "email"]),
        )
        .and_action(ConflictAction::SetColumnValues(vec![
            ColumnValue::new("name", "fixed"),
            ColumnValue::new("phone_number", Value::Null),
        ]))
        .compile()
        .unwrap();

        let UpsertAction::Set(assignments) = clause.action else {
            panic!("expected set action");
        };
        assert_eq!(assignments.len(), 3);
        // "name" keeps its first position but takes the later value
        assert_eq!(assignments[0].column, "name");
        assert_eq!(
            assignments[0].source,
            AssignmentSource::Value(Value::Text("fixed".into()))
        );
        assert_eq!(assignments[1].source, AssignmentSource::Excluded);
        assert_eq!(assignments[2].column, "phone_number");
    }

    #[test]
    fn test_empty_actions_rejected() {
        let oc = OnConflict {
            target: ConflictTarget::columns(["public_id"]),
            actions: vec![],
        };
        assert!(oc.compile().unwrap_err().is_invalid_parameter());

        let oc = OnConflict::new(
            ConflictTarget::columns(["public_id"]),
            ConflictAction::SetColumns(vec![]),
        );
        assert!(oc.compile().unwrap_err().is_invalid_parameter());
    }
}
