use std::collections::BTreeMap;

use chrono::Utc;

use crate::conflict::{AssignmentSource, ConflictTarget, UpsertAction, UpsertClause};
use crate::core::{ColumnRole, Error, Predicate, ResourceDescriptor, Result, Row, Value};
use crate::storage::filter;

/// One in-memory table: a descriptor plus rows keyed by insertion id.
///
/// Server-managed columns are owned by the table, the way a relational store
/// owns them through defaults and triggers: create_time/update_time are
/// stamped here and the version counter starts at 1 and increments on every
/// row update, whatever the incoming row claims.
#[derive(Debug, Clone)]
pub struct Table {
    desc: ResourceDescriptor,
    rows: BTreeMap<usize, Row>,
    next_row_id: usize,
}

impl Table {
    pub fn new(desc: ResourceDescriptor) -> Self {
        Self {
            desc,
            rows: BTreeMap::new(),
            next_row_id: 0,
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.desc
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Inserts one row, applying the compiled on-conflict action when the row
    /// collides with the clause's uniqueness target. Returns the number of
    /// rows the statement affected (0 for a do-nothing collision or a
    /// restrict predicate that excluded the existing row).
    pub fn insert(
        &mut self,
        mut row: Row,
        on_conflict: Option<&UpsertClause>,
        restrict: Option<&Predicate>,
    ) -> Result<i64> {
        const OP: &str = "memstore.insert";

        if row.len() != self.desc.column_count() {
            return Err(Error::internal(
                OP,
                format!(
                    "row has {} values, table {} has {} columns",
                    row.len(),
                    self.desc.table(),
                    self.desc.column_count()
                ),
            ));
        }

        let now = Value::Timestamp(Utc::now());
        if let Some(idx) = self.desc.create_time_column() {
            row[idx] = now.clone();
        }
        if let Some(idx) = self.desc.update_time_column() {
            row[idx] = now;
        }
        if let Some(idx) = self.desc.version_column_index() {
            row[idx] = Value::Integer(1);
        }
        self.validate_row(&row)?;

        if let Some(clause) = on_conflict {
            let target = self.target_indices(&clause.target)?;
            if let Some(id) = self.find_by_columns(&target, &row) {
                return self.apply_conflict_action(id, &row, clause, restrict);
            }
        }

        let pk: Vec<usize> = self
            .desc
            .primary_key_columns()
            .into_iter()
            .map(|(idx, _)| idx)
            .collect();
        if !pk.is_empty() && self.find_by_columns(&pk, &row).is_some() {
            return Err(Error::internal(
                OP,
                format!(
                    "unique constraint violation on {} primary key",
                    self.desc.table()
                ),
            ));
        }

        let id = self.next_row_id;
        self.next_row_id += 1;
        self.rows.insert(id, row);
        Ok(1)
    }

    /// Applies assignments to every row matching the predicate, bumping the
    /// server-managed update_time/version columns per touched row.
    pub fn update_where(
        &mut self,
        assignments: &[(String, Value)],
        pred: &Predicate,
    ) -> Result<i64> {
        const OP: &str = "memstore.update";

        let ids = self.matching_ids(pred)?;
        for id in &ids {
            let existing = self
                .rows
                .get(id)
                .cloned()
                .ok_or_else(|| Error::internal(OP, "row vanished during update"))?;
            let mut updated = existing.clone();
            for (name, value) in assignments {
                let idx = self.desc.find_column_index(name).ok_or_else(|| {
                    Error::internal(
                        OP,
                        format!("column '{}' not found in {}", name, self.desc.table()),
                    )
                })?;
                updated[idx] = value.clone();
            }
            self.touch(&existing, &mut updated);
            self.validate_row(&updated)?;
            self.rows.insert(*id, updated);
        }
        Ok(ids.len() as i64)
    }

    pub fn delete_where(&mut self, pred: &Predicate) -> Result<i64> {
        let ids = self.matching_ids(pred)?;
        for id in &ids {
            self.rows.remove(id);
        }
        Ok(ids.len() as i64)
    }

    /// First row matching the predicate, in insertion order.
    pub fn find_first(&self, pred: &Predicate) -> Result<Option<Row>> {
        for row in self.rows.values() {
            if filter::row_matches(&self.desc, row, pred)? {
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    fn matching_ids(&self, pred: &Predicate) -> Result<Vec<usize>> {
        let mut ids = Vec::new();
        for (id, row) in &self.rows {
            if filter::row_matches(&self.desc, row, pred)? {
                ids.push(*id);
            }
        }
        Ok(ids)
    }

    fn apply_conflict_action(
        &mut self,
        id: usize,
        incoming: &Row,
        clause: &UpsertClause,
        restrict: Option<&Predicate>,
    ) -> Result<i64> {
        const OP: &str = "memstore.insert";

        if clause.action == UpsertAction::DoNothing {
            return Ok(0);
        }

        let existing = self
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::internal(OP, "row vanished during upsert"))?;
        if let Some(pred) = restrict {
            if !filter::row_matches(&self.desc, &existing, pred)? {
                return Ok(0);
            }
        }

        let mut updated = existing.clone();
        match &clause.action {
            UpsertAction::UpdateAll => {
                for (idx, col) in self.desc.columns().iter().enumerate() {
                    if col.primary_key || col.role == ColumnRole::CreateTime {
                        continue;
                    }
                    updated[idx] = incoming[idx].clone();
                }
            }
            UpsertAction::Set(assignments) => {
                for a in assignments {
                    let idx = self.desc.find_column_index(&a.column).ok_or_else(|| {
                        Error::internal(
                            OP,
                            format!("column '{}' not found in {}", a.column, self.desc.table()),
                        )
                    })?;
                    updated[idx] = match &a.source {
                        AssignmentSource::Excluded => incoming[idx].clone(),
                        AssignmentSource::Value(v) => v.clone(),
                        AssignmentSource::Expr(expr, args) => {
                            filter::eval_value_expr(&self.desc, &existing, expr, args)?
                        }
                    };
                }
            }
            UpsertAction::DoNothing => return Ok(0),
        }

        self.touch(&existing, &mut updated);
        self.validate_row(&updated)?;
        self.rows.insert(id, updated);
        Ok(1)
    }

    /// Server-managed column maintenance for a row update: fresh
    /// update_time, version counted up from the stored row.
    fn touch(&self, existing: &Row, updated: &mut Row) {
        if let Some(idx) = self.desc.update_time_column() {
            updated[idx] = Value::Timestamp(Utc::now());
        }
        if let Some(idx) = self.desc.version_column_index() {
            let old = existing[idx].as_i64().unwrap_or(0);
            updated[idx] = Value::Integer(old + 1);
        }
    }

    fn validate_row(&self, row: &Row) -> Result<()> {
        for (idx, col) in self.desc.columns().iter().enumerate() {
            col.validate(&row[idx])?;
        }
        Ok(())
    }

    fn target_indices(&self, target: &ConflictTarget) -> Result<Vec<usize>> {
        const OP: &str = "memstore.insert";

        match target {
            ConflictTarget::Columns(names) => {
                let mut idxs = Vec::with_capacity(names.len());
                for name in names {
                    idxs.push(self.desc.find_column_index(name).ok_or_else(|| {
                        Error::invalid_parameter(
                            OP,
                            format!(
                                "conflict target column '{}' not found in {}",
                                name,
                                self.desc.table()
                            ),
                        )
                    })?);
                }
                Ok(idxs)
            }
            // a named constraint resolves to the table's primary key
            ConflictTarget::Constraint(_) => {
                let pk: Vec<usize> = self
                    .desc
                    .primary_key_columns()
                    .into_iter()
                    .map(|(idx, _)| idx)
                    .collect();
                if pk.is_empty() {
                    return Err(Error::invalid_parameter(
                        OP,
                        format!("table {} has no primary key", self.desc.table()),
                    ));
                }
                Ok(pk)
            }
        }
    }

    /// First row equal to `row` on every listed column. NULLs never collide,
    /// matching unique-index behavior.
    fn find_by_columns(&self, idxs: &[usize], row: &Row) -> Option<usize> {
        if idxs.is_empty() || idxs.iter().any(|&i| row[i].is_null()) {
            return None;
        }
        self.rows
            .iter()
            .find(|(_, existing)| idxs.iter().all(|&i| existing[i] == row[i]))
            .map(|(id, _)| *id)
    }
}
