use std::slice;
use std::sync::atomic::Ordering;

use super::Rw;
use crate::core::{Error, Predicate, Result};
use crate::keys;
use crate::options::WriteOptions;
use crate::resource::{Resource, WriteOp};

impl Rw {
    /// Deletes the row identified by the resource's primary key, optionally
    /// restricted further by `with_where`. Returns the number of rows
    /// deleted; zero matching rows (already absent, or excluded by the
    /// predicate) is success.
    pub async fn delete<R: Resource>(&self, resource: &R, opts: WriteOptions<R>) -> Result<i64> {
        const OP: &str = "rowwise.delete";

        let pk = keys::primary_key_predicate(resource, OP)?;
        if !opts.skip_vet_for_write {
            resource.vet_for_write(WriteOp::Delete)?;
        }
        if let Some(before) = &opts.before_write {
            before(slice::from_ref(resource)).map_err(|e| Error::BeforeWrite(OP, e.into()))?;
        }

        let pred = match &opts.where_clause {
            Some(raw) => Predicate::And(vec![pk, Predicate::Raw(raw.clone())]),
            None => pk,
        };

        let desc = R::descriptor();
        let affected = self.db.store().delete(desc, &pred).await?;
        self.trace_stmt(opts.debug, OP, desc.table(), affected);
        if let Some(counter) = &opts.rows_affected {
            counter.store(affected, Ordering::SeqCst);
        }

        if affected > 0 {
            if let Some(after) = &opts.after_write {
                after(slice::from_ref(resource), affected).map_err(|e| Error::AfterWrite(OP, e.into()))?;
            }
        }
        Ok(affected)
    }

    /// Deletes a batch of resources of one shape in a single statement keyed
    /// by the batch's combined primary keys. The batch must be non-empty and
    /// `with_lookup` is not supported; hooks see the batch and the aggregate
    /// count.
    pub async fn delete_items<R: Resource>(
        &self,
        items: &[R],
        opts: WriteOptions<R>,
    ) -> Result<i64> {
        const OP: &str = "rowwise.delete_items";

        if items.is_empty() {
            return Err(Error::invalid_parameter(OP, "missing items"));
        }
        if opts.lookup.is_some() {
            return Err(Error::invalid_parameter(
                OP,
                "with_lookup is not a supported option",
            ));
        }

        let mut tuples = Vec::with_capacity(items.len());
        for item in items {
            let keys = keys::primary_key_columns(item)?;
            let zero = keys.zero_fields();
            if !zero.is_empty() {
                return Err(Error::invalid_parameter(
                    OP,
                    format!("primary key is not set for: {}", zero.join(", ")),
                ));
            }
            tuples.push(keys.columns);
        }
        if !opts.skip_vet_for_write {
            for item in items {
                item.vet_for_write(WriteOp::Delete)?;
            }
        }
        if let Some(before) = &opts.before_write {
            before(items).map_err(|e| Error::BeforeWrite(OP, e.into()))?;
        }

        let keyed = Predicate::AnyOf(tuples);
        let pred = match &opts.where_clause {
            Some(raw) => Predicate::And(vec![keyed, Predicate::Raw(raw.clone())]),
            None => keyed,
        };

        let desc = R::descriptor();
        let affected = self.db.store().delete(desc, &pred).await?;
        self.trace_stmt(opts.debug, OP, desc.table(), affected);
        if let Some(counter) = &opts.rows_affected {
            counter.store(affected, Ordering::SeqCst);
        }

        if affected > 0 {
            if let Some(after) = &opts.after_write {
                after(items, affected).map_err(|e| Error::AfterWrite(OP, e.into()))?;
            }
        }
        Ok(affected)
    }
}
