use std::slice;
use std::sync::atomic::Ordering;

use super::Rw;
use crate::conflict::UpsertAction;
use crate::core::{Error, Result, Row};
use crate::options::WriteOptions;
use crate::resource::{Resource, WriteOp};

impl Rw {
    /// Creates the resource in the store, then refreshes the caller's
    /// instance from the stored row (server timestamps, version counter,
    /// conflict-merged columns).
    ///
    /// Supported options: `with_before_write`, `with_after_write`,
    /// `with_on_conflict`, `with_version`, `with_where` (the latter two gate
    /// a conflict update against the existing row), `with_rows_affected`,
    /// `with_skip_vet_for_write`, `with_debug`. A do-nothing conflict that
    /// affected zero rows skips the read-after-write, leaving the instance
    /// as the caller populated it.
    pub async fn create<R: Resource>(&self, resource: &mut R, opts: WriteOptions<R>) -> Result<()> {
        const OP: &str = "rowwise.create";

        if !opts.skip_vet_for_write {
            resource.vet_for_write(WriteOp::Create)?;
        }
        if let Some(before) = &opts.before_write {
            before(slice::from_ref(resource)).map_err(|e| Error::BeforeWrite(OP, e.into()))?;
        }

        let upsert = match &opts.on_conflict {
            Some(oc) => Some(oc.compile()?),
            None => None,
        };
        let restrict = Self::restriction_from_opts(&opts, OP)?;
        let desc = R::descriptor();

        let affected = self
            .db
            .store()
            .insert(desc, vec![resource.to_row()], upsert.as_ref(), restrict.as_ref())
            .await?;
        self.trace_stmt(opts.debug, OP, desc.table(), affected);
        if let Some(counter) = &opts.rows_affected {
            counter.store(affected, Ordering::SeqCst);
        }

        if affected > 0 {
            if let Some(after) = &opts.after_write {
                after(slice::from_ref(resource), affected).map_err(|e| Error::AfterWrite(OP, e.into()))?;
            }
        }

        let conflict_did_nothing = affected == 0
            && matches!(
                upsert.as_ref().map(|u| &u.action),
                Some(UpsertAction::DoNothing)
            );
        if !conflict_did_nothing {
            self.lookup_after_write(resource, OP).await?;
        }
        Ok(())
    }

    /// Creates a batch of resources of one shape in a single bulk statement.
    ///
    /// The batch must be non-empty and `with_lookup` is not supported; hooks
    /// and vetting see the entire batch. Conflict and row-count options are
    /// plumbed exactly as for [`Rw::create`]. Instances are not refreshed.
    pub async fn create_items<R: Resource>(&self, items: &[R], opts: WriteOptions<R>) -> Result<()> {
        const OP: &str = "rowwise.create_items";

        if items.is_empty() {
            return Err(Error::invalid_parameter(OP, "missing items"));
        }
        if opts.lookup.is_some() {
            return Err(Error::invalid_parameter(
                OP,
                "with_lookup is not a supported option",
            ));
        }
        if !opts.skip_vet_for_write {
            for item in items {
                item.vet_for_write(WriteOp::Create)?;
            }
        }
        if let Some(before) = &opts.before_write {
            before(items).map_err(|e| Error::BeforeWrite(OP, e.into()))?;
        }

        let upsert = match &opts.on_conflict {
            Some(oc) => Some(oc.compile()?),
            None => None,
        };
        let restrict = Self::restriction_from_opts(&opts, OP)?;
        let desc = R::descriptor();
        let rows: Vec<Row> = items.iter().map(Resource::to_row).collect();

        let affected = self
            .db
            .store()
            .insert(desc, rows, upsert.as_ref(), restrict.as_ref())
            .await?;
        self.trace_stmt(opts.debug, OP, desc.table(), affected);
        if let Some(counter) = &opts.rows_affected {
            counter.store(affected, Ordering::SeqCst);
        }

        if affected > 0 {
            if let Some(after) = &opts.after_write {
                after(items, affected).map_err(|e| Error::AfterWrite(OP, e.into()))?;
            }
        }
        Ok(())
    }
}
