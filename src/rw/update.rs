use std::slice;
use std::sync::atomic::Ordering;

use super::Rw;
use crate::core::{Error, Predicate, Result};
use crate::fieldmask;
use crate::keys;
use crate::options::WriteOptions;
use crate::resource::{Resource, WriteOp};

impl Rw {
    /// Updates the columns named by `set_paths` (to the resource's current
    /// in-memory values) and `null_paths` (to NULL), targeting rows by
    /// primary-key equality. Returns the number of rows updated.
    ///
    /// Supported options: `with_before_write`, `with_after_write`,
    /// `with_where`, `with_version`, `with_skip_vet_for_write`,
    /// `with_debug`. With `with_version` the update only matches a row whose
    /// stored version equals the token, making the call an optimistic lock;
    /// a non-matching version or predicate yields `Ok(0)`, not an error.
    /// The caller's instance is always refreshed from the store afterwards.
    pub async fn update<R: Resource>(
        &self,
        resource: &mut R,
        set_paths: &[&str],
        null_paths: &[&str],
        opts: WriteOptions<R>,
    ) -> Result<i64> {
        const OP: &str = "rowwise.update";

        if set_paths.is_empty() && null_paths.is_empty() {
            return Err(Error::invalid_parameter(
                OP,
                "both set paths and set-to-null paths are missing",
            ));
        }
        let fields = fieldmask::resolve_update_fields(resource, set_paths, null_paths)?;

        let pk = keys::primary_key_columns(resource)?;
        let zero = pk.zero_fields();
        if !zero.is_empty() {
            return Err(Error::invalid_parameter(
                OP,
                format!("primary key is not set for: {}", zero.join(", ")),
            ));
        }
        for (name, _) in &pk.columns {
            if set_paths.iter().any(|p| p.eq_ignore_ascii_case(name)) {
                return Err(Error::invalid_field_mask(
                    OP,
                    format!("not allowed on primary key field {name}"),
                ));
            }
        }

        if !opts.skip_vet_for_write {
            resource.vet_for_write(WriteOp::Update {
                set_paths,
                null_paths,
            })?;
        }
        if let Some(before) = &opts.before_write {
            before(slice::from_ref(resource)).map_err(|e| Error::BeforeWrite(OP, e.into()))?;
        }

        let mut conds = pk.columns.clone();
        if let Some(cond) = Self::version_condition(&opts, OP)? {
            conds.push(cond);
        }
        let pred = match &opts.where_clause {
            Some(raw) => Predicate::And(vec![
                Predicate::Eq(conds),
                Predicate::Raw(raw.clone()),
            ]),
            None => Predicate::Eq(conds),
        };

        let desc = R::descriptor();
        let affected = self.db.store().update(desc, &fields, &pred).await?;
        self.trace_stmt(opts.debug, OP, desc.table(), affected);
        if let Some(counter) = &opts.rows_affected {
            counter.store(affected, Ordering::SeqCst);
        }

        if affected > 0 {
            if let Some(after) = &opts.after_write {
                after(slice::from_ref(resource), affected).map_err(|e| Error::AfterWrite(OP, e.into()))?;
            }
        }

        // the caller's instance must reflect the stored row even when the
        // version gate or predicate matched nothing
        self.lookup_after_write(resource, OP).await?;
        Ok(affected)
    }
}
