//! The write engine and its lookup collaborator.

mod create;
mod delete;
mod lookup;
mod update;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::{Error, Predicate, Result, Value};
use crate::options::WriteOptions;
use crate::resource::Resource;
use crate::storage::Store;

/// Handle to a store. Cheap to clone; every clone shares the underlying
/// store (which owns its own connection handling) and the debug toggle, so
/// many [`Rw`] values can operate over one `Db` concurrently.
#[derive(Clone)]
pub struct Db {
    store: Arc<dyn Store>,
    debug: Arc<AtomicBool>,
}

impl Db {
    pub fn new(store: impl Store + 'static) -> Self {
        Self {
            store: Arc::new(store),
            debug: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Enables or disables connection-wide statement logging. Per-call
    /// `with_debug` has the same effect for a single operation.
    pub fn debug(&self, on: bool) {
        self.debug.store(on, Ordering::Relaxed);
    }

    pub(crate) fn debug_enabled(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    pub(crate) fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}

/// Read/write engine over a [`Db`]. One logical operation per call; all
/// cross-call state lives in the store, so `Rw` values are freely shareable.
/// Transaction boundaries belong to the caller.
pub struct Rw {
    db: Db,
}

impl Rw {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    /// The optional version-equality condition from the call options. Zero is
    /// never a valid concurrency token, and the resource's descriptor must
    /// actually carry a version column.
    pub(crate) fn version_condition<R: Resource>(
        opts: &WriteOptions<R>,
        op: &'static str,
    ) -> Result<Option<(String, Value)>> {
        match opts.version {
            None => Ok(None),
            Some(0) => Err(Error::invalid_parameter(op, "with version option is zero")),
            Some(v) => {
                let desc = R::descriptor();
                let col = desc.version_column().ok_or_else(|| {
                    Error::invalid_parameter(
                        op,
                        format!("{} does not have a version field", desc.table()),
                    )
                })?;
                Ok(Some((col.name.clone(), Value::Integer(i64::from(v)))))
            }
        }
    }

    /// Row-restricting predicate assembled from the version and where
    /// options, without the primary-key clause. Used to gate conflict
    /// updates on Create.
    pub(crate) fn restriction_from_opts<R: Resource>(
        opts: &WriteOptions<R>,
        op: &'static str,
    ) -> Result<Option<Predicate>> {
        let mut parts = Vec::new();
        if let Some(cond) = Self::version_condition(opts, op)? {
            parts.push(Predicate::Eq(vec![cond]));
        }
        if let Some(raw) = &opts.where_clause {
            parts.push(Predicate::Raw(raw.clone()));
        }
        Ok(Predicate::all(parts))
    }

    /// Re-fetches the resource by primary key so the caller's instance is
    /// correctly initialized from the store (generated timestamps, version).
    pub(crate) async fn lookup_after_write<R: Resource>(
        &self,
        resource: &mut R,
        op: &'static str,
    ) -> Result<()> {
        let pred = crate::keys::primary_key_predicate(resource, op)?;
        let row = self.db.store().fetch_one(R::descriptor(), &pred).await?;
        resource.apply_row(&row)
    }

    pub(crate) fn trace_stmt(&self, per_call: bool, op: &'static str, table: &str, rows: i64) {
        if per_call || self.db.debug_enabled() {
            tracing::info!(target: "rowwise::stmt", op, table, rows_affected = rows);
        } else {
            tracing::debug!(target: "rowwise::stmt", op, table, rows_affected = rows);
        }
    }
}
