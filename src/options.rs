//! Per-call configuration for the mutating operations.

use std::sync::Arc;
use std::sync::atomic::AtomicI64;

use crate::conflict::OnConflict;
use crate::core::{RawClause, Value};

/// Hook run before a mutation is issued. Receives the resource(s) being
/// written; single-row calls pass a one-element slice, batch calls pass the
/// whole batch. Returning an error aborts the operation before any storage
/// access.
pub type BeforeWriteFn<R> = Box<dyn Fn(&[R]) -> anyhow::Result<()> + Send + Sync>;

/// Hook run after a mutation, with the affected-row count. Only invoked when
/// at least one row was touched. Its error propagates but does not undo the
/// mutation; transactions belong to the caller.
pub type AfterWriteFn<R> = Box<dyn Fn(&[R], i64) -> anyhow::Result<()> + Send + Sync>;

/// Immutable per-call configuration, assembled builder-style:
///
/// ```ignore
/// let opts = WriteOptions::new()
///     .with_version(2)
///     .with_where("email is not null", vec![]);
/// rw.update(&mut user, &["name"], &[], opts).await?;
/// ```
///
/// Unset options take the documented defaults: no hooks, no extra predicate,
/// no version gate, no conflict policy, vetting enabled.
pub struct WriteOptions<R> {
    pub(crate) before_write: Option<BeforeWriteFn<R>>,
    pub(crate) after_write: Option<AfterWriteFn<R>>,
    pub(crate) where_clause: Option<RawClause>,
    pub(crate) version: Option<u32>,
    pub(crate) on_conflict: Option<OnConflict>,
    pub(crate) rows_affected: Option<Arc<AtomicI64>>,
    pub(crate) lookup: Option<bool>,
    pub(crate) skip_vet_for_write: bool,
    pub(crate) debug: bool,
}

impl<R> Default for WriteOptions<R> {
    fn default() -> Self {
        Self {
            before_write: None,
            after_write: None,
            where_clause: None,
            version: None,
            on_conflict: None,
            rows_affected: None,
            lookup: None,
            skip_vet_for_write: false,
            debug: false,
        }
    }
}

impl<R> WriteOptions<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_before_write(
        mut self,
        f: impl Fn(&[R]) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.before_write = Some(Box::new(f));
        self
    }

    pub fn with_after_write(
        mut self,
        f: impl Fn(&[R], i64) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.after_write = Some(Box::new(f));
        self
    }

    /// Additional row-restricting predicate, ANDed with the primary-key
    /// clause (and the version clause, if any). `?` placeholders bind `args`
    /// positionally.
    pub fn with_where(mut self, clause: impl Into<String>, args: Vec<Value>) -> Self {
        self.where_clause = Some(RawClause::new(clause, args));
        self
    }

    /// Optimistic-concurrency token: the write only matches rows whose
    /// version column equals `version`. Zero is not a valid token.
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_on_conflict(mut self, on_conflict: OnConflict) -> Self {
        self.on_conflict = Some(on_conflict);
        self
    }

    /// Shared counter receiving the statement's affected-row count.
    pub fn with_rows_affected(mut self, counter: Arc<AtomicI64>) -> Self {
        self.rows_affected = Some(counter);
        self
    }

    /// Read-after-write control. Single-row Create/Update always refresh the
    /// caller's instance; batch operations reject this option.
    pub fn with_lookup(mut self, lookup: bool) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Suppresses the resource's own `vet_for_write` self-validation.
    pub fn with_skip_vet_for_write(mut self, skip: bool) -> Self {
        self.skip_vet_for_write = skip;
        self
    }

    /// Emits the issued statement at info level instead of debug.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
