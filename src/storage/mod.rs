//! The store collaborator: the relational surface the write engine drives.

mod filter;
pub mod memory;
pub mod table;

pub use memory::MemStore;
pub use table::Table;

use async_trait::async_trait;

use crate::conflict::UpsertClause;
use crate::core::{Predicate, ResourceDescriptor, Result, Row, Value};

/// Minimal relational surface consumed by the write engine. A store owns its
/// own connection handling and may be shared by many concurrent callers; each
/// method maps to one statement applied atomically with its predicate.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts rows in one statement, applying the compiled on-conflict
    /// clause on target collisions. `restrict` additionally gates any
    /// conflict-update against the existing row (version-gated upserts).
    /// Returns rows affected; a do-nothing collision contributes zero.
    async fn insert(
        &self,
        desc: &ResourceDescriptor,
        rows: Vec<Row>,
        on_conflict: Option<&UpsertClause>,
        restrict: Option<&Predicate>,
    ) -> Result<i64>;

    /// Applies the assignments to every row matching the predicate, returning
    /// rows affected.
    async fn update(
        &self,
        desc: &ResourceDescriptor,
        assignments: &[(String, Value)],
        pred: &Predicate,
    ) -> Result<i64>;

    /// Deletes every row matching the predicate, returning rows affected.
    async fn delete(&self, desc: &ResourceDescriptor, pred: &Predicate) -> Result<i64>;

    /// Fetches the first row matching the predicate; a miss is
    /// `Error::RecordNotFound`, distinct from any other failure.
    async fn fetch_one(&self, desc: &ResourceDescriptor, pred: &Predicate) -> Result<Row>;
}
