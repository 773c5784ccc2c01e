// ============================================================================
// rowwise - resource persistence over a relational store
// ============================================================================
//
// A write-path engine for arbitrary caller-defined resource types: Create,
// CreateItems, Update, Delete and DeleteItems with primary-key inference,
// field-mask partial updates, declarative upsert compilation, optimistic
// concurrency and a before/after/self-validation hook pipeline. The engine
// drives any relational surface implementing the `Store` trait; an in-memory
// implementation (`MemStore`) is bundled.
//
//     let store = MemStore::new();
//     store.create_table(User::descriptor()).await?;
//     let rw = Rw::new(Db::new(store));
//
//     let mut user = User { public_id: "u_1".into(), name: "alice".into() };
//     rw.create(&mut user, WriteOptions::new()).await?;
//     let rows = rw
//         .update(&mut user, &["name"], &[], WriteOptions::new().with_version(1))
//         .await?;

pub mod conflict;
pub mod core;
pub mod fieldmask;
pub mod keys;
pub mod options;
pub mod resource;
mod rw;
pub mod storage;

// Re-export main types for convenience
pub use conflict::{
    Assignment, AssignmentSource, ColumnValue, ConflictAction, ConflictTarget, OnConflict,
    SetValue, UpsertAction, UpsertClause,
};
pub use core::{
    BoxError, Column, ColumnRole, DataType, Error, Predicate, RawClause, ResourceDescriptor,
    Result, Row, Value,
};
pub use keys::{PrimaryKeys, primary_key_columns};
pub use options::{AfterWriteFn, BeforeWriteFn, WriteOptions};
pub use resource::{Resource, WriteOp};
pub use rw::{Db, Rw};
pub use storage::{MemStore, Store, Table};
