use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::conflict::UpsertClause;
use crate::core::{Error, Predicate, ResourceDescriptor, Result, Row};
use crate::storage::{Store, Table};

/// In-memory [`Store`] implementation.
///
/// Tables carry individual locks; the outer map is only locked to resolve a
/// table handle. Cloning shares the same tables, so one `MemStore` can back a
/// `Db` while the test that created it keeps a handle for seeding.
#[derive(Clone, Default)]
pub struct MemStore {
    tables: Arc<RwLock<HashMap<String, Arc<RwLock<Table>>>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_table(&self, desc: &ResourceDescriptor) -> Result<()> {
        const OP: &str = "memstore.create_table";

        let mut tables = self.tables.write().await;
        if tables.contains_key(desc.table()) {
            return Err(Error::internal(
                OP,
                format!("table '{}' already exists", desc.table()),
            ));
        }
        tables.insert(
            desc.table().to_string(),
            Arc::new(RwLock::new(Table::new(desc.clone()))),
        );
        Ok(())
    }

    pub async fn drop_table(&self, name: &str) -> Result<()> {
        const OP: &str = "memstore.drop_table";

        if self.tables.write().await.remove(name).is_none() {
            return Err(Error::internal(OP, format!("table '{name}' not found")));
        }
        Ok(())
    }

    pub async fn table_exists(&self, name: &str) -> bool {
        self.tables.read().await.contains_key(name)
    }

    pub async fn row_count(&self, name: &str) -> Result<usize> {
        let table = self.table(name).await?;
        let table = table.read().await;
        Ok(table.row_count())
    }

    async fn table(&self, name: &str) -> Result<Arc<RwLock<Table>>> {
        self.tables
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| Error::internal("memstore", format!("table '{name}' not found")))
    }
}

#[async_trait]
impl Store for MemStore {
    async fn insert(
        &self,
        desc: &ResourceDescriptor,
        rows: Vec<Row>,
        on_conflict: Option<&UpsertClause>,
        restrict: Option<&Predicate>,
    ) -> Result<i64> {
        let handle = self.table(desc.table()).await?;
        let mut table = handle.write().await;

        // stage on a copy so a mid-batch failure leaves the table untouched,
        // matching single-statement semantics
        let mut staged = table.clone();
        let mut affected = 0;
        for row in rows {
            affected += staged.insert(row, on_conflict, restrict)?;
        }
        *table = staged;
        Ok(affected)
    }

    async fn update(
        &self,
        desc: &ResourceDescriptor,
        assignments: &[(String, crate::core::Value)],
        pred: &Predicate,
    ) -> Result<i64> {
        let handle = self.table(desc.table()).await?;
        let mut table = handle.write().await;
        table.update_where(assignments, pred)
    }

    async fn delete(&self, desc: &ResourceDescriptor, pred: &Predicate) -> Result<i64> {
        let handle = self.table(desc.table()).await?;
        let mut table = handle.write().await;
        table.delete_where(pred)
    }

    async fn fetch_one(&self, desc: &ResourceDescriptor, pred: &Predicate) -> Result<Row> {
        const OP: &str = "memstore.fetch_one";

        let handle = self.table(desc.table()).await?;
        let table = handle.read().await;
        table
            .find_first(pred)?
            .ok_or_else(|| Error::record_not_found(OP))
    }
}
