use super::Rw;
use crate::core::{Predicate, RawClause, Result, Value};
use crate::keys;
use crate::resource::Resource;

impl Rw {
    /// Fetches the row identified by the resource's primary key and
    /// refreshes the instance from it. A miss is `Error::RecordNotFound`.
    pub async fn lookup<R: Resource>(&self, resource: &mut R) -> Result<()> {
        const OP: &str = "rowwise.lookup";

        let pred = keys::primary_key_predicate(resource, OP)?;
        let row = self.db.store().fetch_one(R::descriptor(), &pred).await?;
        resource.apply_row(&row)
    }

    /// Fetches the first row matching a raw predicate with positional `?`
    /// arguments and refreshes the instance from it.
    pub async fn lookup_where<R: Resource>(
        &self,
        resource: &mut R,
        clause: impl Into<String> + Send,
        args: Vec<Value>,
    ) -> Result<()> {
        let pred = Predicate::Raw(RawClause::new(clause, args));
        let row = self.db.store().fetch_one(R::descriptor(), &pred).await?;
        resource.apply_row(&row)
    }
}
