use crate::core::{ResourceDescriptor, Result, Row};

/// The operation a resource is being vetted for.
#[derive(Debug, Clone, Copy)]
pub enum WriteOp<'a> {
    Create,
    Update {
        set_paths: &'a [&'a str],
        null_paths: &'a [&'a str],
    },
    Delete,
}

/// A caller-defined record the engine can persist.
///
/// Implementations describe their shape once through a static
/// [`ResourceDescriptor`] and translate themselves to and from rows in
/// descriptor column order. The engine never retains a resource beyond a
/// call; read-after-write refreshes the caller's instance in place through
/// [`Resource::apply_row`].
///
/// Two optional identity capabilities short-circuit primary-key inference:
/// a resource reporting a public or private identifier uses that single
/// column as its whole key, checked in that priority order. Resources
/// without either fall back to the descriptor columns flagged primary-key.
pub trait Resource: Send + Sync {
    fn descriptor() -> &'static ResourceDescriptor
    where
        Self: Sized;

    /// Current in-memory values, one per descriptor column, in order.
    fn to_row(&self) -> Row;

    /// Refresh this instance from a stored row (generated timestamps,
    /// version counter, conflict-merged columns).
    fn apply_row(&mut self, row: &Row) -> Result<()>;

    /// Public identifier capability. `Some("")` is rejected as an unset key.
    fn public_id(&self) -> Option<&str> {
        None
    }

    /// Private identifier capability, consulted after [`Resource::public_id`].
    fn private_id(&self) -> Option<&str> {
        None
    }

    /// Self-validation, run before any hook or mutation unless the call
    /// suppresses it with `with_skip_vet_for_write`.
    fn vet_for_write(&self, _op: WriteOp<'_>) -> Result<()> {
        Ok(())
    }
}
