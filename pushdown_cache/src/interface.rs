//! The catalog-access interface this subsystem consumes from its host.
//!
//! The caches depend only on this contract, never on host-internal catalog
//! representations, so they can be driven by the in-memory provider in
//! [`crate::mem`] during tests.

use std::{fmt::Debug, sync::Arc};

use remote_types::{ColumnPosition, ObjectId, TableId};

/// A declared `(name, value)` option attached to a table or column
/// definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredOption {
    /// Option name.
    pub name: String,

    /// Option value.
    pub value: String,
}

impl DeclaredOption {
    /// Construct an option pair.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One column of a table as the catalog declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Position within the table (1-based).
    pub position: ColumnPosition,

    /// The catalog's name for the column.
    pub name: String,

    /// Identifier of the column's declared type.
    pub declared_type: ObjectId,
}

/// Observer invoked synchronously whenever a catalog attribute changes.
///
/// The notification carries no key identifying what changed. Handlers are
/// called reentrantly from within the host's catalog machinery and must be
/// purge-only: no I/O, no suspension, and no calls back into lookups on the
/// cache being cleared.
pub trait AttributeChangeObserver: Debug + Send + Sync {
    /// Some catalog attribute changed somewhere.
    fn attributes_changed(&self);
}

/// Read-only catalog queries the cache subsystem needs from its host.
///
/// All queries are synchronous; implementations must not block on I/O from
/// the planning path.
pub trait CatalogProvider: Debug + Send + Sync {
    /// Resolve the name of the extension owning `object_id`, if any.
    fn owner_extension_of(&self, object_id: ObjectId) -> Option<String>;

    /// Resolve a function's catalog name.
    ///
    /// Returns `None` when the catalog has no entry for `function_id` - for
    /// an identifier the ownership query just attributed to an extension,
    /// that indicates a stale identifier and therefore caller misuse.
    fn function_name(&self, function_id: ObjectId) -> Option<String>;

    /// The columns of `table_id`, in position order.
    fn columns_of(&self, table_id: TableId) -> Vec<ColumnDescriptor>;

    /// The options declared on `table_id`, in declaration order.
    fn table_options(&self, table_id: TableId) -> Vec<DeclaredOption>;

    /// The options declared on one column, in declaration order.
    fn column_options(&self, table_id: TableId, position: ColumnPosition) -> Vec<DeclaredOption>;

    /// Register `observer` for attribute-change notifications for the rest
    /// of the catalog's lifetime.
    fn subscribe_attribute_changes(&self, observer: Arc<dyn AttributeChangeObserver>);
}
