//! In-memory [`CatalogProvider`] implementation, for testing.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use hashbrown::HashMap;
use parking_lot::Mutex;
use remote_types::{ColumnPosition, ObjectId, TableId};

use crate::interface::{
    AttributeChangeObserver, CatalogProvider, ColumnDescriptor, DeclaredOption,
};

#[derive(Debug, Default)]
struct MemState {
    /// Object identifier to owning extension name.
    extensions: HashMap<ObjectId, String>,

    /// Function identifier to catalog function name.
    functions: HashMap<ObjectId, String>,

    /// Table columns, in position order.
    columns: HashMap<TableId, Vec<ColumnDescriptor>>,

    /// Declared table options, in declaration order.
    table_options: HashMap<TableId, Vec<DeclaredOption>>,

    /// Declared column options, in declaration order.
    column_options: HashMap<(TableId, ColumnPosition), Vec<DeclaredOption>>,
}

/// A [`CatalogProvider`] backed by in-memory maps.
///
/// Registration methods build up the fake catalog; [`notify_attribute_change`]
/// drives the invalidation path, and [`ownership_queries`] exposes how many
/// ownership lookups were served so tests can assert negative caching.
///
/// [`notify_attribute_change`]: MemCatalogProvider::notify_attribute_change
/// [`ownership_queries`]: MemCatalogProvider::ownership_queries
#[derive(Debug, Default)]
pub struct MemCatalogProvider {
    state: Mutex<MemState>,
    observers: Mutex<Vec<Arc<dyn AttributeChangeObserver>>>,
    ownership_queries: AtomicUsize,
}

impl MemCatalogProvider {
    /// Construct an empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `object_id` as owned by `extension`.
    pub fn register_extension_object(&self, object_id: ObjectId, extension: &str) {
        self.state
            .lock()
            .extensions
            .insert(object_id, extension.to_owned());
    }

    /// Record the catalog name of a function.
    pub fn register_function(&self, function_id: ObjectId, name: &str) {
        self.state
            .lock()
            .functions
            .insert(function_id, name.to_owned());
    }

    /// Define a table and its columns.
    pub fn define_table(&self, table_id: TableId, columns: Vec<ColumnDescriptor>) {
        self.state.lock().columns.insert(table_id, columns);
    }

    /// Attach declared options to a table.
    pub fn set_table_options(&self, table_id: TableId, options: Vec<DeclaredOption>) {
        self.state.lock().table_options.insert(table_id, options);
    }

    /// Attach declared options to one column.
    pub fn set_column_options(
        &self,
        table_id: TableId,
        position: ColumnPosition,
        options: Vec<DeclaredOption>,
    ) {
        self.state
            .lock()
            .column_options
            .insert((table_id, position), options);
    }

    /// Synchronously deliver an attribute-change notification to every
    /// subscribed observer.
    pub fn notify_attribute_change(&self) {
        let observers = self.observers.lock().clone();
        for observer in &observers {
            observer.attributes_changed();
        }
    }

    /// Number of [`CatalogProvider::owner_extension_of`] queries served so
    /// far.
    pub fn ownership_queries(&self) -> usize {
        self.ownership_queries.load(Ordering::Relaxed)
    }
}

impl CatalogProvider for MemCatalogProvider {
    fn owner_extension_of(&self, object_id: ObjectId) -> Option<String> {
        self.ownership_queries.fetch_add(1, Ordering::Relaxed);
        self.state.lock().extensions.get(&object_id).cloned()
    }

    fn function_name(&self, function_id: ObjectId) -> Option<String> {
        self.state.lock().functions.get(&function_id).cloned()
    }

    fn columns_of(&self, table_id: TableId) -> Vec<ColumnDescriptor> {
        self.state
            .lock()
            .columns
            .get(&table_id)
            .cloned()
            .unwrap_or_default()
    }

    fn table_options(&self, table_id: TableId) -> Vec<DeclaredOption> {
        self.state
            .lock()
            .table_options
            .get(&table_id)
            .cloned()
            .unwrap_or_default()
    }

    fn column_options(&self, table_id: TableId, position: ColumnPosition) -> Vec<DeclaredOption> {
        self.state
            .lock()
            .column_options
            .get(&(table_id, position))
            .cloned()
            .unwrap_or_default()
    }

    fn subscribe_attribute_changes(&self, observer: Arc<dyn AttributeChangeObserver>) {
        self.observers.lock().push(observer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct CountingObserver(AtomicUsize);

    impl AttributeChangeObserver for CountingObserver {
        fn attributes_changed(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn notifications_reach_every_subscriber() {
        let catalog = MemCatalogProvider::new();
        let a = Arc::new(CountingObserver::default());
        let b = Arc::new(CountingObserver::default());

        catalog.subscribe_attribute_changes(Arc::clone(&a) as _);
        catalog.notify_attribute_change();
        catalog.subscribe_attribute_changes(Arc::clone(&b) as _);
        catalog.notify_attribute_change();

        assert_eq!(a.0.load(Ordering::Relaxed), 2);
        assert_eq!(b.0.load(Ordering::Relaxed), 1);
    }
}
