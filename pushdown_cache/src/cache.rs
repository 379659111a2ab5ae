//! Lazily populated caches of per-object and per-column translation
//! decisions.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::Mutex;
use remote_types::{
    ColumnKind, ColumnPosition, CustomColumnInfo, CustomObjectDef, ObjectId, ObjectKind,
    RemoteName, TableId,
};
use tracing::debug;

use crate::{
    engine::engine_from_options,
    interface::{AttributeChangeObserver, CatalogProvider, DeclaredOption},
    ConfigError,
};

/// Extension whose objects receive specialized translation.
const SPARSE_MAP_EXTENSION: &str = "istore";

/// Name of the extension aggregate that must be rewritten for remote
/// execution.
const SPARSE_MAP_SUM: &str = "sum";

/// The remote engine's equivalent of [`SPARSE_MAP_SUM`].
const REMOTE_SUM_AGGREGATE: &str = "sumMap";

/// Per-column cache, keyed by `(table, position)`.
///
/// Held behind an [`Arc`] so the attribute-change observer registered with
/// the catalog owns a reference to the exact cache instance it purges.
#[derive(Debug, Default)]
struct ColumnMetadataCache {
    entries: Mutex<HashMap<(TableId, ColumnPosition), CustomColumnInfo>>,
}

impl ColumnMetadataCache {
    /// Drop every entry. Tolerates an empty cache.
    fn purge(&self) {
        let mut entries = self.entries.lock();
        let purged = entries.len();
        entries.clear();
        debug!(purged, "purged column metadata cache");
    }
}

impl AttributeChangeObserver for ColumnMetadataCache {
    fn attributes_changed(&self) {
        // The notification carries no key identifying what changed, so the
        // whole cache goes; the next `apply_table_options` repopulates it.
        self.purge();
    }
}

/// Process-wide cache of translation decisions, constructed once per
/// session and passed by reference into every lookup.
///
/// # Caching
///
/// Both inner caches populate lazily from the [`CatalogProvider`] and never
/// evict. The column cache is cleared wholesale on any catalog
/// attribute-change notification - deliberately coarse, trading precision
/// for the guarantee that no stale entry survives a relevant change. The
/// object cache has no invalidation hook; a schema change that redefines an
/// extension object requires a new `MetadataCache` (known gap, inherited
/// from the reference behavior of this design).
///
/// Negative results are cached too: an object that turns out to be ordinary
/// gets a [`ObjectKind::Usual`] entry so the catalog is not re-queried on
/// every planning pass.
///
/// # Concurrency
///
/// All lookups run on the single planning thread of their session. The
/// internal locks exist to give the attribute-change observer a sound
/// shared reference, not to serialize concurrent planners; they are
/// uncontended in normal operation.
#[derive(Debug)]
pub struct MetadataCache {
    catalog: Arc<dyn CatalogProvider>,
    objects: Mutex<HashMap<ObjectId, CustomObjectDef>>,
    columns: Arc<ColumnMetadataCache>,
}

impl MetadataCache {
    /// Construct a cache over `catalog`, subscribing the column cache to
    /// its attribute-change notifications.
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        let columns = Arc::new(ColumnMetadataCache::default());
        catalog.subscribe_attribute_changes(Arc::clone(&columns) as _);
        Self {
            catalog,
            objects: Default::default(),
            columns,
        }
    }

    /// Decide whether the function `function_id` needs rewriting for remote
    /// execution.
    ///
    /// Builtin functions return `None` without consulting the cache or the
    /// catalog; they cannot carry extension semantics. Everything else
    /// always yields a definition (possibly [`ObjectKind::Usual`]),
    /// established on first call and reused thereafter.
    ///
    /// # Panics
    ///
    /// If the catalog attributes `function_id` to an extension but cannot
    /// resolve its name, the caller passed a stale identifier and a
    /// correctness invariant is broken; this method panics rather than
    /// silently defaulting.
    pub fn lookup_function_override(&self, function_id: ObjectId) -> Option<CustomObjectDef> {
        if function_id.is_builtin() {
            return None;
        }

        let mut objects = self.objects.lock();
        let entry = objects
            .entry(function_id)
            .or_insert_with(|| self.resolve_function(function_id));
        Some(entry.clone())
    }

    fn resolve_function(&self, function_id: ObjectId) -> CustomObjectDef {
        let kind = match self.catalog.owner_extension_of(function_id).as_deref() {
            Some(SPARSE_MAP_EXTENSION) => {
                let name = self
                    .catalog
                    .function_name(function_id)
                    .unwrap_or_else(|| panic!("catalog lookup failed for function {function_id}"));

                if name == SPARSE_MAP_SUM {
                    ObjectKind::AggregateRewrite {
                        remote_name: RemoteName::try_new(REMOTE_SUM_AGGREGATE)
                            .expect("remote aggregate name is a valid name"),
                    }
                } else {
                    ObjectKind::Usual
                }
            }
            // Unknown extensions never break planning.
            _ => ObjectKind::Usual,
        };

        CustomObjectDef {
            object_id: function_id,
            kind,
        }
    }

    /// Decide whether `type_id` is the extension's sparse-map type.
    ///
    /// Builtin types return `None` without consulting the cache or the
    /// catalog.
    pub fn lookup_type_override(&self, type_id: ObjectId) -> Option<CustomObjectDef> {
        if type_id.is_builtin() {
            return None;
        }

        let mut objects = self.objects.lock();
        let entry = objects.entry(type_id).or_insert_with(|| {
            let kind = match self.catalog.owner_extension_of(type_id).as_deref() {
                Some(SPARSE_MAP_EXTENSION) => ObjectKind::SparseMapType,
                _ => ObjectKind::Usual,
            };
            CustomObjectDef {
                object_id: type_id,
                kind,
            }
        });
        Some(entry.clone())
    }

    /// Populate the column cache for every column of `table_id` from its
    /// declared options.
    ///
    /// Idempotent: columns that already have an entry are skipped, so a
    /// repeated call with identical inputs is a no-op. The planner calls
    /// this once per table per planning cycle, before any
    /// [`lookup_column_info`](Self::lookup_column_info) for that table.
    ///
    /// A malformed option aborts population from the offending column
    /// onward; entries already written in the same call stand, each being
    /// independently valid.
    pub fn apply_table_options(
        &self,
        table_id: TableId,
        declared_options: &[DeclaredOption],
    ) -> Result<(), ConfigError> {
        let table_engine = engine_from_options(declared_options)?;

        for column in self.catalog.columns_of(table_id) {
            let key = (table_id, column.position);
            if self.columns.entries.lock().contains_key(&key) {
                continue;
            }

            let mut column_name =
                RemoteName::try_new(column.name.as_str()).map_err(|source| {
                    ConfigError::ColumnName {
                        table_id,
                        position: column.position,
                        source,
                    }
                })?;

            // Collect the declared column kind up front; it only takes
            // effect if the column's type resolves to the sparse-map type.
            let mut declared_kind = ColumnKind::SparseMapArray;
            for option in self.catalog.column_options(table_id, column.position) {
                match option.name.as_str() {
                    "column_name" => {
                        column_name = RemoteName::try_new(option.value.as_str()).map_err(
                            |source| ConfigError::ColumnName {
                                table_id,
                                position: column.position,
                                source,
                            },
                        )?;
                    }
                    "arrays" => declared_kind = ColumnKind::SparseMapArray,
                    "keys" => declared_kind = ColumnKind::SparseMapKeyColumn,
                    // Unknown options never break planning.
                    _ => {}
                }
            }

            let column_kind = match self.lookup_type_override(column.declared_type) {
                Some(CustomObjectDef {
                    kind: ObjectKind::SparseMapType,
                    ..
                }) => declared_kind,
                _ => ColumnKind::Usual,
            };

            self.columns.entries.lock().insert(
                key,
                CustomColumnInfo {
                    table_id,
                    position: column.position,
                    table_engine: table_engine.clone(),
                    column_kind,
                    column_name,
                },
            );
        }

        debug!(%table_id, "populated column metadata");
        Ok(())
    }

    /// Pure cache read of one column's translation decision.
    ///
    /// Returns `None` until [`apply_table_options`](Self::apply_table_options)
    /// has run for the table; this path never populates.
    pub fn lookup_column_info(
        &self,
        table_id: TableId,
        position: ColumnPosition,
    ) -> Option<CustomColumnInfo> {
        self.columns.entries.lock().get(&(table_id, position)).cloned()
    }
}
