//! Metadata caches letting a query planner recognize catalog objects that
//! carry extension-defined semantics and translate them when pushing work
//! down to a remote analytical engine.
//!
//! The subsystem consists of two lazily populated caches behind a single
//! [`MetadataCache`] value:
//!
//! * a per-object cache answering "does this function/type need special
//!   translation?" ([`MetadataCache::lookup_function_override`],
//!   [`MetadataCache::lookup_type_override`]);
//! * a per-column cache answering "how is this column referred to remotely,
//!   and does its table's storage engine need row-version handling?"
//!   ([`MetadataCache::apply_table_options`],
//!   [`MetadataCache::lookup_column_info`]).
//!
//! The caches consult the host catalog only through the
//! [`interface::CatalogProvider`] trait, so the whole subsystem is testable
//! against the in-memory provider in [`mem`]. The column cache is purged
//! wholesale whenever the catalog reports an attribute change; entries are
//! otherwise never evicted.

#![deny(
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms,
    missing_debug_implementations,
    unreachable_pub
)]
#![warn(
    missing_docs,
    clippy::todo,
    clippy::dbg_macro,
    clippy::explicit_iter_loop,
    clippy::clone_on_ref_ptr,
    unused_crate_dependencies
)]

use remote_types::{ColumnPosition, NameError, TableId};
use thiserror::Error;

mod cache;
mod engine;
pub mod interface;
pub mod mem;

pub use cache::MetadataCache;

/// Errors arising from user-declared table or column options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The `engine` option names a collapsing engine but its sign-column
    /// argument is not a valid remote identifier.
    #[error("invalid format of remote engine declaration `{value}`: {source}")]
    Engine {
        /// The declared option value.
        value: String,
        /// Why the argument was rejected.
        #[source]
        source: NameError,
    },

    /// A column's remote name (declared via the `column_name` option, or
    /// inherited from the catalog) is not a valid remote identifier.
    #[error("invalid remote name for column {position} of table {table_id}: {source}")]
    ColumnName {
        /// Table owning the offending column.
        table_id: TableId,
        /// Position of the offending column.
        position: ColumnPosition,
        /// Why the name was rejected.
        #[source]
        source: NameError,
    },
}
