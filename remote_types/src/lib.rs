//! Shared data types describing how catalog objects translate to a remote
//! analytical engine.

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

use std::fmt::Display;

use thiserror::Error;

/// First object identifier the host catalog hands out to user-created
/// objects. Everything below it is part of the core catalog.
pub const FIRST_USER_OBJECT_ID: i64 = 16384;

/// Maximum length of a remote identifier, in bytes. Mirrors the host
/// catalog's 63 byte identifier limit.
pub const MAX_REMOTE_NAME_LEN: usize = 63;

/// Unique catalog identifier of a function or type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(i64);

#[allow(missing_docs)]
impl ObjectId {
    pub const fn new(v: i64) -> Self {
        Self(v)
    }

    pub fn get(&self) -> i64 {
        self.0
    }

    /// Objects below [`FIRST_USER_OBJECT_ID`] belong to the host's core
    /// catalog and can never carry extension semantics.
    pub fn is_builtin(&self) -> bool {
        self.0 < FIRST_USER_OBJECT_ID
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique catalog identifier of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId(i64);

#[allow(missing_docs)]
impl TableId {
    pub const fn new(v: i64) -> Self {
        Self(v)
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based position of a column within its table, matching the catalog's
/// attribute numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnPosition(i32);

#[allow(missing_docs)]
impl ColumnPosition {
    pub const fn new(v: i32) -> Self {
        Self(v)
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

impl Display for ColumnPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors returned by [`RemoteName`] validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NameError {
    /// The name is empty.
    #[error("remote name cannot be empty")]
    Empty,

    /// The name exceeds the identifier bound.
    #[error("remote name exceeds {MAX_REMOTE_NAME_LEN} bytes: got {0} bytes")]
    TooLong(usize),
}

/// An identifier as the remote engine will see it: a column name, a sign
/// field, or a rewritten aggregate name.
///
/// Validated at construction against [`MAX_REMOTE_NAME_LEN`] so that overlong
/// user input surfaces as an error at the parse boundary instead of being
/// silently truncated somewhere downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteName(String);

impl RemoteName {
    /// Validate `name` against the remote identifier bound.
    pub fn try_new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(NameError::Empty);
        }
        if name.len() > MAX_REMOTE_NAME_LEN {
            return Err(NameError::TooLong(name.len()));
        }
        Ok(Self(name))
    }

    /// The validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RemoteName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for RemoteName {
    type Error = NameError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::try_new(name)
    }
}

impl TryFrom<String> for RemoteName {
    type Error = NameError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::try_new(name)
    }
}

/// How an overridden catalog object translates for remote execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    /// No special handling.
    Usual,

    /// An aggregate that must be rewritten to the remote engine's
    /// specialized equivalent named here.
    AggregateRewrite {
        /// Name of the remote aggregate to emit instead.
        remote_name: RemoteName,
    },

    /// The extension's sparse-map type itself.
    SparseMapType,
}

/// Cached decision recording how a catalog object's semantics translate for
/// remote execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomObjectDef {
    /// The catalog object this decision applies to.
    pub object_id: ObjectId,

    /// The translation decision.
    pub kind: ObjectKind,
}

/// The remote storage engine backing a table.
///
/// The sign field lives inside the [`CollapsingVersioned`] variant so a
/// collapsing table can never lack one.
///
/// [`CollapsingVersioned`]: TableEngine::CollapsingVersioned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEngine {
    /// Plain storage; row versions need no interpretation.
    Usual,

    /// Collapsing storage: `sign_field` names the column holding the +1/-1
    /// row-version marker used to collapse duplicate logical rows.
    CollapsingVersioned {
        /// Column carrying the sign marker.
        sign_field: RemoteName,
    },
}

impl TableEngine {
    /// The sign column, for collapsing tables.
    pub fn sign_field(&self) -> Option<&RemoteName> {
        match self {
            Self::Usual => None,
            Self::CollapsingVersioned { sign_field } => Some(sign_field),
        }
    }
}

/// Extension-specific semantics of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// An ordinary column.
    Usual,

    /// A sparse-map column shipped to the remote engine as parallel
    /// key/value arrays.
    SparseMapArray,

    /// A sparse-map column exposed remotely as its key column.
    SparseMapKeyColumn,
}

/// Cached per-column translation decision, keyed by table and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomColumnInfo {
    /// Table owning the column.
    pub table_id: TableId,

    /// Position of the column within the table.
    pub position: ColumnPosition,

    /// Storage engine of the owning table.
    pub table_engine: TableEngine,

    /// Extension semantics of this column.
    pub column_kind: ColumnKind,

    /// Name to use when referring to this column remotely. Defaults to the
    /// catalog name, overridable via the `column_name` option.
    pub column_name: RemoteName,
}
