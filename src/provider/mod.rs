//! Content-provider boundary — metadata queries, byte streams, storage layout.
//!
//! Everything the resolver and orchestrator need from the host OS is behind
//! [`ContentProvider`]: single-row metadata queries keyed by column name,
//! and a readable byte stream per handle. Platform glue supplies the real
//! implementation; [`fs::FsProvider`] backs the CLI, the daemon, and tests.

pub mod fs;

use std::env;
use std::io::Read;
use std::path::PathBuf;

use crate::handle::ContentHandle;

/// Display-name column of openable items.
pub const COLUMN_DISPLAY_NAME: &str = "_display_name";

/// Backing-storage path column.
pub const COLUMN_DATA: &str = "_data";

/// Numeric row id column.
pub const COLUMN_ROW_ID: &str = "_id";

/// Errors surfaced by provider implementations.
///
/// Callers in the resolver treat these as "no data" and fall through to
/// the next strategy; they never cross the pick boundary.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("unsupported handle {0}")]
    Unsupported(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors when resolving the storage layout from the
/// environment.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("none of $DOCPICK_STORAGE_ROOT, $EXTERNAL_STORAGE, $HOME are set")]
    NoStorageRoot,
    #[error("neither $XDG_CACHE_HOME nor $HOME is set")]
    NoCacheDir,
}

/// On-disk layout the resolver synthesizes paths against.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Root of shared external storage (`primary:` document ids and the
    /// downloads display-name shortcut resolve under this).
    pub external_root: PathBuf,
    /// Private cache directory for the copy fallback.
    pub cache_dir: PathBuf,
}

impl StorageLayout {
    pub fn new(external_root: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            external_root,
            cache_dir,
        }
    }

    /// Resolve the layout from the environment.
    ///
    /// Storage root: `$DOCPICK_STORAGE_ROOT`, then `$EXTERNAL_STORAGE`,
    /// then `$HOME`. Cache dir: `$XDG_CACHE_HOME/docpick`, then
    /// `$HOME/.cache/docpick`.
    pub fn from_env() -> Result<Self, LayoutError> {
        let external_root = env::var_os("DOCPICK_STORAGE_ROOT")
            .or_else(|| env::var_os("EXTERNAL_STORAGE"))
            .or_else(|| env::var_os("HOME"))
            .map(PathBuf::from)
            .ok_or(LayoutError::NoStorageRoot)?;

        let cache_dir = match env::var_os("XDG_CACHE_HOME") {
            Some(dir) => PathBuf::from(dir).join("docpick"),
            None => env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".cache").join("docpick"))
                .ok_or(LayoutError::NoCacheDir)?,
        };

        Ok(Self {
            external_root,
            cache_dir,
        })
    }
}

/// Selection filter for a metadata query: `(column, value)` restricting
/// the query to rows where `column = value`.
pub type Selection<'a> = Option<(&'a str, &'a str)>;

/// The OS capability surface consumed by the core.
///
/// `Send + Sync` because queries run from async task contexts and the
/// copy fallback runs on a blocking worker.
pub trait ContentProvider: Send + Sync {
    /// Single-row, single-column metadata query.
    ///
    /// `Ok(None)` means the query matched no row. Provider failures come
    /// back as `Err` and are treated as "no data" by the resolver.
    fn query_string(
        &self,
        handle: &ContentHandle,
        column: &str,
        selection: Selection,
    ) -> Result<Option<String>, ProviderError>;

    /// Open a byte stream over the handle's content.
    fn open_read(&self, handle: &ContentHandle) -> Result<Box<dyn Read + Send>, ProviderError>;

    /// The storage layout paths are synthesized against.
    fn layout(&self) -> &StorageLayout;
}
