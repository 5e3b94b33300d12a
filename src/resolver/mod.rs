//! Path resolver — ordered strategies from content handle to local path.
//!
//! Each strategy inspects a handle and either claims it (returning a
//! path), declines (falling through to the next), or fails internally
//! (logged and treated as a decline). The chain never performs a byte
//! copy; [`copy::copy_to_cache`] is the orchestrator's last resort when
//! the whole chain declines.

mod direct;
mod documents;
mod query;
mod remote;

pub mod copy;

use crate::handle::ContentHandle;
use crate::provider::ContentProvider;

/// Errors raised inside strategies and the copy fallback.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    #[error("provider: {0}")]
    Provider(#[from] crate::provider::ProviderError),
    #[error("copy failed: {0}")]
    Copy(#[from] std::io::Error),
}

/// A single resolution strategy.
///
/// `Ok(None)` means the handle is outside this strategy's jurisdiction;
/// the resolver falls through to the next entry.
pub trait PathStrategy: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    fn try_resolve(
        &self,
        handle: &ContentHandle,
        provider: &dyn ContentProvider,
    ) -> Result<Option<String>, ResolverError>;
}

/// The ordered strategy chain.
pub struct PathResolver {
    strategies: Vec<Box<dyn PathStrategy>>,
}

impl PathResolver {
    /// Build the default chain: direct file paths, then the
    /// authority-specific document strategies, then the remote-id and
    /// generic data-column fallbacks.
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(direct::DirectPath),
                Box::new(documents::ExternalStorageDocs),
                Box::new(documents::DownloadsDocs),
                Box::new(documents::MediaDocs),
                Box::new(remote::RemoteId),
                Box::new(query::DataColumn),
            ],
        }
    }

    /// Walk the chain; first match wins.
    ///
    /// Strategy errors (a provider that throws mid-query) are demoted to
    /// declines: the caller only ever sees a path or nothing.
    pub fn resolve(
        &self,
        handle: &ContentHandle,
        provider: &dyn ContentProvider,
    ) -> Option<String> {
        for strategy in &self.strategies {
            match strategy.try_resolve(handle, provider) {
                Ok(Some(path)) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        handle = %handle,
                        path = %path,
                        "resolved"
                    );
                    return Some(path);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        handle = %handle,
                        error = %e,
                        "strategy failed, falling through"
                    );
                }
            }
        }
        tracing::debug!(handle = %handle, "no strategy matched");
        None
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::io::Read;
    use std::path::Path;

    use crate::handle::ContentHandle;
    use crate::provider::{ContentProvider, ProviderError, Selection, StorageLayout};

    /// Provider that panics on any call. Proves a strategy does no I/O.
    pub struct NoIoProvider {
        layout: StorageLayout,
    }

    impl NoIoProvider {
        pub fn new() -> Self {
            Self {
                layout: StorageLayout::new("/unused".into(), "/unused".into()),
            }
        }
    }

    impl ContentProvider for NoIoProvider {
        fn query_string(
            &self,
            handle: &ContentHandle,
            _column: &str,
            _selection: Selection,
        ) -> Result<Option<String>, ProviderError> {
            panic!("unexpected metadata query for {handle}");
        }

        fn open_read(&self, handle: &ContentHandle) -> Result<Box<dyn Read + Send>, ProviderError> {
            panic!("unexpected stream open for {handle}");
        }

        fn layout(&self) -> &StorageLayout {
            &self.layout
        }
    }

    /// FsProvider rooted in a tempdir, with the conventional sub-layout.
    pub fn fs_provider(dir: &Path) -> crate::provider::fs::FsProvider {
        crate::provider::fs::FsProvider::new(
            dir.join("content"),
            StorageLayout::new(dir.join("storage"), dir.join("cache")),
        )
    }
}
