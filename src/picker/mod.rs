//! Selection orchestrator — picker launch, name sanitization, resolution.
//!
//! Drives one document pick end to end: open the native picker on a
//! blocking worker, fail closed when the item reports no display name,
//! sanitize the name, then resolve the handle through the strategy chain
//! with the copy-to-cache fallback. Exactly one terminal outcome per
//! request; at the public boundary every failure collapses to `None`
//! (the real cause is logged).

pub mod native;
pub mod source;

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::handle::{ContentHandle, HandleError};
use crate::provider::{COLUMN_DISPLAY_NAME, ContentProvider};
use crate::resolver::{PathResolver, ResolverError, copy};

use source::{DocumentSource, PickerFilter, Selection, SourceError};

/// Arguments of one pick request, as marshaled by the host shell.
#[derive(Debug, Clone, Default)]
pub struct PickOptions {
    pub allowed_extensions: Option<Vec<String>>,
    pub allowed_mime_types: Option<Vec<String>>,
    pub invalid_name_symbols: Option<Vec<String>>,
}

/// A successfully resolved selection. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedDocument {
    pub file_name: String,
    pub extension: Option<String>,
    pub path: String,
}

/// Everything that can end a pick without a path.
#[derive(Debug, thiserror::Error)]
pub enum PickError {
    #[error("user cancelled")]
    Cancelled,
    #[error("a pick is already in flight")]
    PickInFlight,
    #[error("selected item has no display name")]
    NoDisplayName,
    #[error("handle: {0}")]
    Handle(#[from] HandleError),
    #[error("picker: {0}")]
    Source(#[from] SourceError),
    #[error("no strategy matched and copy was not possible")]
    Unresolved,
    #[error("copy fallback: {0}")]
    Copy(#[from] ResolverError),
    #[error("background task failed: {0}")]
    Background(#[from] tokio::task::JoinError),
}

/// Replace every literal occurrence of each symbol (in caller order)
/// with a single underscore. Identity when `symbols` is empty.
pub fn sanitize_file_name(name: &str, symbols: &[String]) -> String {
    let mut out = name.to_string();
    for symbol in symbols {
        if !symbol.is_empty() {
            out = out.replace(symbol.as_str(), "_");
        }
    }
    out
}

/// The substring strictly after the last `.`, or `None` when there is
/// no `.` or nothing follows it.
pub fn extension_of(name: &str) -> Option<String> {
    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => Some(name[idx + 1..].to_string()),
        _ => None,
    }
}

pub struct Orchestrator {
    source: Arc<dyn DocumentSource>,
    provider: Arc<dyn ContentProvider>,
    resolver: PathResolver,
    /// Single-flight guard: held for the whole pick, try-acquired so a
    /// concurrent request is rejected instead of overwriting this one.
    in_flight: Mutex<()>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn DocumentSource>, provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            source,
            provider,
            resolver: PathResolver::new(),
            in_flight: Mutex::new(()),
        }
    }

    /// The boundary operation: pick a document, resolve it, return its
    /// path. All failures except [`PickError::PickInFlight`] collapse to
    /// `None` here; callers that need the busy rejection use [`Self::pick`].
    pub async fn pick_document(&self, options: PickOptions) -> Option<String> {
        match self.pick(options).await {
            Ok(doc) => Some(doc.path),
            Err(e) => {
                tracing::info!(error = %e, "pick ended without a path");
                None
            }
        }
    }

    /// Run one pick, reporting the cause on failure.
    pub async fn pick(&self, options: PickOptions) -> Result<PickedDocument, PickError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| PickError::PickInFlight)?;
        let request = Uuid::new_v4();
        tracing::debug!(%request, ?options, "pick started");

        // The picker dialog blocks until dismissed; keep it off the
        // async workers.
        let filter = PickerFilter::from_options(
            options.allowed_mime_types.as_deref(),
            options.allowed_extensions.as_deref(),
        );
        let source = Arc::clone(&self.source);
        let selection =
            tokio::task::spawn_blocking(move || source.open_document(&filter)).await??;
        let handle = match selection {
            Selection::Picked(handle) => handle,
            Selection::Cancelled => return Err(PickError::Cancelled),
        };
        tracing::debug!(%request, handle = %handle, "picker returned");

        // Fail closed when the item reports no display name. Query
        // errors count as "no data".
        let name = self
            .provider
            .query_string(&handle, COLUMN_DISPLAY_NAME, None)
            .unwrap_or_else(|e| {
                tracing::debug!(%request, error = %e, "display name query failed");
                None
            })
            .ok_or(PickError::NoDisplayName)?;

        let symbols = options.invalid_name_symbols.unwrap_or_default();
        let file_name = sanitize_file_name(&name, &symbols);
        let extension = extension_of(&file_name);

        let path = self.resolve_or_copy(&handle, &file_name).await?;
        let doc = PickedDocument {
            file_name,
            extension,
            path,
        };
        tracing::info!(
            %request,
            file = %doc.file_name,
            extension = ?doc.extension,
            path = %doc.path,
            "pick resolved"
        );
        Ok(doc)
    }

    /// Resolve an already-held handle: strategy chain first, then the
    /// copy fallback named after the item's display name (or last path
    /// segment when the provider reports none).
    pub async fn resolve_uri(&self, uri: &str) -> Result<String, PickError> {
        let handle = ContentHandle::parse(uri)?;
        if let Some(path) = self.resolver.resolve(&handle, &*self.provider) {
            return Ok(path);
        }
        let name = self
            .provider
            .query_string(&handle, COLUMN_DISPLAY_NAME, None)
            .unwrap_or(None)
            .or_else(|| handle.last_path_segment())
            .ok_or(PickError::Unresolved)?;
        self.copy_fallback(&handle, &name).await
    }

    async fn resolve_or_copy(
        &self,
        handle: &ContentHandle,
        file_name: &str,
    ) -> Result<String, PickError> {
        if let Some(path) = self.resolver.resolve(handle, &*self.provider) {
            return Ok(path);
        }
        self.copy_fallback(handle, file_name).await
    }

    /// Byte copy into the cache directory, off the async workers.
    async fn copy_fallback(
        &self,
        handle: &ContentHandle,
        file_name: &str,
    ) -> Result<String, PickError> {
        let provider = Arc::clone(&self.provider);
        let handle = handle.clone();
        let file_name = file_name.to_string();
        let dest = tokio::task::spawn_blocking(move || {
            copy::copy_to_cache(&*provider, &handle, &file_name)
        })
        .await??;
        Ok(dest.to_string_lossy().into_owned())
    }
}
