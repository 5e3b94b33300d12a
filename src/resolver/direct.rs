//! Direct-scheme strategy — `file://` handles already carry their path.

use crate::handle::ContentHandle;
use crate::provider::ContentProvider;

use super::{PathStrategy, ResolverError};

/// Returns the path component of a `file` handle verbatim. No I/O.
pub struct DirectPath;

impl PathStrategy for DirectPath {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn try_resolve(
        &self,
        handle: &ContentHandle,
        _provider: &dyn ContentProvider,
    ) -> Result<Option<String>, ResolverError> {
        if handle.scheme() == "file" {
            Ok(Some(handle.path().to_string()))
        } else {
            Ok(None)
        }
    }
}
