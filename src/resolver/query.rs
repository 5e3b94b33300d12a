//! Generic data-column strategy — last resort before the copy fallback.

use crate::handle::ContentHandle;
use crate::provider::{COLUMN_DATA, ContentProvider};

use super::{PathStrategy, ResolverError};

/// Queries an arbitrary `content` handle for its backing `_data` column.
///
/// Providers that keep their rows on local storage answer with the real
/// path; everyone else yields no rows and the chain ends.
pub struct DataColumn;

impl PathStrategy for DataColumn {
    fn name(&self) -> &'static str {
        "data-column"
    }

    fn try_resolve(
        &self,
        handle: &ContentHandle,
        provider: &dyn ContentProvider,
    ) -> Result<Option<String>, ResolverError> {
        if handle.scheme() != "content" {
            return Ok(None);
        }
        Ok(provider.query_string(handle, COLUMN_DATA, None)?)
    }
}
