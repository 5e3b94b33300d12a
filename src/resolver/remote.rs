//! Remote-identifier strategy for providers without local storage.

use crate::handle::{AUTHORITY_CLOUD_PHOTOS, ContentHandle};
use crate::provider::ContentProvider;

use super::{PathStrategy, ResolverError};

/// Cloud-photos items never have an on-disk path. Resolution yields the
/// handle's last path segment — a remote identifier the caller must not
/// treat as an openable file.
pub struct RemoteId;

impl PathStrategy for RemoteId {
    fn name(&self) -> &'static str {
        "remote-id"
    }

    fn try_resolve(
        &self,
        handle: &ContentHandle,
        _provider: &dyn ContentProvider,
    ) -> Result<Option<String>, ResolverError> {
        if handle.scheme() != "content"
            || handle.authority() != AUTHORITY_CLOUD_PHOTOS
            || handle.is_document()
        {
            return Ok(None);
        }
        Ok(handle.last_path_segment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::testutil::NoIoProvider;

    #[test]
    fn cloud_photos_yields_last_segment() {
        let handle = ContentHandle::parse(&format!(
            "content://{AUTHORITY_CLOUD_PHOTOS}/0/1/mediakey%3A%2Flocal%2Fabc123"
        ))
        .unwrap();
        let id = RemoteId
            .try_resolve(&handle, &NoIoProvider::new())
            .unwrap()
            .unwrap();
        assert_eq!(id, "mediakey:/local/abc123");
    }

    #[test]
    fn other_authorities_decline() {
        let handle = ContentHandle::parse("content://acme.provider/x").unwrap();
        assert_eq!(
            RemoteId.try_resolve(&handle, &NoIoProvider::new()).unwrap(),
            None
        );
    }
}
