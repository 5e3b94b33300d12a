//! Authority-specific strategies for structured document handles.
//!
//! These cover the three well-known document providers: external storage
//! (path synthesized from the `type:subpath` document id), downloads
//! (display-name shortcut, `raw:` literal paths, then the public
//! downloads table), and media (row lookup in the matching collection).

use std::path::Path;

use crate::handle::{
    AUTHORITY_DOWNLOADS, AUTHORITY_EXTERNAL_STORAGE, AUTHORITY_MEDIA, ContentHandle,
};
use crate::provider::{COLUMN_DATA, COLUMN_DISPLAY_NAME, COLUMN_ROW_ID, ContentProvider};

use super::{PathStrategy, ResolverError};

/// Public downloads table queried by numeric row id.
const PUBLIC_DOWNLOADS: &str = "content://downloads/public_downloads";

/// Media collections, keyed by the document id's type prefix.
const MEDIA_IMAGES: &str = "content://media/external/images/media";
const MEDIA_VIDEO: &str = "content://media/external/video/media";
const MEDIA_AUDIO: &str = "content://media/external/audio/media";

/// External-storage documents: `type:subpath` ids.
///
/// `primary` ids live under the external storage root. Other volume
/// types get a best-effort `storage/<volume>/<subpath>` synthesis that
/// may not exist on every device.
pub struct ExternalStorageDocs;

impl PathStrategy for ExternalStorageDocs {
    fn name(&self) -> &'static str {
        "external-storage"
    }

    fn try_resolve(
        &self,
        handle: &ContentHandle,
        provider: &dyn ContentProvider,
    ) -> Result<Option<String>, ResolverError> {
        if handle.authority() != AUTHORITY_EXTERNAL_STORAGE {
            return Ok(None);
        }
        let Some(doc_id) = handle.document_id() else {
            return Ok(None);
        };

        let (volume, subpath) = split_doc_id(&doc_id);
        if volume.eq_ignore_ascii_case("primary") {
            let root = &provider.layout().external_root;
            let path = match subpath {
                Some(sub) => root.join(sub),
                None => root.clone(),
            };
            return Ok(Some(path.to_string_lossy().into_owned()));
        }

        // Secondary volumes (SD cards) mount under /storage/<volume>.
        Ok(Some(format!("storage/{}", doc_id.replace(':', "/"))))
    }
}

/// Downloads documents.
pub struct DownloadsDocs;

impl PathStrategy for DownloadsDocs {
    fn name(&self) -> &'static str {
        "downloads"
    }

    fn try_resolve(
        &self,
        handle: &ContentHandle,
        provider: &dyn ContentProvider,
    ) -> Result<Option<String>, ResolverError> {
        if handle.authority() != AUTHORITY_DOWNLOADS {
            return Ok(None);
        }
        let Some(doc_id) = handle.document_id() else {
            return Ok(None);
        };

        // A reported display name puts the file in the shared Download
        // directory.
        if let Some(name) = provider.query_string(handle, COLUMN_DISPLAY_NAME, None)? {
            let path = provider.layout().external_root.join("Download").join(name);
            return Ok(Some(path.to_string_lossy().into_owned()));
        }

        // `raw:` ids embed a literal filesystem path.
        if let Some(raw) = doc_id.strip_prefix("raw:") {
            if Path::new(raw).exists() {
                return Ok(Some(raw.to_string()));
            }
        }

        // Fall back to the public downloads table, keyed by row id.
        // Non-numeric ids cannot address a row.
        if doc_id.parse::<i64>().is_err() {
            return Ok(None);
        }
        let row = ContentHandle::with_appended_id(PUBLIC_DOWNLOADS, &doc_id)
            .expect("static base URI parses");
        Ok(provider.query_string(&row, COLUMN_DATA, None)?)
    }
}

/// Media documents: `type:rowid` ids against the image/video/audio
/// collections.
pub struct MediaDocs;

impl PathStrategy for MediaDocs {
    fn name(&self) -> &'static str {
        "media"
    }

    fn try_resolve(
        &self,
        handle: &ContentHandle,
        provider: &dyn ContentProvider,
    ) -> Result<Option<String>, ResolverError> {
        if handle.authority() != AUTHORITY_MEDIA {
            return Ok(None);
        }
        let Some(doc_id) = handle.document_id() else {
            return Ok(None);
        };

        let (media_type, row_id) = split_doc_id(&doc_id);
        let Some(row_id) = row_id else {
            return Ok(None);
        };
        let collection = match media_type {
            "image" => MEDIA_IMAGES,
            "video" => MEDIA_VIDEO,
            "audio" => MEDIA_AUDIO,
            _ => return Ok(None),
        };

        let collection = ContentHandle::parse(collection).expect("static collection URI parses");
        Ok(provider.query_string(&collection, COLUMN_DATA, Some((COLUMN_ROW_ID, row_id)))?)
    }
}

/// Split a `type:rest` document id. Trailing empty parts are dropped, so
/// `primary:` behaves like `primary`.
fn split_doc_id(doc_id: &str) -> (&str, Option<&str>) {
    match doc_id.split_once(':') {
        Some((volume, rest)) if !rest.is_empty() => (volume, Some(rest)),
        Some((volume, _)) => (volume, None),
        None => (doc_id, None),
    }
}
