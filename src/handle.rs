//! Content handle — parsed provider-scoped URIs.
//!
//! A [`ContentHandle`] is the opaque identifier the OS picker hands back
//! for a selected item: a scheme, the issuing provider's authority, and a
//! provider-specific path. Parsed once on receipt, immutable afterwards.

use std::fmt;

/// Authority of the external-storage documents provider.
pub const AUTHORITY_EXTERNAL_STORAGE: &str = "com.android.externalstorage.documents";

/// Authority of the downloads documents provider.
pub const AUTHORITY_DOWNLOADS: &str = "com.android.providers.downloads.documents";

/// Authority of the media documents provider.
pub const AUTHORITY_MEDIA: &str = "com.android.providers.media.documents";

/// Authority of the cloud photos provider. Items behind it have no local
/// path at all; resolution yields a remote identifier instead.
pub const AUTHORITY_CLOUD_PHOTOS: &str = "com.google.android.apps.photos.content";

/// Handle parse errors.
#[derive(Debug, thiserror::Error)]
pub enum HandleError {
    #[error("empty handle")]
    Empty,
    #[error("missing scheme in {0:?}")]
    MissingScheme(String),
}

/// A parsed content handle.
///
/// The path is kept percent-encoded internally so segment boundaries
/// survive encoded slashes; accessors decode on the way out. `raw` keeps
/// the original text for display and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHandle {
    raw: String,
    scheme: String,
    authority: String,
    encoded_path: String,
    decoded_path: String,
}

impl ContentHandle {
    /// Parse `scheme://authority/path` (or `scheme:///path` for
    /// authority-less file references).
    pub fn parse(input: &str) -> Result<Self, HandleError> {
        if input.is_empty() {
            return Err(HandleError::Empty);
        }
        let (scheme, rest) = input
            .split_once("://")
            .ok_or_else(|| HandleError::MissingScheme(input.to_string()))?;
        if scheme.is_empty() {
            return Err(HandleError::MissingScheme(input.to_string()));
        }
        let (authority, path) = match rest.split_once('/') {
            Some((auth, p)) => (auth.to_string(), format!("/{p}")),
            None => (rest.to_string(), String::new()),
        };
        Ok(Self {
            raw: input.to_string(),
            scheme: scheme.to_ascii_lowercase(),
            authority,
            decoded_path: percent_decode(&path),
            encoded_path: path,
        })
    }

    /// Build a row handle from a collection base and a numeric row id,
    /// e.g. `content://downloads/public_downloads` + `71`.
    pub fn with_appended_id(base: &str, id: &str) -> Result<Self, HandleError> {
        Self::parse(&format!("{}/{}", base.trim_end_matches('/'), id))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Decoded path component, including the leading `/` (empty for
    /// authority-only handles).
    pub fn path(&self) -> &str {
        &self.decoded_path
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Final non-empty path segment, decoded. Segment boundaries are
    /// taken before decoding, so an encoded slash stays inside its
    /// segment.
    pub fn last_path_segment(&self) -> Option<String> {
        self.encoded_path
            .rsplit('/')
            .find(|s| !s.is_empty())
            .map(percent_decode)
    }

    /// Whether this is a structured document handle
    /// (`content://<authority>/document/<doc-id>`).
    pub fn is_document(&self) -> bool {
        self.scheme == "content" && self.first_segment() == Some("document")
    }

    /// The document id of a structured document handle.
    ///
    /// Everything after the `document/` segment, percent-decoded, so
    /// `document/primary%3ADownload%2Fx.pdf` yields
    /// `primary:Download/x.pdf`.
    pub fn document_id(&self) -> Option<String> {
        if !self.is_document() {
            return None;
        }
        self.encoded_path
            .strip_prefix("/document/")
            .filter(|id| !id.is_empty())
            .map(percent_decode)
    }

    fn first_segment(&self) -> Option<&str> {
        self.encoded_path.split('/').find(|s| !s.is_empty())
    }
}

impl fmt::Display for ContentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Decode `%XX` escapes. Invalid escapes are kept literally.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(s: &str) -> ContentHandle {
        ContentHandle::parse(s).unwrap()
    }

    // -- Parsing --

    #[test]
    fn parse_file_uri() {
        let handle = h("file:///a/b.txt");
        assert_eq!(handle.scheme(), "file");
        assert_eq!(handle.authority(), "");
        assert_eq!(handle.path(), "/a/b.txt");
    }

    #[test]
    fn parse_content_uri() {
        let handle = h("content://media/external/images/media");
        assert_eq!(handle.scheme(), "content");
        assert_eq!(handle.authority(), "media");
        assert_eq!(handle.path(), "/external/images/media");
    }

    #[test]
    fn parse_authority_only() {
        let handle = h("content://com.example.provider");
        assert_eq!(handle.authority(), "com.example.provider");
        assert_eq!(handle.path(), "");
        assert_eq!(handle.last_path_segment(), None);
    }

    #[test]
    fn parse_rejects_empty_and_schemeless() {
        assert!(matches!(ContentHandle::parse(""), Err(HandleError::Empty)));
        assert!(matches!(
            ContentHandle::parse("/plain/path"),
            Err(HandleError::MissingScheme(_))
        ));
        assert!(matches!(
            ContentHandle::parse("://no-scheme/x"),
            Err(HandleError::MissingScheme(_))
        ));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(h("FILE:///a").scheme(), "file");
    }

    // -- Document ids --

    #[test]
    fn document_id_is_decoded() {
        let handle = h(
            "content://com.android.externalstorage.documents/document/primary%3ADownload%2Fx.pdf",
        );
        assert!(handle.is_document());
        assert_eq!(handle.document_id().as_deref(), Some("primary:Download/x.pdf"));
    }

    #[test]
    fn non_document_has_no_id() {
        let handle = h("content://media/external/images/media/42");
        assert!(!handle.is_document());
        assert_eq!(handle.document_id(), None);
    }

    #[test]
    fn file_uri_is_never_a_document() {
        assert!(!h("file:///document/1").is_document());
    }

    // -- Segments and appended ids --

    #[test]
    fn last_path_segment() {
        assert_eq!(h("content://a/b/c/d").last_path_segment().as_deref(), Some("d"));
        assert_eq!(h("content://a/b/c/").last_path_segment().as_deref(), Some("c"));
    }

    #[test]
    fn with_appended_id_builds_row_handle() {
        let handle =
            ContentHandle::with_appended_id("content://downloads/public_downloads", "71").unwrap();
        assert_eq!(handle.as_str(), "content://downloads/public_downloads/71");
        assert_eq!(handle.last_path_segment().as_deref(), Some("71"));
    }

    // -- Percent decoding --

    #[test]
    fn invalid_escape_kept_literally() {
        assert_eq!(h("content://a/x%zz").path(), "/x%zz");
        assert_eq!(h("content://a/trailing%2").path(), "/trailing%2");
    }
}
