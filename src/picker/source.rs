//! DocumentSource trait — the OS-native "open document" facility.

use crate::handle::ContentHandle;

/// Errors from the native picker adapter.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("no picker tool available (tried zenity, kdialog)")]
    NoPickerTool,
    #[error("picker produced unusable output: {0}")]
    BadOutput(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of one picker invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Picked(ContentHandle),
    Cancelled,
}

/// MIME/extension constraints passed to the picker.
///
/// Mapping from the caller's allowed MIME types: exactly one entry
/// becomes the hard filter; several entries open the picker
/// unconstrained with the full set as hints; none leaves it fully
/// unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickerFilter {
    /// The single hard MIME constraint, if any.
    pub primary_mime: Option<String>,
    /// Advisory MIME set shown to the picker when more than one type
    /// is allowed.
    pub mime_hints: Vec<String>,
    /// Advisory extension list for display filtering.
    pub extension_hints: Vec<String>,
}

impl PickerFilter {
    pub fn from_options(
        allowed_mime_types: Option<&[String]>,
        allowed_extensions: Option<&[String]>,
    ) -> Self {
        let mut filter = Self {
            extension_hints: allowed_extensions.map(<[String]>::to_vec).unwrap_or_default(),
            ..Self::default()
        };
        match allowed_mime_types {
            Some([single]) => filter.primary_mime = Some(single.clone()),
            Some(many) if !many.is_empty() => filter.mime_hints = many.to_vec(),
            _ => {}
        }
        filter
    }
}

/// Opens the OS document picker and reports the user's choice.
///
/// Blocking for the lifetime of the picker dialog; the orchestrator
/// always invokes it on a blocking worker. `Send + Sync` so the adapter
/// can be shared across requests.
pub trait DocumentSource: Send + Sync {
    fn open_document(&self, filter: &PickerFilter) -> Result<Selection, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mimes(list: &[&str]) -> Option<Vec<String>> {
        Some(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn single_mime_becomes_hard_filter() {
        let m = mimes(&["application/pdf"]);
        let filter = PickerFilter::from_options(m.as_deref(), None);
        assert_eq!(filter.primary_mime.as_deref(), Some("application/pdf"));
        assert!(filter.mime_hints.is_empty());
    }

    #[test]
    fn several_mimes_become_hints() {
        let m = mimes(&["image/png", "image/jpeg"]);
        let filter = PickerFilter::from_options(m.as_deref(), None);
        assert_eq!(filter.primary_mime, None);
        assert_eq!(filter.mime_hints, vec!["image/png", "image/jpeg"]);
    }

    #[test]
    fn absent_mimes_leave_picker_unconstrained() {
        let filter = PickerFilter::from_options(None, None);
        assert_eq!(filter, PickerFilter::default());

        let empty = mimes(&[]);
        let filter = PickerFilter::from_options(empty.as_deref(), None);
        assert_eq!(filter.primary_mime, None);
        assert!(filter.mime_hints.is_empty());
    }
}
