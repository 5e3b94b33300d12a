//! Filesystem-backed content provider.
//!
//! Maps `content://<authority>/<path>` onto a directory tree rooted at
//! `content_root`: each provider row is a real file at
//! `<content_root>/<authority>/<path>`. A selection `(column, value)`
//! selects the entry named `value` under the mapped directory. `file://`
//! handles bypass the mapping and address the filesystem directly.
//!
//! This is the concrete adapter behind the CLI and daemon; tests build
//! fixtures for it under a tempdir.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::handle::ContentHandle;

use super::{COLUMN_DATA, COLUMN_DISPLAY_NAME, ContentProvider, ProviderError, Selection,
            StorageLayout};

pub struct FsProvider {
    content_root: PathBuf,
    layout: StorageLayout,
}

impl FsProvider {
    pub fn new(content_root: PathBuf, layout: StorageLayout) -> Self {
        Self {
            content_root,
            layout,
        }
    }

    /// Map a handle (plus optional selection) to the backing file path.
    fn backing_path(&self, handle: &ContentHandle, selection: Selection) -> Option<PathBuf> {
        let mut path = match handle.scheme() {
            "file" => PathBuf::from(handle.path()),
            "content" => {
                let mut p = self.content_root.join(handle.authority());
                for segment in handle.path().split('/').filter(|s| !s.is_empty()) {
                    // Row paths stay inside the mapped tree.
                    if segment == ".." {
                        return None;
                    }
                    p.push(segment);
                }
                p
            }
            _ => return None,
        };
        if let Some((_, value)) = selection {
            path.push(value);
        }
        Some(path)
    }
}

impl ContentProvider for FsProvider {
    fn query_string(
        &self,
        handle: &ContentHandle,
        column: &str,
        selection: Selection,
    ) -> Result<Option<String>, ProviderError> {
        let Some(path) = self.backing_path(handle, selection) else {
            return Err(ProviderError::Unsupported(handle.to_string()));
        };
        if !path.is_file() {
            return Ok(None);
        }
        match column {
            COLUMN_DISPLAY_NAME => Ok(file_name_of(&path)),
            COLUMN_DATA => Ok(Some(path.to_string_lossy().into_owned())),
            other => Err(ProviderError::Query(format!("unknown column {other:?}"))),
        }
    }

    fn open_read(&self, handle: &ContentHandle) -> Result<Box<dyn Read + Send>, ProviderError> {
        let path = self
            .backing_path(handle, None)
            .ok_or_else(|| ProviderError::Unsupported(handle.to_string()))?;
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn layout(&self) -> &StorageLayout {
        &self.layout
    }
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
