//! Native picker adapter — desktop dialog tools as the OS facility.
//!
//! Spawns `zenity --file-selection`, falling back to
//! `kdialog --getopenfilename`. The chosen path comes back on stdout as
//! a `file://` handle; a dismissed dialog exits non-zero and maps to
//! [`Selection::Cancelled`].
//!
//! Only kdialog filters by MIME type; zenity's `--file-filter` speaks
//! globs. A hard MIME constraint therefore tries kdialog first, and the
//! zenity path approximates the constraint with a glob derived from the
//! MIME subtype (`application/pdf` -> `*.pdf`).

use std::io::ErrorKind;
use std::process::{Command, Stdio};

use crate::handle::ContentHandle;

use super::source::{DocumentSource, PickerFilter, Selection, SourceError};

pub struct CommandSource;

impl CommandSource {
    fn spawn_zenity(&self, filter: &PickerFilter) -> Result<Option<Selection>, SourceError> {
        let mut cmd = Command::new("zenity");
        cmd.arg("--file-selection");
        if let Some(pattern) = filter_pattern(filter) {
            cmd.arg(format!("--file-filter={pattern}"));
        }
        run_dialog(cmd)
    }

    fn spawn_kdialog(&self, filter: &PickerFilter) -> Result<Option<Selection>, SourceError> {
        let mut cmd = Command::new("kdialog");
        cmd.args(["--getopenfilename", "."]);
        // kdialog takes a space-separated MIME filter: the hard
        // constraint when there is one, otherwise the advisory set.
        let mimes = match (&filter.primary_mime, filter.mime_hints.as_slice()) {
            (Some(single), _) => single.clone(),
            (None, hints) => hints.join(" "),
        };
        if !mimes.is_empty() {
            cmd.arg(mimes);
        }
        run_dialog(cmd)
    }
}

impl DocumentSource for CommandSource {
    fn open_document(&self, filter: &PickerFilter) -> Result<Selection, SourceError> {
        // kdialog can enforce a MIME constraint exactly, so it goes
        // first when one is set.
        let spawns: [fn(&Self, &PickerFilter) -> Result<Option<Selection>, SourceError>; 2] =
            if filter.primary_mime.is_some() {
                [Self::spawn_kdialog, Self::spawn_zenity]
            } else {
                [Self::spawn_zenity, Self::spawn_kdialog]
            };
        for spawn in spawns {
            if let Some(selection) = spawn(self, filter)? {
                return Ok(selection);
            }
        }
        Err(SourceError::NoPickerTool)
    }
}

/// Run a dialog command. `Ok(None)` means the tool is not installed and
/// the next one should be tried.
fn run_dialog(mut cmd: Command) -> Result<Option<Selection>, SourceError> {
    let output = match cmd
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    // Dialog tools exit non-zero when the user dismisses the picker.
    if !output.status.success() {
        return Ok(Some(Selection::Cancelled));
    }

    let raw = String::from_utf8_lossy(&output.stdout);
    let path = raw.trim();
    if path.is_empty() {
        return Ok(Some(Selection::Cancelled));
    }
    let handle = ContentHandle::parse(&format!("file://{path}"))
        .map_err(|e| SourceError::BadOutput(e.to_string()))?;
    Ok(Some(Selection::Picked(handle)))
}

/// Zenity file-filter pattern: extension hints as globs, or a glob
/// derived from the hard MIME constraint's subtype when there are no
/// hints. Wildcard subtypes cannot narrow anything and yield no filter.
fn filter_pattern(filter: &PickerFilter) -> Option<String> {
    if !filter.extension_hints.is_empty() {
        let globs: Vec<String> = filter
            .extension_hints
            .iter()
            .map(|ext| format!("*.{}", ext.trim_start_matches('.')))
            .collect();
        return Some(globs.join(" "));
    }
    let mime = filter.primary_mime.as_deref()?;
    let subtype = mime.rsplit('/').next()?;
    if subtype.is_empty() || subtype == "*" {
        return None;
    }
    Some(format!("*.{subtype}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_with_exts(exts: &[&str]) -> PickerFilter {
        PickerFilter {
            extension_hints: exts.iter().map(|s| s.to_string()).collect(),
            ..PickerFilter::default()
        }
    }

    #[test]
    fn extension_hints_become_globs() {
        let pattern = filter_pattern(&filter_with_exts(&["pdf", ".txt"])).unwrap();
        assert_eq!(pattern, "*.pdf *.txt");
    }

    #[test]
    fn no_hints_means_no_filter_argument() {
        assert_eq!(filter_pattern(&PickerFilter::default()), None);
    }

    #[test]
    fn hard_mime_constraint_becomes_subtype_glob() {
        let filter = PickerFilter {
            primary_mime: Some("application/pdf".to_string()),
            ..PickerFilter::default()
        };
        assert_eq!(filter_pattern(&filter).as_deref(), Some("*.pdf"));
    }

    #[test]
    fn wildcard_mime_subtype_yields_no_filter() {
        let filter = PickerFilter {
            primary_mime: Some("image/*".to_string()),
            ..PickerFilter::default()
        };
        assert_eq!(filter_pattern(&filter), None);
    }

    #[test]
    fn extension_hints_win_over_mime_glob() {
        let filter = PickerFilter {
            primary_mime: Some("application/pdf".to_string()),
            extension_hints: vec!["txt".to_string()],
            ..PickerFilter::default()
        };
        assert_eq!(filter_pattern(&filter).as_deref(), Some("*.txt"));
    }
}
