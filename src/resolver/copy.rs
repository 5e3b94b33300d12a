//! Copy-to-cache fallback — the only strategy that moves bytes.
//!
//! Streams the handle's content into `<cache_dir>/<file_name>` in fixed
//! 1024-byte chunks. A pre-existing file of that name is removed first,
//! so repeated resolution overwrites instead of appending. On a failed
//! transfer the partial destination is removed before the error
//! propagates; a partially-written path never reaches the caller.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

use crate::handle::ContentHandle;
use crate::provider::ContentProvider;

use super::ResolverError;

const CHUNK_SIZE: usize = 1024;

/// Copy the handle's byte content into the provider's cache directory.
///
/// `file_name` must already be sanitized; it becomes the destination
/// name verbatim. Blocking; run on a blocking worker.
pub fn copy_to_cache(
    provider: &dyn ContentProvider,
    handle: &ContentHandle,
    file_name: &str,
) -> Result<PathBuf, ResolverError> {
    let cache_dir = provider.layout().cache_dir.clone();
    fs::create_dir_all(&cache_dir).map_err(ResolverError::Copy)?;

    let dest = cache_dir.join(file_name);
    if dest.exists() {
        fs::remove_file(&dest).map_err(ResolverError::Copy)?;
    }

    let mut input = provider.open_read(handle)?;
    match transfer(&mut *input, &dest) {
        Ok(()) => Ok(dest),
        Err(e) => {
            // Never leave a partial file behind.
            let _ = fs::remove_file(&dest);
            Err(ResolverError::Copy(e))
        }
    }
}

fn transfer(input: &mut dyn Read, dest: &std::path::Path) -> std::io::Result<()> {
    let mut output = BufWriter::new(File::create(dest)?);
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        output.write_all(&buf[..n])?;
    }
    output.flush()
}
