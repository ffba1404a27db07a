use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::path::Path;

use crate::engine::errors::ColumnError;

/// Maps a serialized column file read-only. The caller keeps the `Mmap`
/// alive for as long as any supplier or reader borrows its bytes.
pub fn map_column_file(path: &Path) -> Result<Mmap, ColumnError> {
    let file = File::open(path)?;
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    Ok(mmap)
}
