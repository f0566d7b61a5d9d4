use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use serde::Serialize;
use log::info;
use crate::error::{DigestError, Result};
use crate::extractor::PaperRecord;

/// Writes `records` as a pretty JSON array (4-space indent), replacing any existing file.
///
/// The write is not atomic; a concurrent reader may see a partial file.
pub fn persist(records: &[PaperRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DigestError::io(parent, e))?;
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| DigestError::io(path, e))?;

    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    records.serialize(&mut ser)?;
    writer.flush().map_err(|e| DigestError::io(path, e))?;

    info!("Saved {} papers to {}", records.len(), path.display());
    Ok(())
}

/// Reads back a file written by [`persist`].
pub fn load(path: impl AsRef<Path>) -> Result<Vec<PaperRecord>> {
    let path = path.as_ref();
    let mut content = String::new();
    File::open(path)
        .and_then(|mut f| f.read_to_string(&mut content))
        .map_err(|e| DigestError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}
