use std::fs::{self, File};
use std::path::Path;

/// Refuse to write a file with a header and no records.
pub(crate) fn require_records<T>(
    records: &[T],
    what: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if records.is_empty() {
        return Err(format!("no {what} to export").into());
    }
    Ok(())
}

/// Create (or truncate) the output file, creating missing parent directories.
pub(crate) fn create_output_file(
    path: impl AsRef<Path>,
) -> Result<File, Box<dyn std::error::Error>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}
