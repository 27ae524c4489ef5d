//! Line-oriented rule files.
//!
//! One entry per line. Lines starting with `#` and blank lines are ignored,
//! and anything after a `#` on an entry line is treated as a comment:
//!
//! ```text
//! # IP Blacklist - IPs in this list will be denied access
//! # Generated: 2025-01-31 12:00:00
//! 10.0.0.0/8
//! 169.254.169.254   # metadata service
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use tracing::debug;

use super::{AclError, Result};

/// Read the entries of a rule file, in file order.
pub fn read_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AclError::FileNotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => AclError::PermissionDenied(path.to_path_buf()),
        _ => AclError::Io(e),
    })?;

    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        if let Some(entry) = parse_line(&line?) {
            entries.push(entry.to_string());
        }
    }

    if entries.is_empty() {
        return Err(AclError::EmptyFile(path.to_path_buf()));
    }

    debug!(path = %path.display(), entries = entries.len(), "read rule file");
    Ok(entries)
}

/// Write entries to a rule file.
///
/// The file starts with `# <header>` (skipped when `header` is empty) and a
/// `# Generated: <timestamp>` line. An existing file is only replaced when
/// `overwrite` is set.
pub fn save_list<S: AsRef<str>>(
    path: impl AsRef<Path>,
    entries: &[S],
    header: &str,
    overwrite: bool,
) -> Result<()> {
    let path = path.as_ref();

    if !overwrite && path.try_exists()? {
        return Err(AclError::FileExists(path.to_path_buf()));
    }

    let file = File::create(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => AclError::PermissionDenied(path.to_path_buf()),
        _ => AclError::Io(e),
    })?;

    let mut writer = BufWriter::new(file);
    if !header.is_empty() {
        writeln!(writer, "# {}", header)?;
    }
    writeln!(
        writer,
        "# Generated: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    for entry in entries {
        writeln!(writer, "{}", entry.as_ref())?;
    }
    writer.flush()?;

    debug!(path = %path.display(), entries = entries.len(), "saved rule file");
    Ok(())
}

/// Strip comments and whitespace from one line; `None` if nothing is left.
fn parse_line(line: &str) -> Option<&str> {
    let entry = match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
    .trim();

    (!entry.is_empty()).then_some(entry)
}
