//! Profile file naming.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::{JoyError, Result};

/// Extension of profile files, without the dot.
pub const FILE_EXTENSION: &str = "conf";

/// Stem prefix of editor lock/temporary files (Emacs `.#name`).
pub const EDITOR_TEMP_MARKER: &str = ".#";

/// Derives the file name for an identity, e.g.
/// `1234-5678-0001 (My_Pad).conf`.
///
/// The numeric part is written only when one of the ids is nonzero, and then
/// all three are written. A name-only file never starts with
/// [`EDITOR_TEMP_MARKER`], which reloads would skip. Two identities that sanitize to the same text get the
/// same file name; saving the second one overwrites the first.
pub fn make_filename(vendor: u16, product: u16, version: u16, name: &str) -> Result<String> {
    let mut stem = String::new();
    if vendor != 0 || product != 0 || version != 0 {
        let _ = write!(stem, "{vendor:04x}-{product:04x}-{version:04x}");
    }

    let safe_name = sanitize_name(name);
    match (stem.is_empty(), safe_name.is_empty()) {
        (true, true) => return Err(JoyError::InvalidIdentity),
        (true, false) => {
            stem = match safe_name.strip_prefix(EDITOR_TEMP_MARKER) {
                Some(rest) => format!("._{rest}"),
                None => safe_name,
            };
        }
        (false, false) => {
            let _ = write!(stem, " ({safe_name})");
        }
        (false, true) => {}
    }

    Ok(format!("{stem}.{FILE_EXTENSION}"))
}

/// Replaces `/`, NUL and control characters with `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == '/' || c < ' ' { '_' } else { c })
        .collect()
}

/// Returns true for files a reload should consider: the profile extension
/// and not an editor temporary.
pub fn is_profile_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == FILE_EXTENSION) && !is_editor_temp(path)
}

/// Returns true if the file name carries the editor temporary marker.
pub fn is_editor_temp(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(EDITOR_TEMP_MARKER))
}
