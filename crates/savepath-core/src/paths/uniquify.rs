//! Uniquified candidate names.
//!
//! `report.pdf` becomes `report (1).pdf`, `report (2).pdf`, and so on. The
//! suffix goes before the extension; compound archive extensions such as
//! `.tar.gz` are kept together.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Compression extensions that pair with an inner `.tar`.
const TAR_COMPRESSIONS: &[&str] = &["gz", "bz2", "xz", "z", "zst", "lz", "lzma", "br"];

/// Split a filename into `(base, extension)` where the extension has no
/// leading dot and may be compound (`tar.gz`).
fn split_extension(file_name: &OsStr) -> (OsString, Option<OsString>) {
    let as_path = Path::new(file_name);
    let (Some(stem), Some(ext)) = (as_path.file_stem(), as_path.extension()) else {
        return (file_name.to_os_string(), None);
    };

    let is_compression = ext
        .to_str()
        .is_some_and(|e| TAR_COMPRESSIONS.iter().any(|c| c.eq_ignore_ascii_case(e)));
    if is_compression {
        let inner = Path::new(stem);
        if let (Some(inner_stem), Some(inner_ext)) = (inner.file_stem(), inner.extension()) {
            if inner_ext.eq_ignore_ascii_case("tar") {
                let mut compound = inner_ext.to_os_string();
                compound.push(".");
                compound.push(ext);
                return (inner_stem.to_os_string(), Some(compound));
            }
        }
    }

    (stem.to_os_string(), Some(ext.to_os_string()))
}

/// Build the `n`th uniquified candidate for `path`.
///
/// Returns `None` if `path` has no filename component.
pub fn uniquified_path(path: &Path, n: u32) -> Option<PathBuf> {
    let file_name = path.file_name()?;
    let (base, ext) = split_extension(file_name);

    let mut name = base;
    name.push(format!(" ({n})"));
    if let Some(ext) = ext {
        name.push(".");
        name.push(ext);
    }

    Some(path.with_file_name(name))
}

/// Iterate candidates `1..=max_attempts` for `path`, in order.
pub fn uniquified_candidates(path: &Path, max_attempts: u32) -> impl Iterator<Item = PathBuf> + '_ {
    (1..=max_attempts).filter_map(move |n| uniquified_path(path, n))
}
