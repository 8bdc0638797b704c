//! Default poster path derivation.
//!
//! Callers that omit an explicit poster get one by a fixed naming
//! convention: replace the clip file extension with an image extension and
//! relocate the file into a sibling `posters` directory.
//!
//! `/videos/demo.mp4` -> `/videos/posters/demo.jpg`
//!
//! The convention is part of the public contract - default-poster callers
//! lay their assets out to match it.

use std::path::{Path, PathBuf};

/// Sibling directory holding derived posters.
pub const POSTER_DIR: &str = "posters";

/// Image extension of derived posters.
pub const POSTER_EXT: &str = "jpg";

/// Derive the default poster path for a clip source.
///
/// Computed once at component construction; never recomputed on re-render.
pub fn derive_poster_path(source: &Path) -> PathBuf {
    let mut name = source.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(POSTER_EXT);

    match source.parent() {
        Some(parent) => parent.join(POSTER_DIR).join(name),
        None => PathBuf::from(POSTER_DIR).join(name),
    }
}
