//! Icon file helpers.

use std::path::Path;

/// File extensions accepted for application icons.
pub const ICON_EXTENSIONS: [&str; 6] = ["gif", "ico", "jpeg", "jpg", "png", "svg"];

/// Whether `path` has one of the [`ICON_EXTENSIONS`], ignoring case.
#[must_use]
pub fn is_icon_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            ICON_EXTENSIONS
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(extension))
        })
}
