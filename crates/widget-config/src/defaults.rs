use camino::Utf8PathBuf;

/// Location of the manifest relative to a project root.
pub const DEFAULT_MANIFEST_PATH: &str = "www/config.xml";

/// Spaces per nesting level when a manifest is written back.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default manifest location relative to a project root.
#[must_use]
pub fn default_manifest_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_MANIFEST_PATH)
}

/// Default indentation width.
#[must_use]
pub fn default_indent_width() -> usize {
    DEFAULT_INDENT_WIDTH
}

/// Default log filter expression.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub(crate) fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}
