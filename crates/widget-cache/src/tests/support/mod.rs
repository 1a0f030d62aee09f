//! Shared fixtures and helpers for cache tests.

mod recording_store;
mod world;

pub use recording_store::{CallKind, RecordingStore};
pub use world::CacheWorld;

/// Builds a minimal manifest with the given application identifier.
#[must_use]
pub fn manifest(id: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<widget xmlns="http://www.w3.org/ns/widgets" xmlns:gap="http://phonegap.com/ns/1.0" id="{id}" version="1.0.0">
    <name>Example</name>
    <preference name="orientation" value="portrait"/>
</widget>
"#
    )
}
