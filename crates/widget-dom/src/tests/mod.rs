//! Unit tests for parsing, mutation and serialisation.

use rstest::{fixture, rstest};

use crate::{Document, DomError, NodeId, NodeKind, SharedDocument};

const WIDGETS: &str = "http://www.w3.org/ns/widgets";
const PHONEGAP: &str = "http://phonegap.com/ns/1.0";

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<widget xmlns="http://www.w3.org/ns/widgets" xmlns:gap="http://phonegap.com/ns/1.0" id="org.example.app" version="1.0.0">
    <!-- application metadata -->
    <name short="Ex">Example &amp; Co</name>
    <gap:splash src="splash.png"/>
</widget>
"#;

#[fixture]
fn manifest() -> Document {
    Document::parse(MANIFEST).unwrap_or_else(|error| panic!("manifest should parse: {error}"))
}

fn root(document: &Document) -> NodeId {
    document
        .root()
        .unwrap_or_else(|| panic!("document should have a root"))
}

fn first_named(document: &Document, namespace: &str, local: &str) -> NodeId {
    document
        .child_elements_named(root(document), Some(namespace), local)
        .next()
        .unwrap_or_else(|| panic!("missing <{local}>"))
}

#[rstest]
fn resolves_default_and_prefixed_namespaces(manifest: Document) {
    let widget = root(&manifest);
    assert_eq!(manifest.local_name(widget), Some("widget"));
    assert_eq!(manifest.namespace(widget), Some(WIDGETS));
    assert_eq!(manifest.attribute(widget, "id"), Some("org.example.app"));

    let name = first_named(&manifest, WIDGETS, "name");
    assert_eq!(manifest.text_content(name), "Example & Co");
    assert_eq!(manifest.attribute(name, "short"), Some("Ex"));

    let splash = first_named(&manifest, PHONEGAP, "splash");
    assert_eq!(
        manifest.name(splash).and_then(|name| name.prefix()),
        Some("gap")
    );
}

#[rstest]
#[case::mismatched_end("<widget><name></widget>")]
#[case::unclosed("<widget><name>")]
#[case::stray_text("<widget/>trailing")]
#[case::two_roots("<widget/><widget/>")]
fn rejects_malformed_markup(#[case] markup: &str) {
    match Document::parse(markup) {
        Err(DomError::Syntax { .. }) => {}
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[rstest]
fn reports_missing_root() {
    assert_eq!(
        Document::parse("<!-- nothing here -->").map(|_| ()),
        Err(DomError::MissingRoot)
    );
}

#[rstest]
fn created_elements_start_detached(mut manifest: Document) {
    let widget = root(&manifest);
    let license = manifest.create_element_ns(Some(WIDGETS), "license");

    assert!(!manifest.is_attached(license));
    assert_eq!(manifest.parent(license), None);
    assert_eq!(
        manifest.child_elements_named(widget, Some(WIDGETS), "license").count(),
        0
    );

    manifest
        .append_child(widget, license)
        .unwrap_or_else(|error| panic!("append should succeed: {error}"));
    assert!(manifest.is_attached(license));
    assert_eq!(manifest.parent(license), Some(widget));
}

#[rstest]
fn created_elements_reuse_root_prefixes(mut manifest: Document) {
    let splash = manifest.create_element_ns(Some(PHONEGAP), "splash");
    assert_eq!(manifest.name(splash).map(ToString::to_string), Some("gap:splash".to_owned()));
    assert!(manifest.attributes(splash).is_empty());

    let default = manifest.create_element_ns(Some(WIDGETS), "icon");
    assert_eq!(manifest.name(default).map(ToString::to_string), Some("icon".to_owned()));
    assert!(manifest.attributes(default).is_empty());
}

#[rstest]
fn created_elements_declare_unbound_namespaces(mut manifest: Document) {
    let widget = root(&manifest);
    let extension = manifest.create_element_ns(Some("urn:example:ext"), "hook");
    assert_eq!(manifest.attribute(extension, "xmlns"), Some("urn:example:ext"));

    manifest
        .append_child(widget, extension)
        .unwrap_or_else(|error| panic!("append should succeed: {error}"));
    let markup = manifest
        .to_xml_string(4)
        .unwrap_or_else(|error| panic!("write should succeed: {error}"));
    assert!(markup.contains(r#"<hook xmlns="urn:example:ext"/>"#), "{markup}");

    let reparsed = Document::parse(&markup).unwrap_or_else(|error| panic!("{error}"));
    assert_eq!(
        reparsed
            .child_elements_named(root(&reparsed), Some("urn:example:ext"), "hook")
            .count(),
        1
    );
}

#[rstest]
fn refuses_invalid_insertions(mut manifest: Document) {
    let widget = root(&manifest);
    let name = first_named(&manifest, WIDGETS, "name");

    match manifest.append_child(widget, name) {
        Err(DomError::HierarchyRequest { .. }) => {}
        other => panic!("expected attached node to be refused, got {other:?}"),
    }

    let outer = manifest.create_element_ns(Some(WIDGETS), "feature");
    let inner = manifest.create_element_ns(Some(WIDGETS), "param");
    manifest
        .append_child(outer, inner)
        .unwrap_or_else(|error| panic!("{error}"));
    manifest
        .remove_child(outer, inner)
        .unwrap_or_else(|error| panic!("{error}"));
    manifest
        .append_child(inner, outer)
        .unwrap_or_else(|error| panic!("{error}"));
    match manifest.append_child(outer, inner) {
        Err(DomError::HierarchyRequest { .. }) => {}
        other => panic!("expected cycle to be refused, got {other:?}"),
    }
}

#[rstest]
fn removing_a_child_keeps_the_node_usable(mut manifest: Document) {
    let widget = root(&manifest);
    let name = first_named(&manifest, WIDGETS, "name");

    manifest
        .remove_child(widget, name)
        .unwrap_or_else(|error| panic!("{error}"));
    assert!(!manifest.is_attached(name));
    assert_eq!(manifest.text_content(name), "Example & Co");
    assert_eq!(
        manifest.remove_child(widget, name),
        Err(DomError::NotAChild {
            parent: widget,
            child: name
        })
    );
}

#[rstest]
fn cleanup_reindents_the_tree(mut manifest: Document) {
    manifest.cleanup();
    let widget = root(&manifest);
    let layout = manifest
        .children(widget)
        .iter()
        .filter(|child| matches!(manifest.kind(**child), Some(NodeKind::Text(_))))
        .count();
    assert_eq!(layout, 0);

    let markup = manifest
        .to_xml_string(4)
        .unwrap_or_else(|error| panic!("{error}"));
    assert!(markup.starts_with("<?xml"), "{markup}");
    assert!(markup.contains("\n    <name short=\"Ex\">Example &amp; Co</name>"), "{markup}");
    assert!(markup.contains("\n    <gap:splash src=\"splash.png\"/>"), "{markup}");
    assert!(markup.contains("<!-- application metadata -->"), "{markup}");
}

#[rstest]
fn cleanup_drops_repeated_namespace_declarations(mut manifest: Document) {
    let widget = root(&manifest);
    let icon = manifest.create_element_ns(Some(WIDGETS), "icon");
    manifest
        .set_attribute(icon, "xmlns", WIDGETS)
        .unwrap_or_else(|error| panic!("{error}"));
    manifest
        .append_child(widget, icon)
        .unwrap_or_else(|error| panic!("{error}"));

    manifest.cleanup();
    assert_eq!(manifest.attribute(icon, "xmlns"), None);
}

#[rstest]
fn set_text_content_replaces_children(mut manifest: Document) {
    let name = first_named(&manifest, WIDGETS, "name");
    manifest
        .set_text_content(name, "Renamed")
        .unwrap_or_else(|error| panic!("{error}"));
    assert_eq!(manifest.text_content(name), "Renamed");
    assert_eq!(manifest.children(name).len(), 1);
}

#[rstest]
fn shared_documents_track_revisions() {
    let shared = SharedDocument::new(Document::with_root(Some(WIDGETS), "widget"));
    let root = shared
        .root()
        .unwrap_or_else(|| panic!("document should have a root"));
    let before = shared.revision();

    root.set_attribute("id", Some("org.example"))
        .unwrap_or_else(|error| panic!("{error}"));
    assert!(shared.revision() > before);
    assert_eq!(root.attribute("id").as_deref(), Some("org.example"));

    let other = SharedDocument::new(Document::with_root(Some(WIDGETS), "widget"));
    let foreign = other
        .root()
        .unwrap_or_else(|| panic!("document should have a root"));
    let detached = foreign.create_element(Some(WIDGETS), "author");
    assert!(root.append(&detached).is_err());
    assert!(!root.same_node(&foreign));
}

#[rstest]
fn detached_elements_leave_the_revision_alone() {
    let shared = SharedDocument::new(Document::with_root(Some(WIDGETS), "widget"));
    let root = shared
        .root()
        .unwrap_or_else(|| panic!("document should have a root"));
    let before = shared.revision();

    let license = shared.create_detached(Some(WIDGETS), "license");
    let author = root.create_element(Some(WIDGETS), "author");

    assert_eq!(shared.revision(), before);
    assert!(!license.is_attached());
    assert!(!author.is_attached());
    assert_eq!(license.namespace().as_deref(), Some(WIDGETS));

    root.append(&license)
        .unwrap_or_else(|error| panic!("{error}"));
    assert!(shared.revision() > before);
}
