use apidiff::{parse_file, ApiDocument, LoadError, MemberKind, TypeKind};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes `content` to a temporary file, copies it to a sibling path with
/// `extension` and loads that copy.
fn parse_with_extension(content: &str, extension: &str) -> Result<ApiDocument, LoadError> {
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(content.as_bytes()).unwrap();
    let path = temp.path().with_extension(extension);
    fs::copy(temp.path(), &path).unwrap();

    let result = parse_file(&path);
    fs::remove_file(&path).ok();
    result
}

/// Loads `content` from a temporary file without an extension.
fn parse_sniffed(content: &str) -> Result<ApiDocument, LoadError> {
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(content.as_bytes()).unwrap();
    assert!(temp.path().extension().is_none());
    parse_file(temp.path())
}

#[test]
fn test_fixture_structure() {
    let doc = parse_file(Path::new("tests/fixtures/uikit-2.0.xml")).unwrap();
    let assembly = doc.find_assembly("UIKit").unwrap();
    assert_eq!(assembly.version.as_deref(), Some("2.0.0.0"));

    let namespace = assembly.find_namespace("UIKit").unwrap();
    assert_eq!(namespace.types.len(), 4);

    let view = namespace.find_type("UIView").unwrap();
    assert_eq!(view.base_type.as_deref(), Some("UIKit.UIResponder"));
    assert_eq!(view.members(MemberKind::Method).len(), 4);
    assert!(view.constructors.is_none());
    assert!(view.find_nested("UIViewAppearance").is_some());

    let delegate = namespace.find_type("IUIPointerInteractionDelegate").unwrap();
    assert_eq!(delegate.kind, TypeKind::Interface);

    let obsolete = view.members(MemberKind::Method)[2].attributes[0]
        .as_obsolete()
        .unwrap();
    assert_eq!(obsolete.message.as_deref(), Some("Use SetNeedsUpdateConstraints"));
    assert!(!obsolete.is_error);
}

#[test]
fn test_json_yaml_and_toml_documents() {
    let json = r#"{
        "assemblies": [{
            "name": "Lib",
            "namespaces": [{
                "name": "Demo",
                "types": [{"name": "Widget", "kind": "struct", "methods": []}]
            }]
        }]
    }"#;

    let doc = parse_with_extension(json, "json").unwrap();
    let widget = &doc.assemblies[0].namespaces[0].types[0];
    assert_eq!(widget.kind, TypeKind::Struct);
    assert_eq!(widget.methods, Some(Vec::new()));
    assert!(widget.fields.is_none());

    let yaml = "assemblies:\n  - name: Lib\n    namespaces:\n      - name: Demo\n        types:\n          - name: Widget\n";
    let doc = parse_with_extension(yaml, "yaml").unwrap();
    assert_eq!(doc.assemblies[0].namespaces[0].types[0].kind, TypeKind::Class);

    let toml = r#"
[[assemblies]]
name = "Lib"
version = "1.0.0.0"

[[assemblies.namespaces]]
name = "Demo"

[[assemblies.namespaces.types]]
name = "Widget"
kind = "struct"
interfaces = ["System.IDisposable"]
"#;
    let doc = parse_with_extension(toml, "toml").unwrap();
    assert_eq!(doc.assemblies[0].version.as_deref(), Some("1.0.0.0"));
    let widget = &doc.assemblies[0].namespaces[0].types[0];
    assert_eq!(widget.name, "Widget");
    assert_eq!(widget.kind, TypeKind::Struct);
    assert_eq!(widget.interfaces, vec!["System.IDisposable"]);
}

#[test]
fn test_missing_names_are_fatal_in_serde_formats() {
    let unnamed_type = r#"{"assemblies": [{"name": "Lib", "namespaces": [
        {"name": "Demo", "types": [{"kind": "class"}]}]}]}"#;
    let result = parse_with_extension(unnamed_type, "json");
    assert!(matches!(result, Err(LoadError::JsonError { .. })), "{:?}", result);

    let unnamed_member = r#"{"assemblies": [{"name": "Lib", "namespaces": [{"name": "Demo",
        "types": [{"name": "Widget", "methods": [{"type": "System.Void"}]}]}]}]}"#;
    let result = parse_with_extension(unnamed_member, "json");
    assert!(matches!(result, Err(LoadError::JsonError { .. })), "{:?}", result);

    let unnamed_namespace = "assemblies:\n  - name: Lib\n    namespaces:\n      - types: []\n";
    let result = parse_with_extension(unnamed_namespace, "yml");
    assert!(matches!(result, Err(LoadError::YamlError { .. })), "{:?}", result);

    let unnamed_assembly = "[[assemblies]]\nversion = \"1.0\"\n";
    let result = parse_with_extension(unnamed_assembly, "toml");
    assert!(matches!(result, Err(LoadError::TomlError { .. })), "{:?}", result);
}

#[test]
fn test_extensionless_file_is_sniffed() {
    let json = r#"{"assemblies": [{"name": "Lib", "namespaces": []}]}"#;
    let doc = parse_sniffed(json).unwrap();
    assert_eq!(doc.assemblies[0].name, "Lib");

    let yaml = "assemblies:\n  - name: Lib\n";
    let doc = parse_sniffed(yaml).unwrap();
    assert_eq!(doc.assemblies[0].name, "Lib");
}

#[test]
fn test_unrecognized_extensionless_file() {
    let result = parse_sniffed("release notes for the next version");
    assert!(matches!(result, Err(LoadError::UnknownFormat { .. })), "{:?}", result);
}

#[test]
fn test_missing_return_type_is_fatal() {
    let xml = r#"<assemblies><assembly name="Lib"><namespaces><namespace name="Demo"><classes>
        <class name="Widget"><methods><method name="Run" /></methods></class>
        </classes></namespace></namespaces></assembly></assemblies>"#;
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(xml.as_bytes()).unwrap();

    match parse_file(temp.path()) {
        Err(LoadError::MissingAttribute {
            element,
            attribute,
            context,
        }) => {
            assert_eq!(element, "method");
            assert_eq!(attribute, "returntype");
            assert_eq!(context, "method Run of type Demo.Widget");
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_file_not_found() {
    let result = parse_file(Path::new("tests/fixtures/missing.xml"));
    assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
}
