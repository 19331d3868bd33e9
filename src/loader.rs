//! Loading of serialized API documents.
//!
//! The primary input is the XML shape produced by API extraction tools
//! (`assemblies → assembly → namespaces → namespace → classes → class`).
//! JSON, YAML and TOML documents using the serde shape of [`ApiDocument`] are
//! accepted as well. The format is detected by file extension, and by
//! sniffing the content when the extension is unknown.
//!
//! # Examples
//!
//! ```no_run
//! use apidiff::loader::parse_file;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let old = parse_file(Path::new("Lib-1.0.xml"))?;
//! let new = parse_file(Path::new("Lib-2.0.xml"))?;
//! # Ok(())
//! # }
//! ```

use crate::error::LoadError;
use crate::model::{
    qualify, ApiDocument, Assembly, AttributeProperty, CustomAttribute, MemberDeclaration,
    MemberKind, Modifiers, Namespace, Parameter, ParameterDirection, TypeDeclaration, TypeKind,
    Visibility,
};
use roxmltree::Node;
use std::fs;
use std::path::Path;

/// Document format, usually derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Xml,
    Json,
    Yaml,
    Toml,
    /// Sniff the content: XML if it starts with `<`, otherwise JSON then YAML.
    Auto,
}

impl FormatHint {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("xml") => FormatHint::Xml,
            Some("json") => FormatHint::Json,
            Some("yaml") | Some("yml") => FormatHint::Yaml,
            Some("toml") => FormatHint::Toml,
            _ => FormatHint::Auto,
        }
    }
}

/// Loads an API document from a file.
///
/// # Errors
///
/// - `LoadError::FileNotFound` if the file does not exist
/// - `LoadError::ReadError` if it cannot be read
/// - a format-specific error if the content is malformed, or
///   `MissingElement`/`MissingAttribute` naming the offending namespace or type
/// - `LoadError::UnknownFormat` if no format could be detected
pub fn parse_file(path: &Path) -> Result<ApiDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::file_not_found(
            path.to_string_lossy().to_string(),
        ));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| LoadError::read_error(path.to_string_lossy().to_string(), e))?;

    tracing::debug!(path = %path.display(), "loading API document");
    parse_content(
        &content,
        FormatHint::from_path(path),
        &path.to_string_lossy(),
    )
}

/// Loads an API document from an in-memory string.
///
/// `origin` names the source of the content in error messages.
pub fn parse_content(
    content: &str,
    hint: FormatHint,
    origin: &str,
) -> Result<ApiDocument, LoadError> {
    match hint {
        FormatHint::Xml => load_xml(content, origin),
        FormatHint::Json => parse_json(content).map_err(|e| LoadError::json_error(origin, e)),
        FormatHint::Yaml => parse_yaml(content).map_err(|e| LoadError::yaml_error(origin, e)),
        FormatHint::Toml => parse_toml(content).map_err(|e| LoadError::toml_error(origin, e)),
        FormatHint::Auto => {
            if content.trim_start().starts_with('<') {
                return load_xml(content, origin);
            }
            parse_json(content)
                .map_err(|_| ())
                .or_else(|_| parse_yaml(content).map_err(|_| ()))
                .map_err(|_| LoadError::unknown_format(origin))
        }
    }
}

/// Parses the XML document shape.
pub fn parse_xml(content: &str) -> Result<ApiDocument, LoadError> {
    load_xml(content, "<input>")
}

pub fn parse_json(content: &str) -> Result<ApiDocument, serde_json::Error> {
    serde_json::from_str(content)
}

pub fn parse_yaml(content: &str) -> Result<ApiDocument, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

pub fn parse_toml(content: &str) -> Result<ApiDocument, toml::de::Error> {
    toml::from_str(content)
}

fn load_xml(content: &str, origin: &str) -> Result<ApiDocument, LoadError> {
    let xml = roxmltree::Document::parse(content).map_err(|e| LoadError::xml_error(origin, e))?;
    let root = xml.root_element();
    if !root.has_tag_name("assemblies") {
        return Err(LoadError::missing_element("assemblies", origin));
    }

    let assemblies = elements(root, "assembly")
        .map(|node| read_assembly(node, origin))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ApiDocument { assemblies })
}

fn read_assembly(node: Node, origin: &str) -> Result<Assembly, LoadError> {
    let name = required(node, "name", origin)?;
    let context = format!("assembly {}", name);

    let namespaces = match child(node, "namespaces") {
        Some(list) => elements(list, "namespace")
            .map(|ns| read_namespace(ns, &context))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(Assembly {
        name: name.to_string(),
        version: node.attribute("version").map(str::to_string),
        attributes: read_attributes(node, &context)?,
        namespaces,
    })
}

fn read_namespace(node: Node, context: &str) -> Result<Namespace, LoadError> {
    let name = required(node, "name", context)?;
    let types = match child(node, "classes") {
        Some(list) => elements(list, "class")
            .map(|class| read_type(class, name, &format!("namespace {}", name)))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(Namespace {
        name: name.to_string(),
        types,
    })
}

/// Reads a `<class>` element. `parent` is the namespace or the qualified
/// name of the declaring type, used to name the type in error messages.
fn read_type(node: Node, parent: &str, context: &str) -> Result<TypeDeclaration, LoadError> {
    let name = required(node, "name", context)?;
    let qualified = qualify(parent, name);
    let context = format!("type {}", qualified);

    let kind = match node.attribute("type") {
        Some(value) => TypeKind::parse(value).ok_or_else(|| invalid("type", value, &context))?,
        None => TypeKind::Class,
    };

    let interfaces = match child(node, "interfaces") {
        Some(list) => elements(list, "interface")
            .map(|i| required(i, "name", &context).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let nested = match child(node, "classes") {
        Some(list) => elements(list, "class")
            .map(|class| read_type(class, &qualified, &context))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(TypeDeclaration {
        name: name.to_string(),
        kind,
        visibility: read_visibility(node, &context)?,
        base_type: node.attribute("base").map(str::to_string),
        is_sealed: flag(node, "sealed"),
        is_abstract: flag(node, "abstract"),
        is_static: flag(node, "static"),
        is_serializable: flag(node, "serializable"),
        interfaces,
        attributes: read_attributes(node, &context)?,
        constructors: read_members(node, MemberKind::Constructor, &context)?,
        fields: read_members(node, MemberKind::Field, &context)?,
        properties: read_members(node, MemberKind::Property, &context)?,
        events: read_members(node, MemberKind::Event, &context)?,
        methods: read_members(node, MemberKind::Method, &context)?,
        nested,
    })
}

/// Reads one member collection. Absence of the collection element yields
/// `None`, which is distinct from an empty collection.
fn read_members(
    node: Node,
    kind: MemberKind,
    context: &str,
) -> Result<Option<Vec<MemberDeclaration>>, LoadError> {
    let Some(list) = child(node, kind.plural()) else {
        return Ok(None);
    };

    elements(list, kind.singular())
        .map(|member| read_member(member, kind, context))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn read_member(
    node: Node,
    kind: MemberKind,
    context: &str,
) -> Result<MemberDeclaration, LoadError> {
    let name = required(node, "name", context)?;
    let member_context = format!("{} {} of {}", kind.singular(), name, context);

    let type_attribute = match kind {
        MemberKind::Constructor => None,
        MemberKind::Field => Some("fieldtype"),
        MemberKind::Property => Some("ptype"),
        MemberKind::Event => Some("eventtype"),
        MemberKind::Method => Some("returntype"),
    };
    let member_type = match type_attribute {
        Some(attr) => Some(required(node, attr, &member_context)?.to_string()),
        None => None,
    };

    let parameters = match child(node, "parameters") {
        Some(list) => elements(list, "parameter")
            .map(|p| read_parameter(p, &member_context))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let generic_parameters = match child(node, "generic-parameters") {
        Some(list) => elements(list, "generic-parameter")
            .map(|g| required(g, "name", &member_context).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let (has_getter, has_setter) = match (kind, child(node, "methods")) {
        (MemberKind::Property, Some(accessors)) => {
            let names: Vec<&str> = elements(accessors, "method")
                .filter_map(|m| m.attribute("name"))
                .collect();
            (
                names.iter().any(|n| n.starts_with("get_")),
                names.iter().any(|n| n.starts_with("set_")),
            )
        }
        (MemberKind::Property, None) => (flag(node, "get"), flag(node, "set")),
        _ => (false, false),
    };

    Ok(MemberDeclaration {
        name: name.to_string(),
        visibility: read_visibility(node, &member_context)?,
        modifiers: Modifiers {
            is_static: flag(node, "static"),
            is_abstract: flag(node, "abstract"),
            is_virtual: flag(node, "virtual"),
            is_override: flag(node, "override"),
            is_sealed: flag(node, "sealed"),
            is_readonly: flag(node, "readonly"),
            is_const: flag(node, "literal") || flag(node, "const"),
        },
        member_type,
        parameters,
        generic_parameters,
        value: node.attribute("value").map(str::to_string),
        has_getter,
        has_setter,
        attributes: read_attributes(node, &member_context)?,
    })
}

fn read_parameter(node: Node, context: &str) -> Result<Parameter, LoadError> {
    let direction = match node.attribute("direction") {
        Some(value) => ParameterDirection::parse(value)
            .ok_or_else(|| invalid("direction", value, context))?,
        None => ParameterDirection::In,
    };

    Ok(Parameter {
        name: required(node, "name", context)?.to_string(),
        param_type: required(node, "type", context)?.to_string(),
        direction,
    })
}

fn read_attributes(node: Node, context: &str) -> Result<Vec<CustomAttribute>, LoadError> {
    let Some(list) = child(node, "attributes") else {
        return Ok(Vec::new());
    };

    elements(list, "attribute")
        .map(|attr| -> Result<CustomAttribute, LoadError> {
            let properties = match child(attr, "properties") {
                Some(props) => elements(props, "property")
                    .map(|p| -> Result<AttributeProperty, LoadError> {
                        Ok(AttributeProperty {
                            name: required(p, "name", context)?.to_string(),
                            value: p.attribute("value").unwrap_or_default().to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            Ok(CustomAttribute {
                name: required(attr, "name", context)?.to_string(),
                properties,
            })
        })
        .collect()
}

fn read_visibility(node: Node, context: &str) -> Result<Visibility, LoadError> {
    match node.attribute("visibility") {
        Some(value) => {
            Visibility::parse(value).ok_or_else(|| invalid("visibility", value, context))
        }
        None => Ok(Visibility::Public),
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(tag))
}

fn elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| c.has_tag_name(tag))
}

fn required<'a>(node: Node<'a, '_>, attribute: &str, context: &str) -> Result<&'a str, LoadError> {
    node.attribute(attribute)
        .ok_or_else(|| LoadError::missing_attribute(node.tag_name().name(), attribute, context))
}

fn flag(node: Node, attribute: &str) -> bool {
    node.attribute(attribute)
        .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

fn invalid(attribute: &str, value: &str, context: &str) -> LoadError {
    LoadError::InvalidValue {
        attribute: attribute.to_string(),
        value: value.to_string(),
        context: context.to_string(),
    }
}
