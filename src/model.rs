//! In-memory representation of a serialized API surface.
//!
//! A document is a read-only tree: assemblies own namespaces, namespaces own
//! type declarations, and types own their members and nested types. Two
//! documents (source and target) are compared but never merged.

use serde::Deserialize;

/// Fully qualified name of the implicit default base class.
pub const SYSTEM_OBJECT: &str = "System.Object";

/// Joins a namespace or declaring type with a simple name.
///
/// An empty prefix yields the name unchanged, which covers types in the
/// global namespace.
pub fn qualify(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Returns the last dotted segment of a type name.
pub fn short_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl TypeKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Delegate => "delegate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "class" => Some(TypeKind::Class),
            "struct" => Some(TypeKind::Struct),
            "interface" => Some(TypeKind::Interface),
            "enum" => Some(TypeKind::Enum),
            "delegate" => Some(TypeKind::Delegate),
            _ => None,
        }
    }
}

/// Accessibility of a type or member, ordered from most to least visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Internal,
    Private,
}

impl Visibility {
    pub fn keyword(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            "internal" => Some(Visibility::Internal),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Visibility::Public => 3,
            Visibility::Protected => 2,
            Visibility::Internal => 1,
            Visibility::Private => 0,
        }
    }

    /// True if moving from `self` to `other` hides the member from some callers.
    pub fn is_narrowed_to(&self, other: Visibility) -> bool {
        other.rank() < self.rank()
    }
}

/// Member modifiers that take part in compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    #[serde(rename = "static")]
    pub is_static: bool,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    #[serde(rename = "override")]
    pub is_override: bool,
    #[serde(rename = "sealed")]
    pub is_sealed: bool,
    #[serde(rename = "readonly")]
    pub is_readonly: bool,
    #[serde(rename = "const")]
    pub is_const: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterDirection {
    #[default]
    In,
    Ref,
    Out,
    Params,
}

impl ParameterDirection {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            ParameterDirection::In => None,
            ParameterDirection::Ref => Some("ref"),
            ParameterDirection::Out => Some("out"),
            ParameterDirection::Params => Some("params"),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "" | "in" => Some(ParameterDirection::In),
            "ref" => Some(ParameterDirection::Ref),
            "out" => Some(ParameterDirection::Out),
            "params" => Some(ParameterDirection::Params),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub direction: ParameterDirection,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            direction: ParameterDirection::In,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttributeProperty {
    pub name: String,
    pub value: String,
}

/// A custom attribute applied to a type or member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomAttribute {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<AttributeProperty>,
}

/// The obsolete marker carried by `System.ObsoleteAttribute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obsolete {
    pub message: Option<String>,
    pub is_error: bool,
}

impl CustomAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push(AttributeProperty {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Name without namespace and without the `Attribute` suffix.
    pub fn display_name(&self) -> &str {
        let name = short_name(&self.name);
        name.strip_suffix("Attribute")
            .filter(|s| !s.is_empty())
            .unwrap_or(name)
    }

    pub fn as_obsolete(&self) -> Option<Obsolete> {
        if short_name(&self.name) != "ObsoleteAttribute" {
            return None;
        }
        Some(Obsolete {
            message: self.property("Message").map(str::to_string),
            is_error: self
                .property("IsError")
                .is_some_and(|v| v.eq_ignore_ascii_case("true")),
        })
    }
}

/// The member kinds, in the order a type's members are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Constructor,
    Field,
    Property,
    Event,
    Method,
}

impl MemberKind {
    pub const ALL: [MemberKind; 5] = [
        MemberKind::Constructor,
        MemberKind::Field,
        MemberKind::Property,
        MemberKind::Event,
        MemberKind::Method,
    ];

    pub fn singular(&self) -> &'static str {
        match self {
            MemberKind::Constructor => "constructor",
            MemberKind::Field => "field",
            MemberKind::Property => "property",
            MemberKind::Event => "event",
            MemberKind::Method => "method",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            MemberKind::Constructor => "constructors",
            MemberKind::Field => "fields",
            MemberKind::Property => "properties",
            MemberKind::Event => "events",
            MemberKind::Method => "methods",
        }
    }

    /// Label for a group of `count` members, e.g. "method" or "methods".
    pub fn label(&self, count: usize) -> &'static str {
        if count == 1 {
            self.singular()
        } else {
            self.plural()
        }
    }
}

/// A constructor, field, property, event or method.
///
/// `member_type` holds the field, property or event type, or the method
/// return type. Constructors leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct MemberDeclaration {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default, rename = "type")]
    pub member_type: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub has_getter: bool,
    #[serde(default)]
    pub has_setter: bool,
    #[serde(default)]
    pub attributes: Vec<CustomAttribute>,
}

impl MemberDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, member_type: impl Into<String>) -> Self {
        self.member_type = Some(member_type.into());
        self
    }

    pub fn with_parameter(mut self, name: &str, param_type: &str) -> Self {
        self.parameters.push(Parameter::new(name, param_type));
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_attribute(mut self, attribute: CustomAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn parameter_types(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.param_type.as_str())
    }
}

/// A class, struct, interface, enum or delegate declaration.
///
/// Member collections are `None` when the element was absent from the source
/// document and `Some(vec![])` when it was present but empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub is_sealed: bool,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_serializable: bool,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<CustomAttribute>,
    #[serde(default)]
    pub constructors: Option<Vec<MemberDeclaration>>,
    #[serde(default)]
    pub fields: Option<Vec<MemberDeclaration>>,
    #[serde(default)]
    pub properties: Option<Vec<MemberDeclaration>>,
    #[serde(default)]
    pub events: Option<Vec<MemberDeclaration>>,
    #[serde(default)]
    pub methods: Option<Vec<MemberDeclaration>>,
    #[serde(default)]
    pub nested: Vec<TypeDeclaration>,
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn members(&self, kind: MemberKind) -> &[MemberDeclaration] {
        let members = match kind {
            MemberKind::Constructor => &self.constructors,
            MemberKind::Field => &self.fields,
            MemberKind::Property => &self.properties,
            MemberKind::Event => &self.events,
            MemberKind::Method => &self.methods,
        };
        members.as_deref().unwrap_or(&[])
    }

    pub fn members_mut(&mut self, kind: MemberKind) -> &mut Vec<MemberDeclaration> {
        let members = match kind {
            MemberKind::Constructor => &mut self.constructors,
            MemberKind::Field => &mut self.fields,
            MemberKind::Property => &mut self.properties,
            MemberKind::Event => &mut self.events,
            MemberKind::Method => &mut self.methods,
        };
        members.get_or_insert_with(Vec::new)
    }

    pub fn with_member(mut self, kind: MemberKind, member: MemberDeclaration) -> Self {
        self.members_mut(kind).push(member);
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_type = Some(base.into());
        self
    }

    /// The declared base type, with the implicit `System.Object` filtered out.
    pub fn explicit_base(&self) -> Option<&str> {
        self.base_type
            .as_deref()
            .filter(|b| !b.is_empty() && *b != SYSTEM_OBJECT && *b != "object")
    }

    pub fn find_nested(&self, name: &str) -> Option<&TypeDeclaration> {
        self.nested.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Namespace {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
}

impl Namespace {
    pub fn find_type(&self, name: &str) -> Option<&TypeDeclaration> {
        self.types.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Assembly {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub attributes: Vec<CustomAttribute>,
    #[serde(default)]
    pub namespaces: Vec<Namespace>,
}

impl Assembly {
    pub fn find_namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|n| n.name == name)
    }
}

/// A complete serialized API surface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ApiDocument {
    pub assemblies: Vec<Assembly>,
}

impl ApiDocument {
    pub fn find_assembly(&self, name: &str) -> Option<&Assembly> {
        self.assemblies.iter().find(|a| a.name == name)
    }

    /// Builds a single-assembly document; convenient for tests and tooling.
    pub fn single(assembly: impl Into<String>, namespaces: Vec<Namespace>) -> Self {
        Self {
            assemblies: vec![Assembly {
                name: assembly.into(),
                version: None,
                attributes: Vec::new(),
                namespaces,
            }],
        }
    }
}
