//! Synthetic C# declarations for types and members.
//!
//! Members are rendered slot by slot (visibility, modifiers, type, name,
//! parameters, accessors, constant value) against a second version of the
//! same member, so one routine yields both the plain declaration (a member
//! compared with itself) and the paired diff with every fragment classified
//! as breaking or not.

use crate::attributes::{diff_attributes, render_attribute};
use crate::change::ApiChange;
use crate::model::{
    short_name, MemberDeclaration, MemberKind, Parameter, TypeDeclaration, TypeKind, Visibility,
};

/// Maps framework type names to C# keywords, keeping array and by-ref
/// suffixes in mind.
pub fn format_type(name: &str) -> String {
    let name = name.trim_end_matches('&');
    if let Some(element) = name.strip_suffix("[]") {
        return format!("{}[]", format_type(element));
    }

    let keyword = match name {
        "System.Void" => "void",
        "System.Object" => "object",
        "System.String" => "string",
        "System.Boolean" => "bool",
        "System.Char" => "char",
        "System.Byte" => "byte",
        "System.SByte" => "sbyte",
        "System.Int16" => "short",
        "System.UInt16" => "ushort",
        "System.Int32" => "int",
        "System.UInt32" => "uint",
        "System.Int64" => "long",
        "System.UInt64" => "ulong",
        "System.Single" => "float",
        "System.Double" => "double",
        "System.Decimal" => "decimal",
        other => other,
    };
    keyword.to_string()
}

/// Visibility narrowing is breaking, widening is not.
fn visibility_slot(change: &mut ApiChange, source: Visibility, target: Visibility) {
    change.modified(
        source.keyword(),
        target.keyword(),
        source.is_narrowed_to(target),
    );
    change.append(" ");
}

/// One optional keyword. Each side's breaking flag applies when the keyword
/// appears (`on_add`) or disappears (`on_remove`).
fn keyword_slot(
    change: &mut ApiChange,
    keyword: &str,
    source: bool,
    target: bool,
    on_add: bool,
    on_remove: bool,
) {
    let text = format!("{} ", keyword);
    match (source, target) {
        (true, true) => {
            change.append(text);
        }
        (true, false) => {
            change.removed(text, on_remove);
        }
        (false, true) => {
            change.added(text, on_add);
        }
        (false, false) => {}
    }
}

fn parameter_slot(change: &mut ApiChange, source: &Parameter, target: &Parameter) {
    let direction = |p: &Parameter| {
        p.direction
            .keyword()
            .map(|k| format!("{} ", k))
            .unwrap_or_default()
    };
    let involves_params = [source, target]
        .iter()
        .any(|p| p.direction.keyword() == Some("params"));
    change.modified(direction(source), direction(target), !involves_params);
    change.append(format_type(&target.param_type));
    change.append(" ");
    change.modified(source.name.as_str(), target.name.as_str(), false);
}

fn parameters_slot(
    change: &mut ApiChange,
    source: &[Parameter],
    target: &[Parameter],
    open: &str,
    close: &str,
) {
    change.append(open);
    for (i, (s, t)) in source.iter().zip(target).enumerate() {
        if i > 0 {
            change.append(", ");
        }
        parameter_slot(change, s, t);
    }
    change.append(close);
}

/// Renders `target` against `source`. Both must share the same identity;
/// anything outside the identity shows up as modified fragments.
pub fn member_change(
    kind: MemberKind,
    source: &MemberDeclaration,
    target: &MemberDeclaration,
    declaring: &TypeDeclaration,
) -> ApiChange {
    let mut change = ApiChange::new(target.name.as_str());
    diff_attributes(&mut change, &source.attributes, &target.attributes);
    change.new_line();

    if declaring.kind == TypeKind::Enum && kind == MemberKind::Field {
        change.append(target.name.as_str());
        if source.value.is_some() || target.value.is_some() {
            change.append(" = ");
            change.modified(
                source.value.clone().unwrap_or_default(),
                target.value.clone().unwrap_or_default(),
                true,
            );
        }
        return change;
    }

    visibility_slot(&mut change, source.visibility, target.visibility);

    let (s, t) = (&source.modifiers, &target.modifiers);
    keyword_slot(
        &mut change,
        "static",
        s.is_static && !s.is_const,
        t.is_static && !t.is_const,
        true,
        true,
    );
    keyword_slot(&mut change, "const", s.is_const, t.is_const, true, true);
    keyword_slot(&mut change, "abstract", s.is_abstract, t.is_abstract, true, false);
    keyword_slot(
        &mut change,
        "virtual",
        s.is_virtual && !s.is_override,
        t.is_virtual && !t.is_override,
        false,
        !t.is_override,
    );
    keyword_slot(&mut change, "sealed", s.is_sealed, t.is_sealed, true, false);
    keyword_slot(&mut change, "override", s.is_override, t.is_override, false, false);
    keyword_slot(&mut change, "readonly", s.is_readonly, t.is_readonly, true, false);

    if kind == MemberKind::Event {
        change.append("event ");
    }

    if kind != MemberKind::Constructor {
        change.modified(
            source.member_type.as_deref().map(format_type).unwrap_or_default(),
            target.member_type.as_deref().map(format_type).unwrap_or_default(),
            true,
        );
        change.append(" ");
    }

    match kind {
        MemberKind::Constructor => {
            change.append(short_name(&declaring.name));
        }
        MemberKind::Property if !target.parameters.is_empty() => {
            change.append("this");
        }
        _ => {
            change.append(target.name.as_str());
        }
    }

    if !target.generic_parameters.is_empty() {
        change.append("<");
        change.modified(
            source.generic_parameters.join(", "),
            target.generic_parameters.join(", "),
            false,
        );
        change.append(">");
    }

    match kind {
        MemberKind::Constructor | MemberKind::Method => {
            parameters_slot(&mut change, &source.parameters, &target.parameters, "(", ")");
        }
        MemberKind::Property => {
            if !target.parameters.is_empty() {
                parameters_slot(&mut change, &source.parameters, &target.parameters, "[", "]");
            }
            change.append(" { ");
            keyword_slot(&mut change, "get;", source.has_getter, target.has_getter, false, true);
            keyword_slot(&mut change, "set;", source.has_setter, target.has_setter, false, true);
            change.append("}");
        }
        MemberKind::Field if s.is_const || t.is_const => {
            change.append(" = ");
            change.modified(
                source.value.clone().unwrap_or_default(),
                target.value.clone().unwrap_or_default(),
                true,
            );
        }
        _ => {}
    }

    change
}

/// The plain declaration of a member, attribute lines included.
pub fn member_declaration(
    kind: MemberKind,
    member: &MemberDeclaration,
    declaring: &TypeDeclaration,
) -> String {
    member_change(kind, member, member, declaring).after()
}

/// Static, abstract and sealed only apply to classes; a static class is
/// never reported as abstract or sealed.
fn class_flags(declaration: &TypeDeclaration) -> (bool, bool, bool) {
    match declaration.kind {
        TypeKind::Class if declaration.is_static => (true, false, false),
        TypeKind::Class => (false, declaration.is_abstract, declaration.is_sealed),
        _ => (false, false, false),
    }
}

/// Diff of a type's own modifiers and kind, e.g. `public class` becoming
/// `public sealed class`.
pub fn type_modifiers_change(source: &TypeDeclaration, target: &TypeDeclaration) -> ApiChange {
    let mut change = ApiChange::new("declaration");

    if source.is_serializable || target.is_serializable {
        change.new_line();
        keyword_slot(
            &mut change,
            "[Serializable]",
            source.is_serializable,
            target.is_serializable,
            false,
            true,
        );
    }

    change.new_line();
    visibility_slot(&mut change, source.visibility, target.visibility);
    let (s_static, s_abstract, s_sealed) = class_flags(source);
    let (t_static, t_abstract, t_sealed) = class_flags(target);
    keyword_slot(&mut change, "static", s_static, t_static, true, true);
    keyword_slot(&mut change, "abstract", s_abstract, t_abstract, true, false);
    keyword_slot(&mut change, "sealed", s_sealed, t_sealed, true, false);
    change.modified(source.kind.keyword(), target.kind.keyword(), true);
    change.append(" ");
    change.append(target.name.as_str());
    change
}

/// `public sealed class Name : Base, IFoo` without attributes. The implicit
/// `System.Object` base is never rendered.
pub fn type_header(declaration: &TypeDeclaration) -> String {
    let mut header = String::new();
    let (is_static, is_abstract, is_sealed) = class_flags(declaration);

    header.push_str(declaration.visibility.keyword());
    header.push(' ');
    for (flag, keyword) in [
        (is_static, "static "),
        (is_abstract, "abstract "),
        (is_sealed, "sealed "),
    ] {
        if flag {
            header.push_str(keyword);
        }
    }
    header.push_str(declaration.kind.keyword());
    header.push(' ');
    header.push_str(&declaration.name);

    let bases: Vec<String> = declaration
        .explicit_base()
        .into_iter()
        .filter(|_| declaration.kind == TypeKind::Class)
        .chain(declaration.interfaces.iter().map(String::as_str))
        .map(format_type)
        .collect();
    if !bases.is_empty() {
        header.push_str(" : ");
        header.push_str(&bases.join(", "));
    }
    header
}

/// Full synthetic declaration of a type: attributes, header, every member
/// grouped by kind, and nested types.
pub fn type_declaration(declaration: &TypeDeclaration) -> String {
    let mut out = String::new();
    write_type(&mut out, declaration, "");
    out.truncate(out.trim_end().len());
    out
}

fn write_type(out: &mut String, declaration: &TypeDeclaration, indent: &str) {
    if declaration.is_serializable {
        out.push_str(&format!("{}[Serializable]\n", indent));
    }
    for attribute in &declaration.attributes {
        out.push_str(&format!("{}{}\n", indent, render_attribute(attribute)));
    }
    out.push_str(&format!("{}{} {{\n", indent, type_header(declaration)));

    let inner = format!("{}\t", indent);
    let mut first = true;
    for kind in MemberKind::ALL {
        let members = declaration.members(kind);
        if members.is_empty() {
            continue;
        }
        if !first {
            out.push('\n');
        }
        first = false;
        out.push_str(&format!("{}// {}\n", inner, kind.plural()));
        let separator = if declaration.kind == TypeKind::Enum && kind == MemberKind::Field {
            ","
        } else {
            ""
        };
        for member in members {
            for line in member_declaration(kind, member, declaration).lines() {
                let suffix = if line.starts_with('[') { "" } else { separator };
                out.push_str(&format!("{}{}{}\n", inner, line, suffix));
            }
        }
    }

    for nested in &declaration.nested {
        if !first {
            out.push('\n');
        }
        first = false;
        write_type(out, nested, &inner);
    }

    out.push_str(&format!("{}}}\n", indent));
}
