//! Type-level comparison: attributes, declaration, base type, interfaces,
//! member groups and nested types.
//!
//! Nested types are compared after their declaring type's own section is
//! closed, as sibling sections named `Namespace.Outer.Inner`.

use crate::attributes::attribute_change;
use crate::change::ApiChange;
use crate::context::ComparisonContext;
use crate::error::ApiDiffError;
use crate::event::{ReportEvent, TypeAspect};
use crate::members::{compare_members, diff_collection, is_reported};
use crate::model::{MemberKind, TypeDeclaration};
use crate::render::{format_type, type_declaration, type_modifiers_change};

/// Compares two ordered type collections that share a scope (a namespace
/// or a declaring type): removals first, then paired types, then additions.
pub fn compare_types(
    ctx: &mut ComparisonContext<'_, '_>,
    source: &[TypeDeclaration],
    target: &[TypeDeclaration],
) -> Result<(), ApiDiffError> {
    let diff = diff_collection(source, target, |t| t.name.as_str());
    if diff.ambiguous > 0 {
        tracing::warn!(
            scope = %ctx.location(),
            count = diff.ambiguous,
            "duplicate type names, pairing in declaration order"
        );
    }

    for declaration in diff.removed {
        removed_type(ctx, declaration);
    }
    for (s, t) in diff.paired {
        compare_type(ctx, s, t)?;
    }
    for declaration in diff.added {
        added_type(ctx, declaration);
    }
    Ok(())
}

/// Compares a type present in both versions.
pub fn compare_type(
    ctx: &mut ComparisonContext<'_, '_>,
    source: &TypeDeclaration,
    target: &TypeDeclaration,
) -> Result<(), ApiDiffError> {
    let name = ctx.enter_type(&target.name);
    tracing::debug!(type_name = %name, "comparing type");
    let ignore_nonbreaking = ctx.config().ignore_nonbreaking;

    ctx.emit(ReportEvent::BeginTypeModification { name });

    if let Some(change) = attribute_change("attributes", &source.attributes, &target.attributes) {
        if is_reported(&change, ignore_nonbreaking) {
            ctx.emit(ReportEvent::AttributesModified { change });
        }
    }

    let change = type_modifiers_change(source, target);
    if is_reported(&change, ignore_nonbreaking) {
        ctx.emit(ReportEvent::TypeModified {
            aspect: TypeAspect::Declaration,
            change,
        });
    }

    if let Some(change) = base_type_change(ctx, source, target)? {
        ctx.emit(ReportEvent::TypeModified {
            aspect: TypeAspect::BaseType,
            change,
        });
    }

    let change = interfaces_change(source, target);
    if is_reported(&change, ignore_nonbreaking) {
        ctx.emit(ReportEvent::TypeModified {
            aspect: TypeAspect::Interfaces,
            change,
        });
    }

    for kind in MemberKind::ALL {
        compare_members(ctx, kind, source, target);
    }

    ctx.emit(ReportEvent::EndTypeModification);

    let result = compare_types(ctx, &source.nested, &target.nested);
    ctx.leave_type();
    result
}

/// Base type diff. `System.Object` is never rendered; a base change that
/// only inserts types into the chain is reported as non-breaking, and
/// dropped entirely when non-breaking changes are ignored.
fn base_type_change(
    ctx: &ComparisonContext<'_, '_>,
    source: &TypeDeclaration,
    target: &TypeDeclaration,
) -> Result<Option<ApiChange>, ApiDiffError> {
    let (source_base, target_base) = (source.explicit_base(), target.explicit_base());
    if source_base == target_base {
        return Ok(None);
    }

    let compatible = ctx
        .hierarchy()?
        .is_compatible_restructuring(source_base, target_base);
    if compatible && ctx.config().ignore_nonbreaking {
        tracing::trace!(
            type_name = ctx.current_type().unwrap_or_default(),
            "compatible base type change ignored"
        );
        return Ok(None);
    }

    let mut change = ApiChange::new("base type");
    change.modified(
        source_base.map(format_type).unwrap_or_default(),
        target_base.map(format_type).unwrap_or_default(),
        !compatible,
    );
    Ok(Some(change))
}

/// One line per interface: kept ones as text, removed ones breaking,
/// added ones not.
fn interfaces_change(source: &TypeDeclaration, target: &TypeDeclaration) -> ApiChange {
    let mut change = ApiChange::new("interfaces");
    for interface in &source.interfaces {
        change.new_line();
        let text = format_type(interface);
        if target.interfaces.contains(interface) {
            change.append(text);
        } else {
            change.removed(text, true);
        }
    }
    for interface in &target.interfaces {
        if !source.interfaces.contains(interface) {
            change.new_line().added(format_type(interface), false);
        }
    }
    change
}

/// Reports a type present only in the target with its full declaration.
pub fn added_type(ctx: &mut ComparisonContext<'_, '_>, declaration: &TypeDeclaration) {
    let name = ctx.qualify(&declaration.name);
    let config = ctx.config();
    if config.ignore_nonbreaking {
        return;
    }
    if config.is_new_ignored(&[name.as_str()]) {
        tracing::trace!(type_name = %name, "new type ignored by pattern");
        return;
    }
    ctx.emit(ReportEvent::TypeAdded {
        name,
        declaration: type_declaration(declaration),
    });
}

/// Reports a type present only in the source. Its members are not listed.
pub fn removed_type(ctx: &mut ComparisonContext<'_, '_>, declaration: &TypeDeclaration) {
    let name = ctx.qualify(&declaration.name);
    if ctx.config().is_removed_ignored(&[name.as_str()]) {
        tracing::trace!(type_name = %name, "removed type ignored by pattern");
        return;
    }
    ctx.emit(ReportEvent::TypeRemoved {
        name,
        breaking: true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompareConfig;
    use crate::event::ChangeKind;
    use crate::model::{
        ApiDocument, CustomAttribute, MemberDeclaration, Namespace, TypeKind, SYSTEM_OBJECT,
    };
    use crate::output::{EventLog, Formatter};

    fn class(name: &str) -> TypeDeclaration {
        TypeDeclaration::new(name, TypeKind::Class).with_base(SYSTEM_OBJECT)
    }

    fn document(types: Vec<TypeDeclaration>) -> ApiDocument {
        ApiDocument::single(
            "Lib",
            vec![Namespace {
                name: "UIKit".to_string(),
                types,
            }],
        )
    }

    fn run(
        config: &CompareConfig,
        target_doc: &ApiDocument,
        source: &[TypeDeclaration],
        target: &[TypeDeclaration],
    ) -> Vec<ReportEvent> {
        let mut log = EventLog::new();
        {
            let mut formatters: [&mut dyn Formatter; 1] = [&mut log];
            let mut ctx = ComparisonContext::new(config, target_doc, &mut formatters);
            ctx.enter_namespace("UIKit");
            compare_types(&mut ctx, source, target).unwrap();
        }
        log.events
    }

    fn changes(events: &[ReportEvent]) -> Vec<&ReportEvent> {
        events.iter().filter(|e| e.is_change()).collect()
    }

    fn full_class() -> TypeDeclaration {
        let mut t = class("UIView")
            .with_member(MemberKind::Constructor, MemberDeclaration::new(".ctor"))
            .with_member(
                MemberKind::Method,
                MemberDeclaration::new("Draw").with_type("System.Void"),
            );
        t.interfaces.push("System.IDisposable".to_string());
        t.attributes.push(CustomAttribute::new("Foundation.RegisterAttribute"));
        t.nested.push(class("Appearance"));
        t
    }

    #[test]
    fn test_identical_types_emit_no_changes() {
        let types = vec![full_class()];
        let events = run(&CompareConfig::new(), &document(types.clone()), &types, &types);
        assert!(changes(&events).is_empty());
        assert!(events.contains(&ReportEvent::BeginTypeModification {
            name: "UIKit.UIView.Appearance".to_string()
        }));
    }

    #[test]
    fn test_added_type_has_full_declaration() {
        let added = vec![full_class()];
        let events = run(&CompareConfig::new(), &document(added.clone()), &[], &added);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ReportEvent::TypeAdded { name, declaration } => {
                assert_eq!(name, "UIKit.UIView");
                assert!(declaration.contains("public UIView()"));
                assert!(declaration.contains("public void Draw()"));
                assert!(declaration.contains("public class Appearance {"));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_removed_type_is_single_event() {
        let removed = vec![full_class()];
        let events = run(&CompareConfig::new(), &document(vec![]), &removed, &[]);
        assert_eq!(
            events,
            vec![ReportEvent::TypeRemoved {
                name: "UIKit.UIView".to_string(),
                breaking: true
            }]
        );
    }

    #[test]
    fn test_ignore_patterns_for_types() {
        let config = CompareConfig::new()
            .ignore_new(r"^UIKit\.UIView$")
            .unwrap()
            .ignore_removed("UIOld")
            .unwrap();
        let events = run(
            &config,
            &document(vec![]),
            &[class("UIOld")],
            &[class("UIView")],
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_inserted_base_is_compatible_but_reported() {
        let source = vec![class("UIPointerStyle").with_base("Foundation.NSObject")];
        let target = vec![
            class("UIPointerStyle").with_base("UIKit.UIHoverStyle"),
            class("UIHoverStyle").with_base("Foundation.NSObject"),
        ];
        let target_doc = document(target.clone());

        let events = run(&CompareConfig::new(), &target_doc, &source, &target[..1]);
        let base_change = events.iter().find_map(|e| match e {
            ReportEvent::TypeModified {
                aspect: TypeAspect::BaseType,
                change,
            } => Some(change),
            _ => None,
        });
        let change = base_change.expect("base type change reported");
        assert!(!change.is_breaking());
        assert_eq!(change.before(), "Foundation.NSObject");
        assert_eq!(change.after(), "UIKit.UIHoverStyle");

        let config = CompareConfig::new().ignore_nonbreaking(true);
        let events = run(&config, &target_doc, &source, &target[..1]);
        assert!(changes(&events).is_empty());
    }

    #[test]
    fn test_unrelated_base_is_breaking() {
        let source = vec![class("UIButton").with_base("UIKit.UIControl")];
        let target = vec![class("UIButton").with_base("UIKit.UIView")];
        let events = run(
            &CompareConfig::new().ignore_nonbreaking(true),
            &document(target.clone()),
            &source,
            &target,
        );
        assert_eq!(changes(&events).len(), 1);
        assert!(events.iter().any(ReportEvent::is_breaking));
    }

    #[test]
    fn test_object_base_is_not_a_change() {
        let source = vec![TypeDeclaration::new("A", TypeKind::Class)];
        let target = vec![class("A")];
        let events = run(&CompareConfig::new(), &document(target.clone()), &source, &target);
        assert!(changes(&events).is_empty());
    }

    #[test]
    fn test_interface_changes() {
        let mut source = class("A");
        source.interfaces = vec!["IOld".to_string(), "IKept".to_string()];
        let mut target = class("A");
        target.interfaces = vec!["IKept".to_string(), "INew".to_string()];

        let change = interfaces_change(&source, &target);
        assert!(change.is_breaking());
        assert_eq!(change.before(), "IOld\nIKept");
        assert_eq!(change.after(), "IKept\nINew");

        let change = interfaces_change(&target, &{
            let mut t = target.clone();
            t.interfaces.push("IMore".to_string());
            t
        });
        assert!(change.has_changes());
        assert!(!change.is_breaking());
    }

    #[test]
    fn test_nested_types_use_qualified_names() {
        let mut source = class("Outer");
        source.nested.push(class("Inner"));
        let mut target = class("Outer");
        target.nested.push(class("Inner").with_member(
            MemberKind::Method,
            MemberDeclaration::new("Run").with_type("System.Void"),
        ));
        target.nested.push(class("Extra"));

        let events = run(
            &CompareConfig::new(),
            &document(vec![target.clone()]),
            &[source],
            &[target],
        );
        let outer_end = events
            .iter()
            .position(|e| *e == ReportEvent::EndTypeModification)
            .unwrap();
        assert_eq!(
            events[outer_end + 1],
            ReportEvent::BeginTypeModification {
                name: "UIKit.Outer.Inner".to_string()
            }
        );
        assert!(events.contains(&ReportEvent::BeginMemberGroup {
            kind: MemberKind::Method,
            change: ChangeKind::Added,
            count: 1
        }));
        assert!(events.iter().any(|e| matches!(
            e,
            ReportEvent::TypeAdded { name, .. } if name == "UIKit.Outer.Extra"
        )));
    }

    #[test]
    fn test_sealed_type_modification() {
        let source = class("A");
        let mut target = class("A");
        target.is_sealed = true;
        let events = run(
            &CompareConfig::new(),
            &document(vec![target.clone()]),
            &[source],
            &[target],
        );
        assert!(events.iter().any(|e| matches!(
            e,
            ReportEvent::TypeModified {
                aspect: TypeAspect::Declaration,
                change
            } if change.is_breaking()
        )));
    }
}
