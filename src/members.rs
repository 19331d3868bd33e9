//! Member comparison: one collection diff shared by every member kind.

use crate::change::ApiChange;
use crate::context::ComparisonContext;
use crate::event::{ChangeKind, ReportEvent};
use crate::model::{MemberDeclaration, MemberKind, TypeDeclaration, TypeKind};
use crate::render::{member_change, member_declaration};
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

/// Result of pairing two ordered collections by identity.
///
/// `removed` and `paired` follow source order, `added` follows target order.
#[derive(Debug)]
pub struct CollectionDiff<'a, T> {
    pub added: Vec<&'a T>,
    pub removed: Vec<&'a T>,
    pub paired: Vec<(&'a T, &'a T)>,
    /// Number of source items that had more than one possible partner.
    pub ambiguous: usize,
}

/// Pairs `source` and `target` items that share a `key`.
///
/// Each target item is used at most once; a source item pairs with the
/// first unused target item with the same key, so duplicates pair up in
/// declaration order.
pub fn diff_collection<'a, T, K, F>(
    source: &'a [T],
    target: &'a [T],
    key: F,
) -> CollectionDiff<'a, T>
where
    K: Eq + Hash,
    F: Fn(&'a T) -> K,
{
    let mut unused: HashMap<K, VecDeque<usize>> = HashMap::new();
    for (j, item) in target.iter().enumerate() {
        unused.entry(key(item)).or_default().push_back(j);
    }

    let mut used = vec![false; target.len()];
    let mut seen = HashSet::new();
    let mut diff = CollectionDiff {
        added: Vec::new(),
        removed: Vec::new(),
        paired: Vec::new(),
        ambiguous: 0,
    };

    for item in source {
        let item_key = key(item);
        let candidates = unused.get_mut(&item_key);
        let remaining = candidates.as_ref().map_or(0, |c| c.len());
        let repeated = !seen.insert(item_key);
        if remaining > 1 || (repeated && remaining > 0) {
            diff.ambiguous += 1;
        }

        match candidates.and_then(VecDeque::pop_front) {
            Some(j) => {
                used[j] = true;
                diff.paired.push((item, &target[j]));
            }
            None => diff.removed.push(item),
        }
    }

    diff.added = target
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|(item, _)| item)
        .collect();
    diff
}

/// Kind-specific identity used to pair members across versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberIdentity<'a> {
    name: Option<&'a str>,
    generic_arity: usize,
    parameters: Vec<&'a str>,
}

/// Parameter directions are not part of the identity; a `ref` becoming an
/// `out` is reported as a modification.
pub fn member_identity(kind: MemberKind, member: &MemberDeclaration) -> MemberIdentity<'_> {
    let parameters = || {
        member
            .parameter_types()
            .map(|t| t.trim_end_matches('&'))
            .collect()
    };
    let name = Some(member.name.as_str());
    match kind {
        MemberKind::Constructor => MemberIdentity {
            name: None,
            generic_arity: 0,
            parameters: parameters(),
        },
        MemberKind::Field | MemberKind::Event => MemberIdentity {
            name,
            generic_arity: 0,
            parameters: Vec::new(),
        },
        MemberKind::Property => MemberIdentity {
            name,
            generic_arity: 0,
            parameters: parameters(),
        },
        MemberKind::Method => MemberIdentity {
            name,
            generic_arity: member.generic_parameters.len(),
            parameters: parameters(),
        },
    }
}

/// New abstract members and new instance members of an interface must be
/// implemented by existing subtypes.
pub fn is_breaking_addition(member: &MemberDeclaration, declaring: &TypeDeclaration) -> bool {
    member.modifiers.is_abstract
        || (declaring.kind == TypeKind::Interface && !member.modifiers.is_static)
}

fn emit_group(
    ctx: &mut ComparisonContext<'_, '_>,
    kind: MemberKind,
    change: ChangeKind,
    events: Vec<ReportEvent>,
) {
    if events.is_empty() {
        return;
    }
    ctx.emit(ReportEvent::BeginMemberGroup {
        kind,
        change,
        count: events.len(),
    });
    for event in events {
        ctx.emit(event);
    }
    ctx.emit(ReportEvent::EndMemberGroup);
}

/// Compares one member kind of a paired type and emits the removed,
/// modified and added groups, in that order.
pub fn compare_members(
    ctx: &mut ComparisonContext<'_, '_>,
    kind: MemberKind,
    source: &TypeDeclaration,
    target: &TypeDeclaration,
) {
    let diff = diff_collection(source.members(kind), target.members(kind), |m| {
        member_identity(kind, m)
    });
    if diff.ambiguous > 0 {
        tracing::warn!(
            type_name = ctx.current_type().unwrap_or_default(),
            kind = kind.plural(),
            count = diff.ambiguous,
            "duplicate member identities, pairing in declaration order"
        );
    }

    let config = ctx.config();

    let mut removed = Vec::new();
    for member in &diff.removed {
        let text = member_declaration(kind, member, source);
        let qualified = ctx.qualify(&member.name);
        if config.is_removed_ignored(&[text.as_str(), qualified.as_str()]) {
            tracing::trace!(member = %qualified, "removal ignored by pattern");
            continue;
        }
        removed.push(ReportEvent::MemberRemoved {
            text,
            breaking: true,
        });
    }

    let modified: Vec<ReportEvent> = diff
        .paired
        .iter()
        .map(|(s, t)| member_change(kind, s, t, target))
        .filter(|change| is_reported(change, config.ignore_nonbreaking))
        .map(|change| ReportEvent::MemberModified { change })
        .collect();

    let mut added = Vec::new();
    for member in &diff.added {
        let breaking = is_breaking_addition(member, target);
        if config.ignore_nonbreaking && !breaking {
            continue;
        }
        let text = member_declaration(kind, member, target);
        let qualified = ctx.qualify(&member.name);
        if config.is_added_ignored(&[text.as_str(), qualified.as_str()]) {
            tracing::trace!(member = %qualified, "addition ignored by pattern");
            continue;
        }
        added.push(ReportEvent::MemberAdded { text, breaking });
    }

    emit_group(ctx, kind, ChangeKind::Removed, removed);
    emit_group(ctx, kind, ChangeKind::Modified, modified);
    emit_group(ctx, kind, ChangeKind::Added, added);
}

/// A change is reported if it differs at all, unless non-breaking changes
/// are being ignored and it is not breaking.
pub fn is_reported(change: &ApiChange, ignore_nonbreaking: bool) -> bool {
    change.has_changes() && (change.is_breaking() || !ignore_nonbreaking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompareConfig;
    use crate::model::{ApiDocument, Modifiers};
    use crate::output::{EventLog, Formatter};

    fn method(name: &str) -> MemberDeclaration {
        MemberDeclaration::new(name).with_type("System.Void")
    }

    fn class(methods: Vec<MemberDeclaration>) -> TypeDeclaration {
        let mut t = TypeDeclaration::new("Widget", TypeKind::Class);
        t.methods = Some(methods);
        t
    }

    fn run_methods(
        config: &CompareConfig,
        source: &TypeDeclaration,
        target: &TypeDeclaration,
    ) -> Vec<ReportEvent> {
        let document = ApiDocument::default();
        let mut log = EventLog::new();
        {
            let mut formatters: [&mut dyn Formatter; 1] = [&mut log];
            let mut ctx = ComparisonContext::new(config, &document, &mut formatters);
            ctx.enter_namespace("Demo");
            ctx.enter_type(&target.name);
            compare_members(&mut ctx, MemberKind::Method, source, target);
        }
        log.events
    }

    #[test]
    fn test_diff_collection_partitions() {
        let source = ["a", "b", "c"];
        let target = ["c", "d", "a"];
        let diff = diff_collection(&source, &target, |x| *x);
        assert_eq!(diff.removed, vec![&"b"]);
        assert_eq!(diff.added, vec![&"d"]);
        assert_eq!(diff.paired, vec![(&"a", &"a"), (&"c", &"c")]);
        assert_eq!(diff.ambiguous, 0);
    }

    #[test]
    fn test_diff_collection_duplicates_pair_in_order() {
        let source = [("x", 1), ("x", 2)];
        let target = [("x", 10), ("x", 20), ("x", 30)];
        let diff = diff_collection(&source, &target, |item| item.0);
        assert_eq!(diff.paired[0].1, &("x", 10));
        assert_eq!(diff.paired[1].1, &("x", 20));
        assert_eq!(diff.added, vec![&("x", 30)]);
        assert_eq!(diff.ambiguous, 2);
    }

    #[test]
    fn test_diff_collection_large_scope() {
        let source: Vec<String> = (0..2000).map(|i| format!("Type{}", i)).collect();
        let target: Vec<String> = (1..2001).rev().map(|i| format!("Type{}", i)).collect();
        let diff = diff_collection(&source, &target, |name| name.as_str());
        assert_eq!(diff.paired.len(), 1999);
        assert!(diff.paired.iter().all(|(a, b)| a == b));
        assert_eq!(diff.paired[0].0, "Type1");
        assert_eq!(diff.removed, vec!["Type0"]);
        assert_eq!(diff.added, vec!["Type2000"]);
        assert_eq!(diff.ambiguous, 0);
    }

    #[test]
    fn test_method_identity_includes_signature() {
        let a = method("Foo");
        let b = method("Foo").with_parameter("x", "System.Int32");
        assert_ne!(
            member_identity(MemberKind::Method, &a),
            member_identity(MemberKind::Method, &b)
        );
        assert_eq!(
            member_identity(MemberKind::Field, &a),
            member_identity(MemberKind::Field, &b)
        );

        let mut generic = method("Foo");
        generic.generic_parameters.push("T".to_string());
        assert_ne!(
            member_identity(MemberKind::Method, &a),
            member_identity(MemberKind::Method, &generic)
        );
    }

    #[test]
    fn test_signature_change_is_remove_plus_add() {
        let source = class(vec![method("Foo")]);
        let target = class(vec![method("Foo").with_parameter("x", "System.Int32")]);
        let events = run_methods(&CompareConfig::new(), &source, &target);
        assert_eq!(
            events,
            vec![
                ReportEvent::BeginMemberGroup {
                    kind: MemberKind::Method,
                    change: ChangeKind::Removed,
                    count: 1
                },
                ReportEvent::MemberRemoved {
                    text: "public void Foo()".to_string(),
                    breaking: true
                },
                ReportEvent::EndMemberGroup,
                ReportEvent::BeginMemberGroup {
                    kind: MemberKind::Method,
                    change: ChangeKind::Added,
                    count: 1
                },
                ReportEvent::MemberAdded {
                    text: "public void Foo(int x)".to_string(),
                    breaking: false
                },
                ReportEvent::EndMemberGroup,
            ]
        );
    }

    #[test]
    fn test_identical_members_emit_nothing() {
        let t = class(vec![method("Foo"), method("Bar")]);
        assert!(run_methods(&CompareConfig::new(), &t, &t).is_empty());
    }

    #[test]
    fn test_abstract_addition_is_breaking() {
        let source = class(vec![]);
        let target = class(vec![method("Draw").with_modifiers(Modifiers {
            is_abstract: true,
            ..Default::default()
        })]);
        let events = run_methods(&CompareConfig::new(), &source, &target);
        assert!(events.iter().any(|e| matches!(
            e,
            ReportEvent::MemberAdded { breaking: true, .. }
        )));
    }

    #[test]
    fn test_interface_addition_is_breaking() {
        let source = TypeDeclaration::new("IWidget", TypeKind::Interface);
        let target = source
            .clone()
            .with_member(MemberKind::Method, method("Draw"));
        assert!(run_methods(&CompareConfig::new(), &source, &target)
            .iter()
            .any(ReportEvent::is_breaking));
    }

    #[test]
    fn test_ignore_nonbreaking_drops_additions() {
        let config = CompareConfig::new().ignore_nonbreaking(true);
        let source = class(vec![method("Old")]);
        let target = class(vec![method("New")]);
        let events = run_methods(&config, &source, &target);
        assert!(events
            .iter()
            .all(|e| !matches!(e, ReportEvent::MemberAdded { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, ReportEvent::MemberRemoved { .. })));
    }

    #[test]
    fn test_ignore_patterns_match_qualified_name() {
        let config = CompareConfig::new()
            .ignore_removed(r"^Demo\.Widget\.Old$")
            .unwrap()
            .ignore_added("New")
            .unwrap();
        let source = class(vec![method("Old")]);
        let target = class(vec![method("New")]);
        assert!(run_methods(&config, &source, &target).is_empty());
    }

    #[test]
    fn test_modified_member_carries_diff() {
        let source = class(vec![method("Foo").with_parameter("x", "System.Int32")]);
        let target = class(vec![method("Foo").with_parameter("value", "System.Int32")]);
        let events = run_methods(&CompareConfig::new(), &source, &target);
        match &events[1] {
            ReportEvent::MemberModified { change } => {
                assert_eq!(change.before(), "public void Foo(int x)");
                assert_eq!(change.after(), "public void Foo(int value)");
                assert!(!change.is_breaking());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
