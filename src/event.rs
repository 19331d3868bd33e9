//! The event stream produced by a comparison run.
//!
//! Comparers never write text themselves; they emit [`ReportEvent`]s in a
//! strict nesting order (document → assembly → namespace → type → member
//! group) and every attached formatter renders the same sequence.

use crate::change::ApiChange;
use crate::model::MemberKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Added => "Added",
            ChangeKind::Removed => "Removed",
            ChangeKind::Modified => "Modified",
        }
    }
}

/// Which part of a type declaration a type-level diff covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeAspect {
    Declaration,
    BaseType,
    Interfaces,
}

impl TypeAspect {
    pub fn label(&self) -> &'static str {
        match self {
            TypeAspect::Declaration => "Modified type declaration",
            TypeAspect::BaseType => "Modified base type",
            TypeAspect::Interfaces => "Modified interfaces",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    BeginDocument {
        title: String,
    },
    EndDocument,
    BeginAssembly {
        name: String,
        version: Option<String>,
    },
    EndAssembly,
    BeginNamespace {
        name: String,
    },
    EndNamespace,
    /// A type present only in the target, with its full synthetic declaration.
    TypeAdded {
        name: String,
        declaration: String,
    },
    /// A type present only in the source. Members are not enumerated.
    TypeRemoved {
        name: String,
        breaking: bool,
    },
    BeginTypeModification {
        name: String,
    },
    EndTypeModification,
    AttributesModified {
        change: ApiChange,
    },
    TypeModified {
        aspect: TypeAspect,
        change: ApiChange,
    },
    BeginMemberGroup {
        kind: MemberKind,
        change: ChangeKind,
        count: usize,
    },
    MemberAdded {
        text: String,
        breaking: bool,
    },
    MemberRemoved {
        text: String,
        breaking: bool,
    },
    MemberModified {
        change: ApiChange,
    },
    EndMemberGroup,
}

impl ReportEvent {
    /// True for events that describe an actual difference, as opposed to
    /// the structural begin/end markers.
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            ReportEvent::TypeAdded { .. }
                | ReportEvent::TypeRemoved { .. }
                | ReportEvent::AttributesModified { .. }
                | ReportEvent::TypeModified { .. }
                | ReportEvent::MemberAdded { .. }
                | ReportEvent::MemberRemoved { .. }
                | ReportEvent::MemberModified { .. }
        )
    }

    pub fn is_breaking(&self) -> bool {
        match self {
            ReportEvent::TypeRemoved { breaking, .. }
            | ReportEvent::MemberAdded { breaking, .. }
            | ReportEvent::MemberRemoved { breaking, .. } => *breaking,
            ReportEvent::AttributesModified { change }
            | ReportEvent::TypeModified { change, .. }
            | ReportEvent::MemberModified { change } => change.is_breaking(),
            _ => false,
        }
    }
}
