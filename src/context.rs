//! Per-run comparison state.
//!
//! A [`ComparisonContext`] is created for one comparison run and threaded
//! as `&mut` through every comparer. It tracks where the walk currently is
//! (namespace, then a stack of enclosing types), owns the lazily built class
//! hierarchy map of the target document, and forwards every event to the
//! attached formatters.

use crate::config::CompareConfig;
use crate::error::ApiDiffError;
use crate::event::ReportEvent;
use crate::hierarchy::ClassHierarchyMap;
use crate::model::{qualify, ApiDocument};
use crate::output::Formatter;
use once_cell::unsync::OnceCell;

/// Counts of reported changes for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComparisonSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub breaking: usize,
}

impl ComparisonSummary {
    pub fn has_changes(&self) -> bool {
        self.added + self.removed + self.modified > 0
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.breaking > 0
    }

    fn record(&mut self, event: &ReportEvent) {
        match event {
            ReportEvent::TypeAdded { .. } | ReportEvent::MemberAdded { .. } => self.added += 1,
            ReportEvent::TypeRemoved { .. } | ReportEvent::MemberRemoved { .. } => {
                self.removed += 1
            }
            ReportEvent::AttributesModified { .. }
            | ReportEvent::TypeModified { .. }
            | ReportEvent::MemberModified { .. } => self.modified += 1,
            _ => return,
        }
        if event.is_breaking() {
            self.breaking += 1;
        }
    }
}

pub struct ComparisonContext<'a, 'f> {
    config: &'a CompareConfig,
    target: &'a ApiDocument,
    hierarchy: OnceCell<ClassHierarchyMap>,
    namespace: Option<String>,
    types: Vec<String>,
    formatters: &'a mut [&'f mut dyn Formatter],
    summary: ComparisonSummary,
}

impl<'a, 'f> ComparisonContext<'a, 'f> {
    pub fn new(
        config: &'a CompareConfig,
        target: &'a ApiDocument,
        formatters: &'a mut [&'f mut dyn Formatter],
    ) -> Self {
        Self {
            config,
            target,
            hierarchy: OnceCell::new(),
            namespace: None,
            types: Vec::new(),
            formatters,
            summary: ComparisonSummary::default(),
        }
    }

    pub fn config(&self) -> &'a CompareConfig {
        self.config
    }

    /// Sends `event` to every attached formatter.
    pub fn emit(&mut self, event: ReportEvent) {
        self.summary.record(&event);
        for formatter in self.formatters.iter_mut() {
            formatter.handle(&event);
        }
    }

    pub fn enter_namespace(&mut self, name: &str) {
        self.namespace = Some(name.to_string());
        self.types.clear();
    }

    pub fn leave_namespace(&mut self) {
        self.namespace = None;
    }

    /// Pushes a type and returns its qualified name.
    pub fn enter_type(&mut self, name: &str) -> String {
        let qualified = self.qualify(name);
        self.types.push(qualified.clone());
        qualified
    }

    pub fn leave_type(&mut self) {
        self.types.pop();
    }

    pub fn current_type(&self) -> Option<&str> {
        self.types.last().map(String::as_str)
    }

    /// Qualifies `name` with the innermost enclosing type, or the current
    /// namespace at the top level.
    pub fn qualify(&self, name: &str) -> String {
        let prefix = self
            .current_type()
            .or(self.namespace.as_deref())
            .unwrap_or("");
        qualify(prefix, name)
    }

    /// Human-readable position of the walk, used in error messages.
    pub fn location(&self) -> String {
        match (self.current_type(), self.namespace.as_deref()) {
            (Some(type_name), _) => format!("type {}", type_name),
            (None, Some(namespace)) => format!("namespace {}", namespace),
            (None, None) => "document".to_string(),
        }
    }

    /// The hierarchy map of the target document, built on first use.
    pub fn hierarchy(&self) -> Result<&ClassHierarchyMap, ApiDiffError> {
        let target = self.target;
        self.hierarchy
            .get_or_try_init(|| ClassHierarchyMap::build(target))
            .map_err(|e| ApiDiffError::compare(self.location(), e))
    }

    pub fn summary(&self) -> ComparisonSummary {
        self.summary
    }
}
