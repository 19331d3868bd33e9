//! Type → base type lookup over a whole document.
//!
//! The map answers one question: when a type's base changes from `S` to `T`,
//! is `S` still an ancestor (that is, was a new type inserted into the chain)?
//! If so the restructuring keeps every inherited member reachable and is
//! treated as compatible.
//!
//! Known limitation: the walk only looks at names. A type inserted into the
//! chain that declares new abstract members, or overrides behavior, still
//! counts as compatible.

use crate::error::CompareError;
use crate::model::{qualify, short_name, ApiDocument, TypeDeclaration, SYSTEM_OBJECT};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct ClassHierarchyMap {
    bases: HashMap<String, String>,
    /// Short name → qualified name, only for unambiguous short names.
    short_names: HashMap<String, Option<String>>,
}

impl ClassHierarchyMap {
    /// Builds the map from every type in `document`, nested types included
    /// under their qualified `Namespace.Outer.Inner` names.
    pub fn build(document: &ApiDocument) -> Result<Self, CompareError> {
        let mut map = Self::default();
        let mut seen = HashSet::new();

        for assembly in &document.assemblies {
            for namespace in &assembly.namespaces {
                for declaration in &namespace.types {
                    map.insert(&namespace.name, declaration, &mut seen)?;
                }
            }
        }

        tracing::debug!(
            types = seen.len(),
            with_base = map.bases.len(),
            "built class hierarchy map"
        );
        Ok(map)
    }

    fn insert(
        &mut self,
        parent: &str,
        declaration: &TypeDeclaration,
        seen: &mut HashSet<String>,
    ) -> Result<(), CompareError> {
        let qualified = qualify(parent, &declaration.name);
        if !seen.insert(qualified.clone()) {
            return Err(CompareError::DuplicateType { name: qualified });
        }

        if let Some(base) = declaration.base_type.as_deref().filter(|b| !b.is_empty()) {
            self.bases.insert(qualified.clone(), base.to_string());
        }

        self.short_names
            .entry(declaration.name.clone())
            .and_modify(|existing| *existing = None)
            .or_insert_with(|| Some(qualified.clone()));

        for nested in &declaration.nested {
            self.insert(&qualified, nested, seen)?;
        }
        Ok(())
    }

    /// Returns the declared base of `type_name`.
    ///
    /// Unqualified names fall back to a unique short-name match.
    pub fn resolve(&self, type_name: &str) -> Option<&str> {
        if let Some(base) = self.bases.get(type_name) {
            return Some(base.as_str());
        }
        let qualified = self.short_names.get(short_name(type_name))?.as_deref()?;
        if type_name.contains('.') && qualified != type_name {
            return None;
        }
        self.bases.get(qualified).map(String::as_str)
    }

    /// True if walking up from `target_base` reaches `source_base`.
    ///
    /// A missing source base stands for `System.Object`, which every chain
    /// ends in.
    pub fn is_compatible_restructuring(
        &self,
        source_base: Option<&str>,
        target_base: Option<&str>,
    ) -> bool {
        let source = match source_base {
            Some(s) if s != SYSTEM_OBJECT => s,
            _ => return true,
        };
        let Some(mut current) = target_base else {
            return false;
        };

        let mut visited = HashSet::new();
        loop {
            if same_type(current, source) {
                return true;
            }
            if !visited.insert(current) {
                tracing::warn!(type_name = current, "cycle in class hierarchy");
                return false;
            }
            match self.resolve(current) {
                Some(next) => current = next,
                None => return false,
            }
        }
    }
}

/// Names match exactly, or one side is unqualified and the short names agree.
fn same_type(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let qualified = a.contains('.') && b.contains('.');
    !qualified && short_name(a) == short_name(b)
}
