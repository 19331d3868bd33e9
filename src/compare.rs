//! Document-level walk: assemblies, then namespaces, then types.

use crate::classes::compare_types;
use crate::config::CompareConfig;
use crate::context::{ComparisonContext, ComparisonSummary};
use crate::error::ApiDiffError;
use crate::event::ReportEvent;
use crate::members::diff_collection;
use crate::model::{ApiDocument, Assembly, Namespace, TypeDeclaration};
use crate::output::{create_formatter, Formatter, OutputFormat};

pub const DEFAULT_TITLE: &str = "API diff";

/// Compares `source` (old) against `target` (new) and streams the events to
/// every formatter in `formatters`.
///
/// The run is deterministic: the same inputs and configuration always yield
/// the same event sequence. Formatters are not finished here.
pub fn compare_documents(
    title: &str,
    source: &ApiDocument,
    target: &ApiDocument,
    config: &CompareConfig,
    formatters: &mut [&mut dyn Formatter],
) -> Result<ComparisonSummary, ApiDiffError> {
    let mut ctx = ComparisonContext::new(config, target, formatters);
    ctx.emit(ReportEvent::BeginDocument {
        title: title.to_string(),
    });

    let diff = diff_collection(&source.assemblies, &target.assemblies, |a| a.name.as_str());
    for assembly in diff.removed {
        compare_assembly(&mut ctx, assembly, &assembly.namespaces, &[])?;
    }
    for (s, t) in diff.paired {
        compare_assembly(&mut ctx, t, &s.namespaces, &t.namespaces)?;
    }
    for assembly in diff.added {
        compare_assembly(&mut ctx, assembly, &[], &assembly.namespaces)?;
    }

    ctx.emit(ReportEvent::EndDocument);
    let summary = ctx.summary();
    tracing::debug!(
        added = summary.added,
        removed = summary.removed,
        modified = summary.modified,
        breaking = summary.breaking,
        "comparison finished"
    );
    Ok(summary)
}

fn compare_assembly(
    ctx: &mut ComparisonContext<'_, '_>,
    assembly: &Assembly,
    source: &[Namespace],
    target: &[Namespace],
) -> Result<(), ApiDiffError> {
    ctx.emit(ReportEvent::BeginAssembly {
        name: assembly.name.clone(),
        version: assembly.version.clone(),
    });

    let diff = diff_collection(source, target, |n| n.name.as_str());
    for namespace in diff.removed {
        compare_namespace(ctx, &namespace.name, &namespace.types, &[])?;
    }
    for (s, t) in diff.paired {
        compare_namespace(ctx, &t.name, &s.types, &t.types)?;
    }
    for namespace in diff.added {
        compare_namespace(ctx, &namespace.name, &[], &namespace.types)?;
    }

    ctx.emit(ReportEvent::EndAssembly);
    Ok(())
}

fn compare_namespace(
    ctx: &mut ComparisonContext<'_, '_>,
    name: &str,
    source: &[TypeDeclaration],
    target: &[TypeDeclaration],
) -> Result<(), ApiDiffError> {
    tracing::debug!(namespace = name, "comparing namespace");
    ctx.enter_namespace(name);
    ctx.emit(ReportEvent::BeginNamespace {
        name: name.to_string(),
    });
    compare_types(ctx, source, target)?;
    ctx.emit(ReportEvent::EndNamespace);
    ctx.leave_namespace();
    Ok(())
}

/// Runs a comparison with a single formatter and returns the finished
/// report together with the change counts.
///
/// # Examples
///
/// ```
/// use apidiff::{format_report, ApiDocument, CompareConfig, OutputFormat};
///
/// let doc = ApiDocument::default();
/// let (report, summary) =
///     format_report(&doc, &doc, &CompareConfig::new(), OutputFormat::Markdown).unwrap();
/// assert!(!summary.has_changes());
/// assert!(report.contains("No changes detected."));
/// ```
pub fn format_report(
    source: &ApiDocument,
    target: &ApiDocument,
    config: &CompareConfig,
    format: OutputFormat,
) -> Result<(String, ComparisonSummary), ApiDiffError> {
    let mut formatter = create_formatter(format);
    let summary = compare_documents(
        DEFAULT_TITLE,
        source,
        target,
        config,
        &mut [formatter.as_mut()],
    )?;
    let report = formatter.finish()?;
    Ok((report, summary))
}
