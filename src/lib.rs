//! apidiff - structural diff of two versions of a library's API surface.
//!
//! Two API documents (assemblies → namespaces → types → members) are walked
//! in parallel; every difference is classified as breaking or non-breaking
//! and streamed as [`ReportEvent`]s to one or more [`Formatter`]s, which
//! render plain-text, HTML or Markdown change reports.
//!
//! # Example
//!
//! ```no_run
//! use apidiff::{format_report, parse_file, CompareConfig, OutputFormat};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let old = parse_file(Path::new("api-1.0.xml"))?;
//! let new = parse_file(Path::new("api-2.0.xml"))?;
//!
//! let config = CompareConfig::new().ignore_new(r"\.Internal\.")?;
//! let (report, summary) = format_report(&old, &new, &config, OutputFormat::Markdown)?;
//! println!("{}", report);
//! if summary.has_breaking_changes() {
//!     eprintln!("{} breaking changes", summary.breaking);
//! }
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod change;
pub mod classes;
pub mod compare;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod hierarchy;
pub mod loader;
pub mod members;
pub mod model;
pub mod output;
pub mod render;

// Re-export commonly used types for convenience
pub use change::{ApiChange, ChangeLine, Fragment};
pub use compare::{compare_documents, format_report, DEFAULT_TITLE};
pub use config::CompareConfig;
pub use context::{ComparisonContext, ComparisonSummary};
pub use error::{ApiDiffError, CompareError, LoadError, OutputError};
pub use event::{ChangeKind, ReportEvent, TypeAspect};
pub use hierarchy::ClassHierarchyMap;
pub use loader::{parse_content, parse_file, parse_xml, FormatHint};
pub use model::{
    ApiDocument, Assembly, CustomAttribute, MemberDeclaration, MemberKind, Modifiers, Namespace,
    Parameter, ParameterDirection, TypeDeclaration, TypeKind, Visibility,
};
pub use output::{
    create_formatter, EventLog, Formatter, HtmlFormatter, MarkdownFormatter, OutputFormat,
    TextFormatter,
};
