//! Rendering of comparison events into change reports.
//!
//! Every format implements [`Formatter`], one method per event. All formats
//! buffer each assembly, namespace and type section and only flush it when
//! something was written while it was open, so a type that was visited but
//! did not change produces no heading at all.
//!
//! # Examples
//!
//! ```
//! use apidiff::output::{Formatter, MarkdownFormatter};
//! use apidiff::ApiChange;
//!
//! let mut change = ApiChange::new("Foo");
//! change.append("public void Foo(").added("int x", true).append(")");
//!
//! let mut md = MarkdownFormatter::new();
//! md.begin_document("API diff");
//! md.begin_namespace("Demo");
//! md.begin_type_modification("Demo.Widget");
//! md.begin_member_group(apidiff::MemberKind::Method, apidiff::ChangeKind::Modified, 1);
//! md.member_modified(&change);
//! md.end_member_group();
//! md.end_type_modification();
//! md.end_namespace();
//! md.end_document();
//!
//! let report = md.finish().unwrap();
//! assert!(report.contains("-public void Foo()\n+public void Foo(int x)\n"));
//! ```

use crate::change::{ApiChange, Fragment};
use crate::error::OutputError;
use crate::event::{ChangeKind, ReportEvent, TypeAspect};
use crate::model::MemberKind;
use colored::{Color, Colorize};
use std::str::FromStr;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text, no colors (suitable for piping)
    Text,
    /// Plain text with ANSI colors
    Terminal,
    Html,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(OutputFormat::Text),
            "terminal" => Ok(OutputFormat::Terminal),
            "html" => Ok(OutputFormat::Html),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(OutputError::UnknownFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Creates a fresh formatter for `format`.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new()),
        OutputFormat::Terminal => Box::new(TextFormatter::colored()),
        OutputFormat::Html => Box::new(HtmlFormatter::new()),
        OutputFormat::Markdown => Box::new(MarkdownFormatter::new()),
    }
}

/// The capability set of a report format.
///
/// Events arrive in strict nesting order. The provided [`Formatter::handle`]
/// dispatches a [`ReportEvent`] to the matching method; the report formats
/// implement every method, while sinks that only collect events may
/// override `handle` instead.
pub trait Formatter {
    fn begin_document(&mut self, _title: &str) {}
    fn end_document(&mut self) {}
    fn begin_assembly(&mut self, _name: &str, _version: Option<&str>) {}
    fn end_assembly(&mut self) {}
    fn begin_namespace(&mut self, _name: &str) {}
    fn end_namespace(&mut self) {}
    fn type_added(&mut self, _name: &str, _declaration: &str) {}
    fn type_removed(&mut self, _name: &str, _breaking: bool) {}
    fn begin_type_modification(&mut self, _name: &str) {}
    fn end_type_modification(&mut self) {}
    fn attributes_modified(&mut self, _change: &ApiChange) {}
    fn type_modified(&mut self, _aspect: TypeAspect, _change: &ApiChange) {}
    fn begin_member_group(&mut self, _kind: MemberKind, _change: ChangeKind, _count: usize) {}
    fn member_added(&mut self, _text: &str, _breaking: bool) {}
    fn member_removed(&mut self, _text: &str, _breaking: bool) {}
    fn member_modified(&mut self, _change: &ApiChange) {}
    fn end_member_group(&mut self) {}

    /// Returns the finished report.
    fn finish(&mut self) -> Result<String, OutputError>;

    fn handle(&mut self, event: &ReportEvent) {
        match event {
            ReportEvent::BeginDocument { title } => self.begin_document(title),
            ReportEvent::EndDocument => self.end_document(),
            ReportEvent::BeginAssembly { name, version } => {
                self.begin_assembly(name, version.as_deref())
            }
            ReportEvent::EndAssembly => self.end_assembly(),
            ReportEvent::BeginNamespace { name } => self.begin_namespace(name),
            ReportEvent::EndNamespace => self.end_namespace(),
            ReportEvent::TypeAdded { name, declaration } => self.type_added(name, declaration),
            ReportEvent::TypeRemoved { name, breaking } => self.type_removed(name, *breaking),
            ReportEvent::BeginTypeModification { name } => self.begin_type_modification(name),
            ReportEvent::EndTypeModification => self.end_type_modification(),
            ReportEvent::AttributesModified { change } => self.attributes_modified(change),
            ReportEvent::TypeModified { aspect, change } => self.type_modified(*aspect, change),
            ReportEvent::BeginMemberGroup {
                kind,
                change,
                count,
            } => self.begin_member_group(*kind, *change, *count),
            ReportEvent::MemberAdded { text, breaking } => self.member_added(text, *breaking),
            ReportEvent::MemberRemoved { text, breaking } => self.member_removed(text, *breaking),
            ReportEvent::MemberModified { change } => self.member_modified(change),
            ReportEvent::EndMemberGroup => self.end_member_group(),
        }
    }
}

/// Collects the raw event stream instead of rendering it.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<ReportEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Formatter for EventLog {
    fn handle(&mut self, event: &ReportEvent) {
        self.events.push(event.clone());
    }

    fn finish(&mut self) -> Result<String, OutputError> {
        Ok(self
            .events
            .iter()
            .map(|e| format!("{:?}", e))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[derive(Debug)]
struct Section {
    header: String,
    body: String,
    has_content: bool,
}

/// Nested output sections that are only kept if they received content.
///
/// A section goes from not started to open (`open`) to closed (`close`); on
/// close, its header and body are flushed into the enclosing section only if
/// `write` was called while it was open.
#[derive(Debug, Default)]
pub struct SectionBuffer {
    output: String,
    sections: Vec<Section>,
    has_changes: bool,
    unbalanced: Option<String>,
}

impl SectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes text that does not count as content (titles, placeholders).
    pub fn raw(&mut self, text: &str) {
        match self.sections.last_mut() {
            Some(section) => section.body.push_str(text),
            None => self.output.push_str(text),
        }
    }

    pub fn open(&mut self, header: impl Into<String>) {
        self.sections.push(Section {
            header: header.into(),
            body: String::new(),
            has_content: false,
        });
    }

    /// Writes content, marking the innermost open section as non-empty.
    pub fn write(&mut self, text: &str) {
        match self.sections.last_mut() {
            Some(section) => {
                section.body.push_str(text);
                section.has_content = true;
            }
            None => {
                self.output.push_str(text);
                self.has_changes = true;
            }
        }
    }

    /// Closes the innermost section. Returns whether it was flushed.
    pub fn close(&mut self, footer: &str) -> bool {
        let Some(section) = self.sections.pop() else {
            self.unbalanced
                .get_or_insert_with(|| "section closed without being opened".to_string());
            return false;
        };
        if !section.has_content {
            return false;
        }
        let text = format!("{}{}{}", section.header, section.body, footer);
        self.write(&text);
        true
    }

    /// True once any section has been flushed to the output.
    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    pub fn finish(&mut self) -> Result<String, OutputError> {
        if let Some(message) = self.unbalanced.take() {
            return Err(OutputError::UnbalancedEvents { message });
        }
        if !self.sections.is_empty() {
            return Err(OutputError::UnbalancedEvents {
                message: format!("{} section(s) left open", self.sections.len()),
            });
        }
        Ok(std::mem::take(&mut self.output))
    }
}

/// Plain-text report, optionally with ANSI colors.
#[derive(Debug, Default)]
pub struct TextFormatter {
    buffer: SectionBuffer,
    color: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colored() -> Self {
        Self {
            buffer: SectionBuffer::new(),
            color: true,
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn write_lines(&mut self, marker: &str, text: &str, breaking: bool, color: Color) {
        let lines: Vec<&str> = text.lines().collect();
        for (i, line) in lines.iter().enumerate() {
            let suffix = if breaking && i + 1 == lines.len() {
                " (breaking)"
            } else {
                ""
            };
            let line = self.paint(&format!("{} {}{}", marker, line, suffix), color);
            self.buffer.write(&format!("      {}\n", line));
        }
    }

    fn write_change(&mut self, change: &ApiChange) {
        for line in change.lines() {
            if !line.is_modified() {
                self.buffer.write(&format!("        {}\n", line.before()));
                continue;
            }
            let (before, after) = (line.before(), line.after());
            if !before.is_empty() {
                let text = self.paint(&format!("- {}", before), Color::Red);
                self.buffer.write(&format!("      {}\n", text));
            }
            if !after.is_empty() {
                let suffix = if line.is_breaking() { " (breaking)" } else { "" };
                let text = self.paint(&format!("+ {}{}", after, suffix), Color::Green);
                self.buffer.write(&format!("      {}\n", text));
            } else if line.is_breaking() {
                self.buffer.write("        (breaking)\n");
            }
        }
    }
}

impl Formatter for TextFormatter {
    fn begin_document(&mut self, title: &str) {
        let underline = "=".repeat(title.chars().count());
        self.buffer.raw(&format!("{}\n{}\n\n", title, underline));
    }

    fn end_document(&mut self) {
        if !self.buffer.has_changes() {
            self.buffer.raw("No changes detected.\n");
        }
    }

    fn begin_assembly(&mut self, name: &str, version: Option<&str>) {
        let header = match version {
            Some(version) => format!("Assembly {} {}\n\n", name, version),
            None => format!("Assembly {}\n\n", name),
        };
        self.buffer.open(header);
    }

    fn end_assembly(&mut self) {
        self.buffer.close("");
    }

    fn begin_namespace(&mut self, name: &str) {
        self.buffer.open(format!("Namespace {}\n", name));
    }

    fn end_namespace(&mut self) {
        self.buffer.close("\n");
    }

    fn type_added(&mut self, name: &str, declaration: &str) {
        let heading = self.paint(&format!("  New type: {}", name), Color::Green);
        let mut text = format!("{}\n", heading);
        for line in declaration.lines() {
            text.push_str(&format!("    {}\n", line));
        }
        self.buffer.write(&text);
    }

    fn type_removed(&mut self, name: &str, breaking: bool) {
        let suffix = if breaking { " (breaking)" } else { "" };
        let text = self.paint(&format!("  Removed type: {}{}", name, suffix), Color::Red);
        self.buffer.write(&format!("{}\n", text));
    }

    fn begin_type_modification(&mut self, name: &str) {
        let heading = self.paint(&format!("  Type changed: {}", name), Color::Yellow);
        self.buffer.open(format!("{}\n", heading));
    }

    fn end_type_modification(&mut self) {
        self.buffer.close("");
    }

    fn attributes_modified(&mut self, change: &ApiChange) {
        self.buffer.write("    Modified attributes:\n");
        self.write_change(change);
    }

    fn type_modified(&mut self, aspect: TypeAspect, change: &ApiChange) {
        self.buffer.write(&format!("    {}:\n", aspect.label()));
        self.write_change(change);
    }

    fn begin_member_group(&mut self, kind: MemberKind, change: ChangeKind, count: usize) {
        self.buffer
            .write(&format!("    {} {}:\n", change.label(), kind.label(count)));
    }

    fn member_added(&mut self, text: &str, breaking: bool) {
        self.write_lines("+", text, breaking, Color::Green);
    }

    fn member_removed(&mut self, text: &str, breaking: bool) {
        self.write_lines("-", text, breaking, Color::Red);
    }

    fn member_modified(&mut self, change: &ApiChange) {
        self.write_change(change);
    }

    fn end_member_group(&mut self) {}

    fn finish(&mut self) -> Result<String, OutputError> {
        self.buffer.finish()
    }
}

/// Markdown report: fenced `csharp` blocks for declarations and `diff`
/// blocks for modifications.
#[derive(Debug, Default)]
pub struct MarkdownFormatter {
    buffer: SectionBuffer,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits every modified line into a `-old` and a `+new` line; unchanged
    /// lines keep a leading space.
    fn diff_lines(change: &ApiChange) -> String {
        let mut out = String::new();
        for line in change.lines() {
            if !line.is_modified() {
                out.push_str(&format!(" {}\n", line.before()));
                continue;
            }
            let (before, after) = (line.before(), line.after());
            if !before.is_empty() {
                out.push_str(&format!("-{}\n", before));
            }
            if !after.is_empty() {
                out.push_str(&format!("+{}\n", after));
            }
        }
        out
    }

    fn write_diff_block(&mut self, label: &str, change: &ApiChange) {
        self.buffer.write(&format!(
            "{}:\n\n```diff\n{}```\n\n",
            label,
            Self::diff_lines(change)
        ));
    }
}

impl Formatter for MarkdownFormatter {
    fn begin_document(&mut self, title: &str) {
        self.buffer.raw(&format!("# {}\n\n", title));
    }

    fn end_document(&mut self) {
        if !self.buffer.has_changes() {
            self.buffer.raw("No changes detected.\n");
        }
    }

    fn begin_assembly(&mut self, name: &str, version: Option<&str>) {
        let header = match version {
            Some(version) => format!("## {} {}\n\n", name, version),
            None => format!("## {}\n\n", name),
        };
        self.buffer.open(header);
    }

    fn end_assembly(&mut self) {
        self.buffer.close("");
    }

    fn begin_namespace(&mut self, name: &str) {
        self.buffer.open(format!("### Namespace {}\n\n", name));
    }

    fn end_namespace(&mut self) {
        self.buffer.close("");
    }

    fn type_added(&mut self, name: &str, declaration: &str) {
        self.buffer.write(&format!(
            "#### New Type: {}\n\n```csharp\n{}\n```\n\n",
            name, declaration
        ));
    }

    fn type_removed(&mut self, name: &str, _breaking: bool) {
        self.buffer.write(&format!("#### Removed Type {}\n\n", name));
    }

    fn begin_type_modification(&mut self, name: &str) {
        self.buffer.open(format!("#### Type Changed: {}\n\n", name));
    }

    fn end_type_modification(&mut self) {
        self.buffer.close("");
    }

    fn attributes_modified(&mut self, change: &ApiChange) {
        self.write_diff_block("Modified attributes", change);
    }

    fn type_modified(&mut self, aspect: TypeAspect, change: &ApiChange) {
        self.write_diff_block(aspect.label(), change);
    }

    fn begin_member_group(&mut self, kind: MemberKind, change: ChangeKind, count: usize) {
        let fence = match change {
            ChangeKind::Modified => "diff",
            ChangeKind::Added | ChangeKind::Removed => "csharp",
        };
        self.buffer.write(&format!(
            "{} {}:\n\n```{}\n",
            change.label(),
            kind.label(count),
            fence
        ));
    }

    fn member_added(&mut self, text: &str, _breaking: bool) {
        self.buffer.write(&format!("{}\n", text));
    }

    fn member_removed(&mut self, text: &str, _breaking: bool) {
        self.buffer.write(&format!("{}\n", text));
    }

    fn member_modified(&mut self, change: &ApiChange) {
        self.buffer.write(&Self::diff_lines(change));
    }

    fn end_member_group(&mut self) {
        self.buffer.write("```\n\n");
    }

    fn finish(&mut self) -> Result<String, OutputError> {
        self.buffer.finish()
    }
}

/// HTML fragment report with inline `added`/`removed` spans.
#[derive(Debug, Default)]
pub struct HtmlFormatter {
    buffer: SectionBuffer,
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn span(class: &str, breaking: bool, text: &str) -> String {
    let breaking = if breaking { " breaking" } else { "" };
    format!(
        "<span class=\"{}{}\">{}</span>",
        class,
        breaking,
        escape_html(text)
    )
}

impl HtmlFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    fn inline_change(change: &ApiChange) -> String {
        let mut out = String::new();
        for line in change.lines() {
            out.push('\t');
            for fragment in &line.fragments {
                match fragment {
                    Fragment::Text(text) => out.push_str(&escape_html(text)),
                    Fragment::Modified { old, new, breaking } => {
                        if !old.is_empty() {
                            out.push_str(&span("removed", *breaking, old));
                        }
                        if !new.is_empty() {
                            out.push_str(&span("added", *breaking, new));
                        }
                    }
                }
            }
            out.push('\n');
        }
        out
    }

    fn write_members(&mut self, class: &str, text: &str, breaking: bool) {
        for line in text.lines() {
            self.buffer
                .write(&format!("\t{}\n", span(class, breaking, line)));
        }
    }
}

impl Formatter for HtmlFormatter {
    fn begin_document(&mut self, title: &str) {
        self.buffer
            .raw(&format!("<h1>{}</h1>\n", escape_html(title)));
    }

    fn end_document(&mut self) {
        if !self.buffer.has_changes() {
            self.buffer.raw("<p>No changes detected.</p>\n");
        }
    }

    fn begin_assembly(&mut self, name: &str, version: Option<&str>) {
        let title = match version {
            Some(version) => format!("{} {}", name, version),
            None => name.to_string(),
        };
        self.buffer
            .open(format!("<h2>{}</h2>\n", escape_html(&title)));
    }

    fn end_assembly(&mut self) {
        self.buffer.close("");
    }

    fn begin_namespace(&mut self, name: &str) {
        self.buffer
            .open(format!("<h3>Namespace {}</h3>\n", escape_html(name)));
    }

    fn end_namespace(&mut self) {
        self.buffer.close("");
    }

    fn type_added(&mut self, name: &str, declaration: &str) {
        self.buffer.write(&format!(
            "<h4>New Type: {}</h4>\n<pre class=\"added\">\n{}\n</pre>\n",
            escape_html(name),
            escape_html(declaration)
        ));
    }

    fn type_removed(&mut self, name: &str, breaking: bool) {
        self.buffer.write(&format!(
            "<h4>Removed Type {}</h4>\n",
            span("removed", breaking, name)
        ));
    }

    fn begin_type_modification(&mut self, name: &str) {
        self.buffer
            .open(format!("<h4>Type Changed: {}</h4>\n", escape_html(name)));
    }

    fn end_type_modification(&mut self) {
        self.buffer.close("");
    }

    fn attributes_modified(&mut self, change: &ApiChange) {
        self.buffer.write(&format!(
            "<p>Modified attributes:</p>\n<pre>\n{}</pre>\n",
            Self::inline_change(change)
        ));
    }

    fn type_modified(&mut self, aspect: TypeAspect, change: &ApiChange) {
        self.buffer.write(&format!(
            "<p>{}:</p>\n<pre>\n{}</pre>\n",
            aspect.label(),
            Self::inline_change(change)
        ));
    }

    fn begin_member_group(&mut self, kind: MemberKind, change: ChangeKind, count: usize) {
        self.buffer.write(&format!(
            "<p>{} {}:</p>\n<pre>\n",
            change.label(),
            kind.label(count)
        ));
    }

    fn member_added(&mut self, text: &str, breaking: bool) {
        self.write_members("added", text, breaking);
    }

    fn member_removed(&mut self, text: &str, breaking: bool) {
        self.write_members("removed", text, breaking);
    }

    fn member_modified(&mut self, change: &ApiChange) {
        self.buffer.write(&Self::inline_change(change));
    }

    fn end_member_group(&mut self) {
        self.buffer.write("</pre>\n");
    }

    fn finish(&mut self) -> Result<String, OutputError> {
        self.buffer.finish()
    }
}
