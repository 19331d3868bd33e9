//! The diff record for a single type aspect or member.

/// A piece of a rendered line: either text common to both versions or a
/// paired old/new replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    Modified {
        old: String,
        new: String,
        breaking: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLine {
    pub fragments: Vec<Fragment>,
}

impl ChangeLine {
    /// The line as it reads in the source version.
    pub fn before(&self) -> String {
        self.fragments
            .iter()
            .map(|f| match f {
                Fragment::Text(text) => text.as_str(),
                Fragment::Modified { old, .. } => old.as_str(),
            })
            .collect()
    }

    /// The line as it reads in the target version.
    pub fn after(&self) -> String {
        self.fragments
            .iter()
            .map(|f| match f {
                Fragment::Text(text) => text.as_str(),
                Fragment::Modified { new, .. } => new.as_str(),
            })
            .collect()
    }

    pub fn is_modified(&self) -> bool {
        self.fragments
            .iter()
            .any(|f| matches!(f, Fragment::Modified { .. }))
    }

    pub fn is_breaking(&self) -> bool {
        self.fragments
            .iter()
            .any(|f| matches!(f, Fragment::Modified { breaking: true, .. }))
    }
}

/// An ephemeral diff of one compared element.
///
/// Built fragment by fragment by the comparers and handed to the formatters,
/// which render the paired fragments in their own syntax. The aggregate
/// breaking flag is set as soon as one breaking fragment is added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiChange {
    header: String,
    lines: Vec<ChangeLine>,
    breaking: bool,
    any_change: bool,
}

impl ApiChange {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            lines: Vec::new(),
            breaking: false,
            any_change: false,
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn lines(&self) -> &[ChangeLine] {
        &self.lines
    }

    pub fn is_breaking(&self) -> bool {
        self.breaking
    }

    pub fn has_changes(&self) -> bool {
        self.any_change
    }

    /// Starts a new line.
    pub fn new_line(&mut self) -> &mut Self {
        self.lines.push(ChangeLine::default());
        self
    }

    /// Appends text shared by both versions to the current line.
    pub fn append(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        if !text.is_empty() {
            self.current_line().fragments.push(Fragment::Text(text));
        }
        self
    }

    /// Appends a paired replacement to the current line. Equal texts are
    /// appended as plain text.
    pub fn modified(
        &mut self,
        old: impl Into<String>,
        new: impl Into<String>,
        breaking: bool,
    ) -> &mut Self {
        let (old, new) = (old.into(), new.into());
        if old == new {
            return self.append(old);
        }
        self.any_change = true;
        self.breaking |= breaking;
        self.current_line().fragments.push(Fragment::Modified {
            old,
            new,
            breaking,
        });
        self
    }

    /// Text present only in the target version.
    pub fn added(&mut self, text: impl Into<String>, breaking: bool) -> &mut Self {
        self.modified(String::new(), text, breaking)
    }

    /// Text present only in the source version.
    pub fn removed(&mut self, text: impl Into<String>, breaking: bool) -> &mut Self {
        self.modified(text, String::new(), breaking)
    }

    /// Source rendering, skipping lines that only exist in the target.
    pub fn before(&self) -> String {
        self.lines
            .iter()
            .map(ChangeLine::before)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Target rendering, skipping lines that only exist in the source.
    pub fn after(&self) -> String {
        self.lines
            .iter()
            .map(ChangeLine::after)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn current_line(&mut self) -> &mut ChangeLine {
        if self.lines.is_empty() {
            self.lines.push(ChangeLine::default());
        }
        let last = self.lines.len() - 1;
        &mut self.lines[last]
    }
}
