//! Keybind conflict detection and stacked edit resolution
//!
//! A prospective bind conflicts with an existing line when both resolve to
//! the same `KeyCombo`. The overlay file is searched before the base file,
//! and within a file the latest matching line wins.
//!
//! Resolving a conflict can require editing the conflicting line first.
//! `EditSession` models that as a stack: the interrupted edit is stashed as
//! a fully formed `EditBlock` and the conflicting line becomes the current
//! edit. Chains can be arbitrarily deep; everything is flushed in one
//! `CommitPlan` once an edit is accepted.
//!
//! # Commit order
//! 1. Existing overlay content
//! 2. Header comment
//! 3. Unbind of the edited line's original target (edits only)
//! 4. Unbind of the overwritten conflict (overwrite only)
//! 5. The accepted line
//! 6. Stashed blocks, most recently stashed first

use std::collections::HashMap;
use std::fmt;

use crate::core::parser::{autocorrect, parse_bind_line, ParseError, ParsedLine};
use crate::core::types::{BindLine, KeyCombo, UnbindTarget};

/// Which file a line came from
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BindSource {
    /// User override file, sourced after the base
    Overlay,
    /// Original bind file
    Base,
}

impl fmt::Display for BindSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindSource::Overlay => write!(f, "overlay"),
            BindSource::Base => write!(f, "source"),
        }
    }
}

/// Location of an existing line
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Origin {
    pub source: BindSource,
    /// 1-based
    pub line_number: usize,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line_number)
    }
}

/// An existing bind that collides with a candidate
#[derive(Clone, Debug, PartialEq)]
pub struct ConflictMatch {
    pub origin: Origin,
    pub bind: BindLine,
}

/// Header comment for a generated block
pub fn edit_comment(stamp: &str) -> String {
    format!("# hypr-config-tui edit {}", stamp)
}

/// One stashed edit, ready to be written verbatim
#[derive(Clone, Debug, PartialEq)]
pub struct EditBlock {
    pub comment: String,
    pub unbind: Option<UnbindTarget>,
    pub line: BindLine,
}

impl fmt::Display for EditBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.comment)?;
        if let Some(unbind) = &self.unbind {
            writeln!(f, "{}", unbind)?;
        }
        writeln!(f, "{}", self.line)
    }
}

/// Ordered stack of stashed edits, most recent first
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingEditStack {
    blocks: Vec<EditBlock>,
}

impl PendingEditStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stash a block in front of every earlier one
    pub fn push_front(&mut self, block: EditBlock) {
        self.blocks.insert(0, block);
    }

    /// Whether an unbind for exactly this raw pair is already scheduled
    pub fn unbinds(&self, target: &UnbindTarget) -> bool {
        self.blocks
            .iter()
            .any(|b| b.unbind.as_ref() == Some(target))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EditBlock> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Searches overlay and base binds for collisions
pub struct ConflictChecker<'a> {
    overlay: &'a [ParsedLine],
    base: &'a [ParsedLine],
    variables: &'a HashMap<String, String>,
}

impl<'a> ConflictChecker<'a> {
    pub fn new(
        overlay: &'a [ParsedLine],
        base: &'a [ParsedLine],
        variables: &'a HashMap<String, String>,
    ) -> Self {
        Self {
            overlay,
            base,
            variables,
        }
    }

    /// Find the line a candidate would collide with
    ///
    /// - The overlay is checked first; the base only when the overlay has
    ///   no live match and does not unbind the combo itself
    /// - Within a file the latest live match wins; an `unbind` of the combo
    ///   kills every earlier match in that file
    /// - `exclude` (the line being edited) never conflicts with itself
    /// - A match whose raw pair is already unbound by a stashed edit is
    ///   scheduled for removal and cannot conflict
    pub fn check_conflict(
        &self,
        candidate: &BindLine,
        exclude: Option<&Origin>,
        pending: &PendingEditStack,
    ) -> Option<ConflictMatch> {
        let combo = KeyCombo::from_line(candidate, self.variables);

        if let Some(found) =
            self.latest_match(&combo, self.overlay, BindSource::Overlay, exclude, pending)
        {
            return Some(found);
        }

        let overlay_unbinds = self
            .overlay
            .iter()
            .any(|pl| pl.bind.is_unbind() && KeyCombo::from_line(&pl.bind, self.variables) == combo);
        if overlay_unbinds {
            return None;
        }

        self.latest_match(&combo, self.base, BindSource::Base, exclude, pending)
    }

    fn latest_match(
        &self,
        combo: &KeyCombo,
        lines: &[ParsedLine],
        source: BindSource,
        exclude: Option<&Origin>,
        pending: &PendingEditStack,
    ) -> Option<ConflictMatch> {
        let mut found = None;

        for pl in lines {
            if KeyCombo::from_line(&pl.bind, self.variables) != *combo {
                continue;
            }

            if pl.bind.is_unbind() {
                found = None;
                continue;
            }

            let origin = Origin {
                source,
                line_number: pl.line_number,
            };
            if exclude == Some(&origin) || pending.unbinds(&pl.bind.target()) {
                continue;
            }

            found = Some(ConflictMatch {
                origin,
                bind: pl.bind.clone(),
            });
        }

        found
    }
}

/// Everything needed to append one accepted edit to the overlay
#[derive(Clone, Debug, PartialEq)]
pub struct CommitPlan {
    pub original_unbind: Option<UnbindTarget>,
    pub overwrite_unbind: Option<UnbindTarget>,
    pub accepted: BindLine,
    pub stack: PendingEditStack,
}

impl CommitPlan {
    /// Render the new overlay content
    ///
    /// `existing` is kept byte for byte; the generated blocks follow after
    /// a blank separator line when the file is not empty. An overwrite
    /// unbind identical to the original-target unbind is written once.
    pub fn render(&self, existing: &str, stamp: &str) -> String {
        let mut out = String::from(existing);

        if !out.is_empty() {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out.push('\n');
        }

        out.push_str(&edit_comment(stamp));
        out.push('\n');

        if let Some(unbind) = &self.original_unbind {
            out.push_str(&format!("{}\n", unbind));
        }
        if let Some(unbind) = &self.overwrite_unbind {
            if self.original_unbind.as_ref() != Some(unbind) {
                out.push_str(&format!("{}\n", unbind));
            }
        }

        out.push_str(&format!("{}\n", self.accepted));

        for block in self.stack.iter() {
            out.push_str(&block.to_string());
        }

        out
    }
}

/// Result of submitting edited text
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    /// No collision: ready to write
    Clean(CommitPlan),
    /// Waiting for overwrite / edit-the-conflict / retry
    Conflict(ConflictMatch),
}

/// Errors raised when submitting a candidate line
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Only bind lines can be saved here; unbinds are generated automatically")]
    NotABind,
}

/// One edit loop, possibly spanning several stacked edits
///
/// # Lifecycle
/// 1. `create()` or `edit(origin, bind)`
/// 2. `submit(text)` → `Clean` (done) or `Conflict`
/// 3. On conflict: `overwrite()` (done), `edit_conflict()` (stash and
///    continue with the conflicting line) or `retry()` (edit again)
#[derive(Clone, Debug, Default)]
pub struct EditSession {
    origin: Option<(Origin, BindLine)>,
    stack: PendingEditStack,
    awaiting: Option<(BindLine, ConflictMatch)>,
}

impl EditSession {
    /// Start a session that adds a brand-new bind
    pub fn create() -> Self {
        Self::default()
    }

    /// Start a session that replaces an existing line
    pub fn edit(origin: Origin, bind: BindLine) -> Self {
        Self {
            origin: Some((origin, bind)),
            ..Self::default()
        }
    }

    /// Line currently being edited, if not a creation
    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref().map(|(o, _)| o)
    }

    pub fn stack(&self) -> &PendingEditStack {
        &self.stack
    }

    /// Conflict waiting for a decision
    pub fn awaiting(&self) -> Option<&ConflictMatch> {
        self.awaiting.as_ref().map(|(_, c)| c)
    }

    /// Parse, auto-correct and check a candidate line
    pub fn submit(
        &mut self,
        text: &str,
        checker: &ConflictChecker<'_>,
    ) -> Result<Submission, SubmitError> {
        let candidate = autocorrect(parse_bind_line(text)?);
        if candidate.is_unbind() {
            return Err(SubmitError::NotABind);
        }

        match checker.check_conflict(&candidate, self.origin(), &self.stack) {
            Some(conflict) => {
                self.awaiting = Some((candidate, conflict.clone()));
                Ok(Submission::Conflict(conflict))
            }
            None => Ok(Submission::Clean(CommitPlan {
                original_unbind: self.original_target(),
                overwrite_unbind: None,
                accepted: candidate,
                stack: self.stack.clone(),
            })),
        }
    }

    /// Replace the conflicting line: unbind it and accept the candidate
    pub fn overwrite(&mut self) -> Option<CommitPlan> {
        let (candidate, conflict) = self.awaiting.take()?;

        Some(CommitPlan {
            original_unbind: self.original_target(),
            overwrite_unbind: Some(conflict.bind.target()),
            accepted: candidate,
            stack: self.stack.clone(),
        })
    }

    /// Stash the candidate and continue by editing the conflicting line
    ///
    /// Returns the text to seed the editor with.
    pub fn edit_conflict(&mut self, stamp: &str) -> Option<String> {
        let (candidate, conflict) = self.awaiting.take()?;

        self.stack.push_front(EditBlock {
            comment: edit_comment(stamp),
            unbind: self.original_target(),
            line: candidate,
        });

        let seed = conflict.bind.to_string();
        self.origin = Some((conflict.origin, conflict.bind));
        Some(seed)
    }

    /// Drop the prompt and return the candidate text for another attempt
    pub fn retry(&mut self) -> Option<String> {
        self.awaiting.take().map(|(candidate, _)| candidate.to_string())
    }

    fn original_target(&self) -> Option<UnbindTarget> {
        self.origin.as_ref().map(|(_, bind)| bind.target())
    }
}
