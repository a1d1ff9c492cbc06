// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! INI-style key/value files (`logind.conf` and friends)
//!
//! Only as much of the format as is needed to find and replace entries:
//! - `[Section]` headers
//! - `Key=Value` entries and commented-out `#Key=Value` entries
//! - Inline trailing comments introduced by `#`
//!
//! # Patching
//!
//! `PatchSet::apply` rewrites a file's text:
//! 1. Every active line for a changed key is replaced in place, keeping its
//!    indentation, inline comment and line ending
//! 2. Without an active line, the first commented-out occurrence is
//!    uncommented and replaced
//! 3. Otherwise the entry is appended at the end of its section, creating
//!    the section header at the end of the file if needed
//! 4. Every other line passes through byte for byte
//!
//! Changes whose value already equals the on-disk value are dropped first,
//! so applying a no-op change set returns the input unchanged.

use log::debug;
use regex::Regex;
use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::OnceLock,
};

use crate::config::{transaction::read_config, ConfigError};

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*\[([^\]]+)\]\s*$").expect("section header pattern should be valid regex")
    })
}

fn entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\s*)(#\s*)?([A-Za-z][A-Za-z0-9_.-]*)\s*=(.*)$")
            .expect("entry pattern should be valid regex")
    })
}

/// What a single line is, structurally
#[derive(Clone, Debug, PartialEq)]
enum LineKind {
    Section(String),
    Entry {
        indent: String,
        commented: bool,
        key: String,
        value: String,
        /// Inline comment including the whitespace before `#`
        inline: String,
    },
    Other,
}

fn classify(line: &str) -> LineKind {
    let body = line.trim_end_matches(['\n', '\r']);

    if let Some(caps) = section_re().captures(body) {
        return LineKind::Section(caps[1].trim().to_string());
    }

    let Some(caps) = entry_re().captures(body) else {
        return LineKind::Other;
    };

    let remainder = &caps[4];
    let (raw_value, inline) = split_inline_comment(remainder);

    LineKind::Entry {
        indent: caps[1].to_string(),
        commented: caps.get(2).is_some(),
        key: caps[3].to_string(),
        value: normalise_value(raw_value),
        inline: inline.to_string(),
    }
}

/// Split `value  # comment` into the value part and the comment part
fn split_inline_comment(remainder: &str) -> (&str, &str) {
    match remainder.find('#') {
        Some(pos) => {
            let value = &remainder[..pos];
            let trimmed_len = value.trim_end().len();
            (&remainder[..trimmed_len], &remainder[trimmed_len..])
        }
        None => (remainder, ""),
    }
}

/// Values are compared and stored with all whitespace removed
pub fn normalise_value(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Last-known-good view of a file's active entries
///
/// Built once per load; saves diff against it so that unchanged keys are
/// never rewritten. Malformed lines are simply not entries.
///
/// Entries remember their section. A lookup scoped to a section that has
/// a header in the file only sees that section; a lookup for a section
/// with no header sees the whole file, matching where `PatchSet::apply`
/// would write.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileCache {
    /// (section, key, value) in file order
    entries: Vec<(Option<String>, String, String)>,
    sections: HashSet<String>,
}

impl FileCache {
    pub fn parse(content: &str) -> Self {
        let mut cache = Self::default();
        let mut current: Option<String> = None;

        for line in content.lines() {
            match classify(line) {
                LineKind::Section(name) => {
                    cache.sections.insert(name.clone());
                    current = Some(name);
                }
                LineKind::Entry {
                    commented: false,
                    key,
                    value,
                    ..
                } => cache.entries.push((current.clone(), key, value)),
                _ => {}
            }
        }

        cache
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::parse(&read_config(path)?))
    }

    /// Value of `key` in any section; the last occurrence wins
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_in(None, key)
    }

    /// Value of `key` within `section`; the last occurrence wins
    pub fn get_in(&self, section: Option<&str>, key: &str) -> Option<&str> {
        self.scoped(section, key).last().map(|(_, _, v)| v.as_str())
    }

    /// True when every active occurrence in scope already holds `value`
    fn holds(&self, change: &Change) -> bool {
        let wanted = normalise_value(&change.value);
        let mut found = false;

        for (_, _, value) in self.scoped(change.section.as_deref(), &change.key) {
            if *value != wanted {
                return false;
            }
            found = true;
        }
        found
    }

    fn scoped<'a, 'q>(
        &'a self,
        section: Option<&'q str>,
        key: &'q str,
    ) -> impl Iterator<Item = &'a (Option<String>, String, String)> + 'q
    where
        'a: 'q,
    {
        let section = section.filter(|s| self.sections.contains(*s));
        self.entries.iter().filter(move |(sec, k, _)| {
            k == key && section.is_none_or(|wanted| sec.as_deref() == Some(wanted))
        })
    }

    /// Number of active entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One key assignment
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Change {
    pub section: Option<String>,
    pub key: String,
    pub value: String,
}

impl Change {
    pub fn new(section: Option<&str>, key: &str, value: &str) -> Self {
        Self {
            section: section.map(str::to_string),
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

/// An ordered set of key assignments to apply to a file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatchSet {
    changes: Vec<Change>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Drop every change whose value already matches the cache
    pub fn without_noops(&self, cache: &FileCache) -> PatchSet {
        PatchSet {
            changes: self
                .changes
                .iter()
                .filter(|c| !cache.holds(c))
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    /// Produce the rewritten file content
    pub fn apply(&self, content: &str) -> String {
        let effective = self.without_noops(&FileCache::parse(content));
        if effective.is_empty() {
            return content.to_string();
        }

        let mut lines: Vec<String> = content.split_inclusive('\n').map(str::to_string).collect();
        let kinds: Vec<LineKind> = lines.iter().map(|l| classify(l)).collect();

        // Section each line belongs to (None before the first header)
        let mut sections = Vec::with_capacity(kinds.len());
        let mut current: Option<String> = None;
        for kind in &kinds {
            if let LineKind::Section(name) = kind {
                current = Some(name.clone());
            }
            sections.push(current.clone());
        }

        let mut inserts: HashMap<usize, Vec<String>> = HashMap::new();
        let mut appended: Vec<(Option<String>, String)> = Vec::new();

        for change in effective.iter() {
            let has_header = change.section.as_ref().is_some_and(|wanted| {
                kinds
                    .iter()
                    .any(|k| matches!(k, LineKind::Section(name) if name == wanted))
            });
            let in_scope = |idx: usize| match &change.section {
                Some(wanted) if has_header => sections[idx].as_ref() == Some(wanted),
                _ => true,
            };

            let matches_key = |idx: usize, want_commented: bool| {
                matches!(&kinds[idx], LineKind::Entry { key, commented, .. }
                    if *key == change.key && *commented == want_commented)
                    && in_scope(idx)
            };

            let active: Vec<usize> = (0..kinds.len()).filter(|&i| matches_key(i, false)).collect();
            let targets = if active.is_empty() {
                (0..kinds.len()).find(|&i| matches_key(i, true)).into_iter().collect()
            } else {
                active
            };

            if targets.is_empty() {
                let entry = format!("{}={}", change.key, change.value);
                match &change.section {
                    Some(wanted) if has_header => {
                        let anchor = section_anchor(&kinds, &sections, &lines, wanted);
                        inserts.entry(anchor).or_default().push(entry);
                    }
                    _ => appended.push((change.section.clone(), entry)),
                }
                continue;
            }

            for idx in targets {
                if let LineKind::Entry { indent, inline, .. } = &kinds[idx] {
                    let ending = line_ending(&lines[idx]);
                    debug!("replacing line {}: {}", idx + 1, lines[idx].trim_end());
                    lines[idx] = format!("{}{}={}{}{}", indent, change.key, change.value, inline, ending);
                }
            }
        }

        let mut out = String::with_capacity(content.len() + 64);
        for (idx, line) in lines.iter().enumerate() {
            out.push_str(line);
            if let Some(entries) = inserts.get(&idx) {
                if !line.ends_with('\n') {
                    out.push('\n');
                }
                for entry in entries {
                    out.push_str(entry);
                    out.push('\n');
                }
            }
        }

        append_tail(&mut out, appended);
        out
    }
}

/// Index of the line new entries for `section` are inserted after:
/// the last non-blank line of the section, or its header
fn section_anchor(kinds: &[LineKind], sections: &[Option<String>], lines: &[String], section: &str) -> usize {
    let mut anchor = 0;
    let mut in_section = false;

    for (idx, kind) in kinds.iter().enumerate() {
        match kind {
            LineKind::Section(name) if name == section => {
                in_section = true;
                anchor = idx;
            }
            LineKind::Section(_) => in_section = false,
            _ if in_section && sections[idx].as_deref() == Some(section) => {
                if !lines[idx].trim().is_empty() {
                    anchor = idx;
                }
            }
            _ => {}
        }
    }

    anchor
}

fn append_tail(out: &mut String, appended: Vec<(Option<String>, String)>) {
    if appended.is_empty() {
        return;
    }

    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }

    let mut last_section: Option<String> = None;
    for (section, entry) in appended {
        if let Some(name) = &section {
            if last_section.as_ref() != Some(name) {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&format!("[{}]\n", name));
                last_section = Some(name.clone());
            }
        }
        out.push_str(&entry);
        out.push('\n');
    }
}

fn line_ending(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}
