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

//! src/core/types.rs
//!
//! Core type definitions for keybind lines
//!
//! This module defines the types the keybind editor works with:
//! - `BindKeyword`: `bind<flags>` or `unbind`
//! - `BindLine`: One directive with its raw modifier, key and trailing fields
//! - `KeyCombo`: Normalised (modifier-set, key) pair used for comparisons
//! - `UnbindTarget`: The exact raw (modifiers, key) pair an unbind removes
//!
//! Raw fields are kept exactly as the user wrote them so that generated
//! unbind directives match the original line character for character.
//! Comparisons always go through `KeyCombo`.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Flag letters accepted after the `bind` keyword
///
/// - `d`: has description
/// - `l`: works while locked
/// - `e`: repeats while held
/// - `o`: long press
/// - `m`: mouse
/// - `r`: on release
/// - `n`: non-consuming
/// - `t`: transparent
/// - `i`: ignore modifiers
pub const BIND_FLAGS: &str = "dleomrnti";

/// The keyword on the left of `=`
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BindKeyword {
    /// `bind` followed by zero or more flag letters
    Bind { flags: String },
    /// `unbind`
    Unbind,
}

impl BindKeyword {
    pub fn has_flag(&self, flag: char) -> bool {
        match self {
            BindKeyword::Bind { flags } => flags.contains(flag),
            BindKeyword::Unbind => false,
        }
    }
}

impl fmt::Display for BindKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindKeyword::Bind { flags } => write!(f, "bind{}", flags),
            BindKeyword::Unbind => write!(f, "unbind"),
        }
    }
}

/// One keybind directive
///
/// Represents a line like:
/// ```text
/// bindd = SUPER, Q, Close window, killactive,
/// ```
///
/// `mods` and `key` are stored raw (trimmed only). `rest` holds everything
/// after the key's comma, untouched, because dispatcher arguments may
/// contain commas of their own.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BindLine {
    pub keyword: BindKeyword,
    pub mods: String,
    pub key: String,
    pub rest: Option<String>,
}

impl BindLine {
    /// Number of comma-separated fields on the right of `=`
    ///
    /// Counted naively, the way Hyprland's own flag heuristics count them.
    pub fn field_count(&self) -> usize {
        2 + self
            .rest
            .as_ref()
            .map(|r| r.split(',').count())
            .unwrap_or(0)
    }

    /// Fields after the key, trimmed
    pub fn rest_fields(&self) -> Vec<&str> {
        self.rest
            .as_deref()
            .map(|r| r.split(',').map(str::trim).collect())
            .unwrap_or_default()
    }

    /// Human readable description of what the bind does
    ///
    /// With the `d` flag the first trailing field is the description;
    /// otherwise the dispatcher and its argument are shown.
    pub fn summary(&self) -> String {
        let fields = self.rest_fields();
        if self.keyword.has_flag('d') && fields.len() >= 2 {
            return fields[0].to_string();
        }
        fields
            .iter()
            .filter(|f| !f.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The raw (mods, key) pair this line occupies
    pub fn target(&self) -> UnbindTarget {
        UnbindTarget {
            mods: self.mods.clone(),
            key: self.key.clone(),
        }
    }

    pub fn is_unbind(&self) -> bool {
        self.keyword == BindKeyword::Unbind
    }
}

impl fmt::Display for BindLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}, {}", self.keyword, self.mods, self.key)?;

        if let Some(rest) = &self.rest {
            write!(f, ", {}", rest)?;
        }

        Ok(())
    }
}

/// The exact raw modifier/key pair of an existing line
///
/// Used to synthesise `unbind = MODS, KEY` directives. Equality is raw:
/// two targets are the same only if both fields match after trimming.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UnbindTarget {
    pub mods: String,
    pub key: String,
}

impl UnbindTarget {
    pub fn new(mods: &str, key: &str) -> Self {
        Self {
            mods: mods.trim().to_string(),
            key: key.trim().to_string(),
        }
    }
}

impl fmt::Display for UnbindTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unbind = {}, {}", self.mods, self.key)
    }
}

/// A normalised modifier set plus key
///
/// Implements Hash and Eq so that equivalent notations compare equal:
/// `$mainMod SHIFT, Q`, `SHIFT_SUPER, q` and `super+shift, Q` all produce
/// the same combo when `$mainMod = SUPER`.
///
/// # Normalisation
/// - Modifier tokens split on whitespace, `_` and `+`
/// - Everything lower-cased
/// - `$mainMod` (any case) resolved through the variable table,
///   defaulting to `super`
/// - Aliases mapped to a canonical name (`win`/`mod4`/`logo` → `super`,
///   `control` → `ctrl`, `mod1` → `alt`)
/// - Modifiers sorted and de-duplicated
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct KeyCombo {
    pub modifiers: Vec<String>,
    pub key: String,
}

impl KeyCombo {
    pub fn new(mods: &str, key: &str, variables: &HashMap<String, String>) -> Self {
        let mut set = BTreeSet::new();

        // A `$name` is looked up whole before `_` splitting, so `$main_mod`
        // stays one variable while `$mainMod_SHIFT` still splits
        for token in split_tokens(mods) {
            let expanded = lookup_variable(token, variables).unwrap_or_else(|| {
                split_modifiers(token)
                    .into_iter()
                    .map(|part| lookup_variable(&part, variables).unwrap_or(part))
                    .collect::<Vec<_>>()
                    .join(" ")
            });
            for inner in split_modifiers(&expanded) {
                set.insert(canonical_modifier(&inner));
            }
        }

        Self {
            modifiers: set.into_iter().collect(),
            key: key.trim().to_lowercase(),
        }
    }

    pub fn from_line(line: &BindLine, variables: &HashMap<String, String>) -> Self {
        Self::new(&line.mods, &line.key, variables)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key.to_uppercase())
        } else {
            let mods = self
                .modifiers
                .iter()
                .map(|m| m.to_uppercase())
                .collect::<Vec<_>>()
                .join("+");
            write!(f, "{}+{}", mods, self.key.to_uppercase())
        }
    }
}

fn split_tokens(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|c: char| c.is_whitespace() || c == '+')
        .filter(|s| !s.is_empty())
}

fn split_modifiers(input: &str) -> Vec<String> {
    input
        .split(|c: char| c.is_whitespace() || c == '_' || c == '+')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn lookup_variable(token: &str, variables: &HashMap<String, String>) -> Option<String> {
    let name = token.strip_prefix('$')?;

    variables
        .iter()
        .find(|(var, _)| var.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.clone())
        .or_else(|| name.eq_ignore_ascii_case("mainmod").then(|| "SUPER".to_string()))
}

fn canonical_modifier(token: &str) -> String {
    let lower = token.to_lowercase();
    match lower.as_str() {
        "win" | "mod4" | "logo" | "meta" => "super".to_string(),
        "control" => "ctrl".to_string(),
        "mod1" => "alt".to_string(),
        _ => lower,
    }
}
