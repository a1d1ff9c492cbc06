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

//! src/core/parser.rs
//!
//! Keybind line parser
//!
//! This module parses keybind files to extract bind and unbind directives.
//! It handles:
//! - `bind` with any combination of flag letters, and `unbind`
//! - Variable definitions (`$mainMod = SUPER`)
//! - Comments and whitespace
//! - Line numbers so edits can be traced back to their origin
//!
//! # Architecture
//! The parser uses nom combinators for the keyword and the modifier/key
//! prefix. Everything after the key is kept verbatim. Malformed lines are
//! skipped (and logged), never fatal: the file on disk belongs to the user
//! and may contain syntax this editor does not understand.

use log::debug;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while},
    character::complete::{alpha0, char, space0},
    combinator::{map, opt, rest as remainder},
    sequence::preceded,
    IResult, Parser,
};
use std::collections::HashMap;
use thiserror::Error;

use crate::core::types::{BindKeyword, BindLine, BIND_FLAGS};

/// Parse errors for a single line
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Expected 'bind<flags> = MODS, KEY, ...' or 'unbind = MODS, KEY'")]
    InvalidSyntax,

    #[error("Unknown bind flag '{0}'")]
    UnknownFlag(char),

    #[error("Missing key after the modifiers")]
    MissingKey,

    #[error("Missing dispatcher after the key")]
    MissingDispatcher,
}

/// A directive together with where it was found
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedLine {
    /// 1-based line number
    pub line_number: usize,
    pub bind: BindLine,
}

/// Parse every bind/unbind directive in a file
///
/// Comments, blank lines and any other directives are ignored. Lines that
/// look like binds but fail to parse are skipped.
pub fn parse_binds(content: &str) -> Vec<ParsedLine> {
    let mut parsed = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if !trimmed.starts_with("bind") && !trimmed.starts_with("unbind") {
            continue;
        }

        match parse_bind_line(trimmed) {
            Ok(bind) => parsed.push(ParsedLine { line_number, bind }),
            Err(e) => debug!("skipping line {}: {} ({})", line_number, trimmed, e),
        }
    }

    parsed
}

/// Parse a single directive
///
/// Format: `bind<flags> = MODS, KEY[, FIELDS...]` or `unbind = MODS, KEY`
///
/// A bind needs at least a dispatcher after the key; an unbind needs only
/// the modifier/key pair.
pub fn parse_bind_line(input: &str) -> Result<BindLine, ParseError> {
    let (_, (keyword, mods, key, rest)) =
        directive(input.trim()).map_err(|_| ParseError::InvalidSyntax)?;

    if let BindKeyword::Bind { flags } = &keyword {
        if let Some(bad) = flags.chars().find(|c| !BIND_FLAGS.contains(*c)) {
            return Err(ParseError::UnknownFlag(bad));
        }
    }

    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::MissingKey);
    }

    let rest = rest.map(str::trim).filter(|r| !r.is_empty());
    if keyword != BindKeyword::Unbind && rest.is_none() {
        return Err(ParseError::MissingDispatcher);
    }

    Ok(BindLine {
        keyword,
        mods: mods.trim().to_string(),
        key: key.to_string(),
        rest: rest.map(str::to_string),
    })
}

type Directive<'a> = (BindKeyword, &'a str, &'a str, Option<&'a str>);

fn directive(input: &str) -> IResult<&str, Directive<'_>> {
    let (input, keyword) = parse_keyword(input)?;
    let (input, _) = (space0, char('='), space0).parse(input)?;
    let (input, mods) = take_until(",").parse(input)?;
    let (input, _) = char(',').parse(input)?;
    let (input, key) = take_while(|c: char| c != ',').parse(input)?;
    let (input, rest) = opt(preceded(char(','), remainder)).parse(input)?;

    Ok((input, (keyword, mods, key, rest)))
}

/// Parse `unbind` or `bind` followed by its flag letters
///
/// `unbind` is tried first; `bind` then swallows any trailing letters as
/// flags, which are validated by the caller.
pub fn parse_keyword(input: &str) -> IResult<&str, BindKeyword> {
    alt((
        map(tag("unbind"), |_| BindKeyword::Unbind),
        map(preceded(tag("bind"), alpha0), |flags: &str| BindKeyword::Bind {
            flags: flags.to_string(),
        }),
    ))
    .parse(input)
}

/// Apply the description-flag heuristics
///
/// - Five or more fields means a description is present: add `d`.
/// - Exactly four fields with `d` set (and no mouse flag) means the flag is
///   spurious: strip it.
///
/// Unbind directives are returned unchanged.
pub fn autocorrect(mut line: BindLine) -> BindLine {
    let count = line.field_count();

    if let BindKeyword::Bind { flags } = &mut line.keyword {
        if count >= 5 && !flags.contains('d') {
            flags.push('d');
        } else if count == 4 && flags.contains('d') && !flags.contains('m') {
            flags.retain(|c| c != 'd');
        }
    }

    line
}

/// Collect variable definitions from a file
///
/// Hyprland configs use variables like:
/// ```text
/// $mainMod = SUPER
/// $terminal = kitty
/// ```
///
/// Returns a HashMap mapping variable names (without `$`) to their values.
pub fn collect_variables(contents: &str) -> HashMap<String, String> {
    let mut variables = HashMap::new();

    for line in contents.lines() {
        let line_trimmed = line.trim();

        // Variable definition format: $name = value
        if let Some(definition) = line_trimmed.strip_prefix('$') {
            if let Some(equals_pos) = definition.find('=') {
                let var_name = definition[..equals_pos].trim().to_string();
                let var_value = definition[equals_pos + 1..].trim().to_string();
                variables.insert(var_name, var_value);
            }
        }
    }

    variables
}
