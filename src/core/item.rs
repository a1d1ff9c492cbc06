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

//! src/core/item.rs
//!
//! Editable rows and the tabs that group them
//!
//! Every application is described by a static schema of `Tab`s holding
//! `Item`s. An item knows its `ValueKind` (with the constraint payload for
//! that kind), its current value and, optionally, a default and the config
//! key it is persisted under.

use std::fmt;

/// Direction of an adjust action
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    Backward,
    Forward,
}

/// The kind of value an item holds, with its constraints
#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    /// yes/no toggle
    Boolean,
    /// Integer clamped to `[min, max]`
    IntRange { min: i64, max: i64 },
    /// One of a fixed list of options, cycled modulo its length.
    /// Options listed in `destructive` are rendered as warnings.
    Cycle {
        options: &'static [&'static str],
        destructive: &'static [&'static str],
    },
    /// Free-form text, edited as a whole line
    Line,
}

/// A concrete value
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    /// Index into the item's `Cycle` options
    Choice(usize),
    Text(String),
}

/// One editable row
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    /// Display label
    pub label: String,
    pub kind: ValueKind,
    /// `None` when the backing file does not set the key
    pub value: Option<Value>,
    pub default: Option<Value>,
    /// Config key the value is stored under
    pub key: Option<String>,
    /// Highlight marker (e.g. the theme currently in use)
    pub marked: bool,
}

impl Item {
    pub fn new(label: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            label: label.into(),
            kind,
            value: None,
            default: None,
            key: None,
            marked: false,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Value shown and adjusted from: the current one, else the default
    pub fn effective(&self) -> Option<&Value> {
        self.value.as_ref().or(self.default.as_ref())
    }

    /// Move the value one step
    ///
    /// - Booleans toggle (either direction)
    /// - Integers move by one, clamped to `[min, max]`
    /// - Cycles wrap around modulo the option count
    /// - Lines cannot be adjusted
    ///
    /// Unset items start from their default, or from the first/lowest
    /// value. Returns `true` when the stored value changed.
    pub fn adjust(&mut self, step: Step) -> bool {
        let next = match (&self.kind, self.effective()) {
            (ValueKind::Boolean, Some(Value::Bool(b))) => Value::Bool(!b),
            (ValueKind::Boolean, _) => Value::Bool(true),

            (ValueKind::IntRange { min, max }, current) => {
                let base = match current {
                    Some(Value::Int(n)) => *n,
                    _ => *min,
                };
                let moved = match step {
                    Step::Forward => base.saturating_add(1),
                    Step::Backward => base.saturating_sub(1),
                };
                Value::Int(moved.clamp(*min, (*max).max(*min)))
            }

            (ValueKind::Cycle { options, .. }, _) if options.is_empty() => return false,
            (ValueKind::Cycle { options, .. }, Some(Value::Choice(idx))) => {
                Value::Choice(cycle_index(*idx, options.len(), step))
            }
            (ValueKind::Cycle { .. }, _) => Value::Choice(0),

            (ValueKind::Line, _) => return false,
        };

        if self.value.as_ref() == Some(&next) {
            return false;
        }

        self.value = Some(next);
        true
    }

    /// Restore the declared default
    ///
    /// Returns `true` if the value changed. Items without a default, whose
    /// value already equals it, or that are unset (and so already shown
    /// and applied as the default) are left alone.
    pub fn reset(&mut self) -> bool {
        let Some(current) = &self.value else {
            return false;
        };

        match &self.default {
            Some(default) if current != default => {
                self.value = Some(default.clone());
                true
            }
            _ => false,
        }
    }

    /// Literal string written to the config file
    pub fn literal(&self) -> Option<String> {
        self.value.as_ref().map(|v| self.render_value(v))
    }

    /// Format a value of this item's kind as its on-disk literal
    pub fn render_value(&self, value: &Value) -> String {
        match (value, &self.kind) {
            (Value::Bool(true), _) => "yes".to_string(),
            (Value::Bool(false), _) => "no".to_string(),
            (Value::Int(n), _) => n.to_string(),
            (Value::Choice(idx), ValueKind::Cycle { options, .. }) => {
                options.get(*idx).map(|s| s.to_string()).unwrap_or_default()
            }
            (Value::Choice(idx), _) => idx.to_string(),
            (Value::Text(s), _) => s.clone(),
        }
    }

    /// Parse an on-disk literal according to this item's kind
    ///
    /// - Booleans accept `yes/no`, `true/false`, `on/off`, `1/0`
    /// - Integers are parsed base-10 (leading zeros are plain decimal);
    ///   anything non-numeric resets to the minimum
    /// - Cycle literals not among the options yield `None`
    pub fn parse_literal(&self, literal: &str) -> Option<Value> {
        let literal = literal.trim();
        match &self.kind {
            ValueKind::Boolean => match literal.to_ascii_lowercase().as_str() {
                "yes" | "true" | "on" | "1" => Some(Value::Bool(true)),
                "no" | "false" | "off" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            ValueKind::IntRange { min, max } => {
                let n = parse_decimal(literal).unwrap_or(*min);
                Some(Value::Int(n.clamp(*min, (*max).max(*min))))
            }
            ValueKind::Cycle { options, .. } => options
                .iter()
                .position(|o| o.eq_ignore_ascii_case(literal))
                .map(Value::Choice),
            ValueKind::Line => Some(Value::Text(literal.to_string())),
        }
    }

    /// Whether the current value is one of the kind's destructive options
    pub fn is_destructive(&self) -> bool {
        match (&self.kind, &self.value) {
            (ValueKind::Cycle { options, destructive }, Some(Value::Choice(idx))) => options
                .get(*idx)
                .map(|o| destructive.contains(o))
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// Advance or retreat an index modulo `len`
///
/// Total on `0..len`: advancing `len` times returns to the start, and a
/// forward step followed by a backward step cancels out.
pub fn cycle_index(idx: usize, len: usize, step: Step) -> usize {
    if len == 0 {
        return 0;
    }
    let idx = idx % len;
    match step {
        Step::Forward => (idx + 1) % len,
        Step::Backward => (idx + len - 1) % len,
    }
}

/// Strict base-10 integer parser
///
/// Accepts an optional sign followed by ASCII digits only. No radix
/// prefixes, no whitespace, no unit suffixes.
pub fn parse_decimal(input: &str) -> Option<i64> {
    let (negative, digits) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut value: i64 = 0;
    for b in digits.bytes() {
        value = value.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
    }

    Some(if negative { -value } else { value })
}

/// An ordered group of items shown together
#[derive(Clone, Debug, PartialEq)]
pub struct Tab {
    pub name: String,
    pub items: Vec<Item>,
}

impl Tab {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Append an item; registration order is display order
    pub fn push(&mut self, item: Item) -> &mut Self {
        self.items.push(item);
        self
    }

    /// Reset every item to its default; returns how many changed
    pub fn reset_all(&mut self) -> usize {
        self.items.iter_mut().map(Item::reset).filter(|changed| *changed).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
