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

//! Theme registry
//!
//! Themes live two levels below the registry root:
//!
//! ```text
//! themes/
//! ├── dark/
//! │   ├── nord/
//! │   │   ├── theme.conf   fragment (required)
//! │   │   └── theme.json   {"name": "Nord"} (optional)
//! │   └── gruvbox/
//! └── light/
//! ```
//!
//! The active theme is whichever fragment the target file `source =`s.

use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use crate::config::{transaction::write_if_changed, ConfigError};

pub const FRAGMENT_FILE: &str = "theme.conf";
pub const METADATA_FILE: &str = "theme.json";

const PREVIEW_PLACEHOLDER: &str = "(preview unavailable)";

fn source_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\s*source\s*=\s*)(\S.*?)\s*$").expect("source line pattern should be valid regex")
    })
}

/// One selectable theme
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThemeEntry {
    /// Display name, from metadata or the directory name
    pub name: String,
    /// First-level directory the theme sits in
    pub group: String,
    pub dir: PathBuf,
    pub fragment: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
struct ThemeMetadata {
    name: Option<String>,
}

/// Scans the registry, sorted by group then directory name
///
/// Directories without a fragment are skipped.
///
/// # Errors
///
/// `ConfigError::ThemeDirNotFound` if `root` is not a directory.
pub fn scan_themes(root: &Path) -> Result<Vec<ThemeEntry>, ConfigError> {
    if !root.is_dir() {
        return Err(ConfigError::ThemeDirNotFound(root.to_path_buf()));
    }

    let mut entries = Vec::new();

    for group_dir in sorted_subdirs(root)? {
        let group = dir_name(&group_dir);

        for theme_dir in sorted_subdirs(&group_dir)? {
            let fragment = theme_dir.join(FRAGMENT_FILE);
            if !fragment.is_file() {
                debug!("skipping {}: no {}", theme_dir.display(), FRAGMENT_FILE);
                continue;
            }

            entries.push(ThemeEntry {
                name: display_name(&theme_dir),
                group: group.clone(),
                dir: theme_dir,
                fragment,
            });
        }
    }

    debug!("found {} themes under {}", entries.len(), root.display());
    Ok(entries)
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Metadata `name`, falling back to the directory name
fn display_name(theme_dir: &Path) -> String {
    let metadata = fs::read_to_string(theme_dir.join(METADATA_FILE))
        .ok()
        .and_then(|raw| match serde_json::from_str::<ThemeMetadata>(&raw) {
            Ok(meta) => Some(meta),
            Err(e) => {
                warn!("ignoring malformed {} in {}: {}", METADATA_FILE, theme_dir.display(), e);
                None
            }
        })
        .unwrap_or_default();

    metadata
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| dir_name(theme_dir))
}

/// Writes `path` with a `~/` prefix when it lives under `home`
pub fn contract_home(path: &Path, home: Option<&Path>) -> String {
    if let Some(rest) = home.and_then(|h| path.strip_prefix(h).ok()) {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

fn expand(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn is_under(path: &Path, root: &Path) -> bool {
    let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    resolved.starts_with(root)
}

/// Index of the first `source =` line pointing into the registry
fn find_source_line(content: &str, root: &Path) -> Option<usize> {
    content.lines().position(|line| {
        source_re()
            .captures(line)
            .is_some_and(|caps| is_under(&expand(&caps[2]), root))
    })
}

/// Rewrites the first registry `source =` line to point at `fragment`
///
/// Every other line passes through unchanged. Without a matching line a new
/// `source =` line is appended.
pub fn replace_source_line(content: &str, root: &Path, fragment: &Path, home: Option<&Path>) -> String {
    let shown = contract_home(fragment, home);

    let Some(target) = find_source_line(content, root) else {
        let mut out = content.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!("source = {}\n", shown));
        return out;
    };

    content
        .split_inclusive('\n')
        .enumerate()
        .map(|(idx, line)| {
            if idx != target {
                return line.to_string();
            }
            let body = line.trim_end_matches(['\n', '\r']);
            let ending = &line[body.len()..];
            match source_re().captures(body) {
                Some(caps) => format!("{}{}{}", &caps[1], shown, ending),
                None => line.to_string(),
            }
        })
        .collect()
}

/// Index into `entries` of the theme `content` currently sources
pub fn current_theme(content: &str, root: &Path, entries: &[ThemeEntry]) -> Option<usize> {
    let line = content.lines().nth(find_source_line(content, root)?)?;
    let caps = source_re().captures(line)?;
    let sourced = fs::canonicalize(expand(&caps[2])).ok()?;

    entries
        .iter()
        .position(|e| fs::canonicalize(&e.fragment).is_ok_and(|f| f == sourced))
}

/// Points `target` at `entry`; returns whether the file changed
pub fn apply_theme(target: &Path, root: &Path, entry: &ThemeEntry) -> Result<bool, ConfigError> {
    let content = fs::read_to_string(target).map_err(|_| ConfigError::NotReadable(target.to_path_buf()))?;
    let home = dirs::home_dir();
    let updated = replace_source_line(&content, root, &entry.fragment, home.as_deref());
    write_if_changed(target, &updated)
}

/// First `max_lines` lines of a fragment
///
/// Unreadable files yield a single placeholder line.
pub fn read_preview(path: &Path, max_lines: usize) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content.lines().take(max_lines).map(str::to_string).collect(),
        Err(e) => {
            warn!("preview of {} unavailable: {}", path.display(), e);
            vec![PREVIEW_PLACEHOLDER.to_string()]
        }
    }
}
