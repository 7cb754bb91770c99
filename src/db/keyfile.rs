//! Minimal reader and writer for the `[group]` / `key=value` text format used
//! by profile files.
//!
//! Rules:
//! - Blank lines and lines starting with `#` are comments.
//! - `[name]` opens a group; a repeated group name continues the earlier one.
//! - `key=value` entries must appear inside a group. Spaces and tabs around the
//!   key and before the value are dropped; other whitespace is kept. A repeated
//!   key replaces the earlier value.
//! - Values may contain the escapes `\s`, `\n`, `\t`, `\r` and `\\`.

use std::fmt::Write as _;

use thiserror::Error;

/// Separator whitespace; anything else is part of a key or value.
const BLANK: [char; 2] = [' ', '\t'];

/// Syntax errors, reported with the 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyFileError {
    #[error("line {line}: malformed group header")]
    BadGroup { line: usize },

    #[error("line {line}: entry outside of any group")]
    EntryOutsideGroup { line: usize },

    #[error("line {line}: expected key=value")]
    BadEntry { line: usize },

    #[error("line {line}: invalid escape sequence")]
    BadEscape { line: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Group {
    name: String,
    entries: Vec<(String, String)>,
}

/// An ordered set of groups, each an ordered list of unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFile {
    comment: Option<String>,
    groups: Vec<Group>,
}

impl KeyFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a document.
    pub fn parse(text: &str) -> Result<Self, KeyFileError> {
        let mut doc = Self::new();
        let mut current: Option<usize> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim_end_matches('\r');
            let trimmed = line.trim_start_matches(BLANK);

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let name = rest
                    .trim_end()
                    .strip_suffix(']')
                    .filter(|n| !n.is_empty() && !n.contains(['[', ']']))
                    .ok_or(KeyFileError::BadGroup { line: line_no })?;
                current = Some(doc.group_index_or_insert(name));
                continue;
            }

            let group = current.ok_or(KeyFileError::EntryOutsideGroup { line: line_no })?;
            let (key, value) = trimmed
                .split_once('=')
                .ok_or(KeyFileError::BadEntry { line: line_no })?;
            let key = key.trim_end_matches(BLANK);
            if key.is_empty() {
                return Err(KeyFileError::BadEntry { line: line_no });
            }
            let value =
                unescape(value.trim_start_matches(BLANK)).ok_or(KeyFileError::BadEscape { line: line_no })?;
            doc.groups[group].set(key, value);
        }

        Ok(doc)
    }

    /// Sets the comment written at the top of the document.
    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = Some(comment.into());
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g.name == group)
    }

    /// Group names in document order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn get(&self, group: &str, key: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.name == group)?
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, group: &str, key: &str, value: impl Into<String>) {
        let idx = self.group_index_or_insert(group);
        self.groups[idx].set(key, value.into());
    }

    /// Ensures `group` exists even when it has no entries.
    pub fn add_group(&mut self, group: &str) {
        self.group_index_or_insert(group);
    }

    /// Renders the document; groups are separated by a blank line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if let Some(comment) = &self.comment {
            for line in comment.lines() {
                let _ = writeln!(out, "# {line}");
            }
        }
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(out, "[{}]", group.name);
            for (key, value) in &group.entries {
                let _ = writeln!(out, "{key}={}", escape(value));
            }
        }
        out
    }

    fn group_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(idx) = self.groups.iter().position(|g| g.name == name) {
            return idx;
        }
        self.groups.push(Group {
            name: name.to_string(),
            entries: Vec::new(),
        });
        self.groups.len() - 1
    }
}

impl Group {
    fn set(&mut self, key: &str, value: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }
}

fn unescape(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            's' => out.push(' '),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '\\' => out.push('\\'),
            _ => return None,
        }
    }
    Some(out)
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut leading = true;
    for c in value.chars() {
        match c {
            ' ' if leading => out.push_str("\\s"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(c),
        }
        if c != ' ' {
            leading = false;
        }
    }
    out
}
