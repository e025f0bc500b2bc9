//! File-name policy for listed sample hashes.
//!
//! The hash column doubles as the on-disk name, in the scratch directory and
//! under the storage root, so it must stay a single safe path component.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Linux NAME_MAX.
pub const NAME_MAX: usize = 255;

/// How to treat a hash that is not usable as a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashPolicy {
    /// Skip the row.
    #[default]
    Reject,
    /// Rewrite with [`sanitize_file_name`]; skip only if nothing survives.
    Sanitize,
}

/// Why a listed hash cannot be used as a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsafeName {
    Empty,
    DotEntry,
    Separator,
    ControlChar,
    TooLong(usize),
}

impl fmt::Display for UnsafeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsafeName::Empty => write!(f, "empty file hash"),
            UnsafeName::DotEntry => write!(f, "file hash is a dot entry"),
            UnsafeName::Separator => write!(f, "file hash contains a path separator"),
            UnsafeName::ControlChar => write!(f, "file hash contains a control character"),
            UnsafeName::TooLong(n) => write!(f, "file hash is {} bytes (max {})", n, NAME_MAX),
        }
    }
}

impl std::error::Error for UnsafeName {}

/// Check that `name` is a single safe path component.
pub fn check_file_name(name: &str) -> Result<(), UnsafeName> {
    if name.is_empty() {
        return Err(UnsafeName::Empty);
    }
    if name == "." || name == ".." {
        return Err(UnsafeName::DotEntry);
    }
    if name.contains(['/', '\\']) {
        return Err(UnsafeName::Separator);
    }
    if name.chars().any(|c| c == '\0' || c.is_control()) {
        return Err(UnsafeName::ControlChar);
    }
    if name.len() > NAME_MAX {
        return Err(UnsafeName::TooLong(name.len()));
    }
    Ok(())
}

/// Apply `policy` to a listed hash and return the name to store it under.
pub fn resolve_file_name(policy: HashPolicy, raw: &str) -> Result<String, UnsafeName> {
    match policy {
        HashPolicy::Reject => check_file_name(raw).map(|()| raw.to_string()),
        HashPolicy::Sanitize => {
            let name = sanitize_file_name(raw);
            check_file_name(&name)?;
            Ok(name)
        }
    }
}

/// Linux-safe rewrite of a candidate file name.
///
/// - Replaces NUL, `/`, `\`, whitespace and control characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots and underscores
/// - Truncates to NAME_MAX bytes on a char boundary
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let unsafe_char =
            c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace();
        let c = if unsafe_char { '_' } else { c };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(NAME_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
