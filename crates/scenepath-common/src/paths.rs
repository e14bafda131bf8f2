//! Path tokenizer.
//!
//! Turns a raw file path into the two token sequences rules are matched
//! against: the full path split on separators, and the same path with the
//! configured library root removed. Both `/` and `\` separate tokens no
//! matter which platform produced the path.

use crate::{Error, Result};

/// Token sequences derived from a single file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTokens {
    /// Extension-stripped path split from the filesystem root.
    pub full: Vec<String>,
    /// Tokens below the matched library root (equal to `full` if no root matched).
    pub library: Vec<String>,
    /// Extension-stripped path below the library root, unsplit.
    pub library_path: String,
    /// The root that was stripped, if any.
    pub root: Option<String>,
}

/// Check whether a character separates path tokens.
pub fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Remove the extension of the final path component.
///
/// Everything from the last `.` of the file name onwards is dropped. Dots in
/// directory names are left alone.
///
/// # Examples
///
/// ```
/// use scenepath_common::paths::strip_extension;
///
/// assert_eq!(strip_extension("/a/b.c/movie.part1.mkv"), "/a/b.c/movie.part1");
/// assert_eq!(strip_extension("/a/b.c/movie"), "/a/b.c/movie");
/// ```
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind(is_separator).map(|i| i + 1).unwrap_or(0);
    match path[name_start..].rfind('.') {
        Some(dot) => &path[..name_start + dot],
        None => path,
    }
}

/// Split a path into tokens on either separator.
///
/// Absolute POSIX paths produce a leading empty token, so `/a/b` becomes
/// `["", "a", "b"]`.
pub fn split_tokens(path: &str) -> Vec<String> {
    path.split(is_separator).map(str::to_string).collect()
}

/// Find the library root that `path` lives under.
///
/// A root matches when it is a prefix of the path followed by a separator,
/// so a path equal to the root itself never matches. When several roots
/// match, the longest one wins.
pub fn match_root<'a>(path: &str, roots: &'a [String]) -> Option<&'a str> {
    roots
        .iter()
        .map(String::as_str)
        .filter(|root| !root.is_empty() && is_root_of(root, path))
        .max_by_key(|root| root.len())
}

fn is_root_of(root: &str, path: &str) -> bool {
    if !path.starts_with(root) {
        return false;
    }
    if root.ends_with(is_separator) {
        return true;
    }
    path[root.len()..].starts_with(is_separator)
}

/// Tokenize a raw file path against the configured library roots.
///
/// Fails when no roots are configured, since library-relative matching is
/// meaningless without them.
///
/// # Examples
///
/// ```
/// use scenepath_common::paths::tokenize;
///
/// let roots = vec!["/lib".to_string()];
/// let tokens = tokenize("/lib/StudioA/Title (2020)/Scene.mp4", &roots).unwrap();
/// assert_eq!(tokens.full, vec!["", "lib", "StudioA", "Title (2020)", "Scene"]);
/// assert_eq!(tokens.library, vec!["StudioA", "Title (2020)", "Scene"]);
/// ```
pub fn tokenize(path: &str, roots: &[String]) -> Result<PathTokens> {
    if roots.is_empty() {
        return Err(Error::config("Unable to get library paths"));
    }

    let stripped = strip_extension(path);
    let full = split_tokens(stripped);

    // Roots are matched before the extension goes: `/lib.mp4` is not under `/lib`
    let root = match_root(path, roots);
    let (library, library_path) = match root {
        Some(root) => {
            let rest = stripped
                .get(root.len()..)
                .unwrap_or_default()
                .trim_start_matches(is_separator);
            (split_tokens(rest), rest.to_string())
        }
        None => (full.clone(), stripped.to_string()),
    };

    Ok(PathTokens {
        full,
        library,
        library_path,
        root: root.map(str::to_string),
    })
}
