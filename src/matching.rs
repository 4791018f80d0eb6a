//! Glob matching for `exclude_patterns`.
//!
//! Patterns follow the generator's rules: `**` spans directories, `*` and `?`
//! stay within one path segment, `[seq]` / `[!seq]` are character classes.
//! A pattern that names a directory excludes everything beneath it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use log::debug;
use regex::Regex;
use walkdir::WalkDir;

use crate::config::BuildConfig;
use crate::error::ConfigurationError;

lazy_static::lazy_static! {
    static ref PATTERN_CACHE: Mutex<HashMap<String, Regex>> = Mutex::new(HashMap::new());
}

/// Translates a glob pattern into an anchored regex.
pub fn translate_pattern(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    out.push_str("(?:[^/]+/)*");
                    i += 3;
                } else {
                    out.push_str(".*");
                    i += 2;
                }
            }
            '*' => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                out.push_str("[^/]");
                i += 1;
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push('[');
                    let mut k = i + 1;
                    if matches!(chars[k], '!' | '^') {
                        out.push('^');
                        k += 1;
                    }
                    push_class_body(&mut out, &chars[k..end]);
                    out.push(']');
                    i = end + 1;
                }
                None => {
                    out.push_str("\\[");
                    i += 1;
                }
            },
            c => {
                out.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }

    out.push('$');
    out
}

/// Copies a glob class body into a regex class, escaping the characters the
/// regex crate would read as nested classes or set operators (`&&`, `~~`, `--`).
fn push_class_body(out: &mut String, body: &[char]) {
    for (idx, &c) in body.iter().enumerate() {
        let doubled_dash = c == '-'
            && (body.get(idx + 1) == Some(&'-') || (idx > 0 && body[idx - 1] == '-'));
        if matches!(c, '\\' | '[' | '&' | '~' | '^') || doubled_dash {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Index of the `]` closing the class opened at `start`, if any.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start + 1;
    if matches!(chars.get(j), Some('!' | '^')) {
        j += 1;
    }
    // a leading ] is part of the class
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

/// Compiles a pattern, reusing earlier compilations.
pub fn compile_pattern(pattern: &str) -> Result<Regex, ConfigurationError> {
    let mut cache = PATTERN_CACHE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(regex) = cache.get(pattern) {
        return Ok(regex.clone());
    }

    let regex = Regex::new(&translate_pattern(pattern)).map_err(|source| {
        ConfigurationError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    })?;
    cache.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

pub fn pattern_match(name: &str, pattern: &str) -> Result<bool, ConfigurationError> {
    Ok(compile_pattern(pattern)?.is_match(name))
}

/// Forward-slash form of a relative path.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// True when `path` or one of its parent directories matches a pattern.
pub fn is_excluded(path: &str, patterns: &[Regex]) -> bool {
    let mut candidate = path;
    loop {
        if patterns.iter().any(|regex| regex.is_match(candidate)) {
            return true;
        }
        match candidate.rfind('/') {
            Some(idx) => candidate = &candidate[..idx],
            None => return false,
        }
    }
}

/// Files under `root` that survive the configuration's `exclude_patterns`,
/// relative to `root` and sorted.
pub fn matching_source_files(root: &Path, config: &BuildConfig) -> Result<Vec<PathBuf>> {
    let patterns = config
        .exclude_patterns()
        .iter()
        .map(|p| compile_pattern(p))
        .collect::<Result<Vec<_>, _>>()?;

    let relative = |path: &Path| -> Option<String> {
        path.strip_prefix(root).ok().map(normalize_path)
    };

    let mut files = Vec::new();
    let walker = WalkDir::new(root).min_depth(1).into_iter().filter_entry(|entry| {
        // prune excluded directories without descending
        relative(entry.path()).map_or(true, |rel| !is_excluded(&rel, &patterns))
    });

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_file() {
            if let Ok(rel) = entry.path().strip_prefix(root) {
                files.push(rel.to_path_buf());
            }
        }
    }

    files.sort();
    debug!("{} source files under {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_translate_pattern() {
        assert_eq!(translate_pattern("*.rst"), "^[^/]*\\.rst$");
        assert_eq!(translate_pattern("**"), "^.*$");
        assert_eq!(translate_pattern("**/index.rst"), "^(?:[^/]+/)*index\\.rst$");
        assert_eq!(translate_pattern("[!_]*.rst"), "^[^_][^/]*\\.rst$");
        assert_eq!(translate_pattern("[abc"), "^\\[abc$");
    }

    #[test]
    fn test_pattern_match() {
        assert!(pattern_match("Thumbs.db", "Thumbs.db").unwrap());
        assert!(!pattern_match("ThumbsXdb", "Thumbs.db").unwrap());
        assert!(pattern_match("docs/api/module.rst", "**/api/*.rst").unwrap());
        assert!(!pattern_match("chapter10.rst", "chapter?.rst").unwrap());
    }

    #[test]
    fn test_class_set_operators_are_literal() {
        assert!(pattern_match("&.rst", "[a&&b].rst").unwrap());
        assert!(pattern_match("a.rst", "[a&&b].rst").unwrap());
        assert!(!pattern_match("c.rst", "[a&&b].rst").unwrap());
        assert!(pattern_match("-.rst", "[x--].rst").unwrap());
        assert!(pattern_match("x.rst", "[x--].rst").unwrap());
        assert!(pattern_match("~.rst", "[~~].rst").unwrap());
        assert!(pattern_match("^.rst", "[a^].rst").unwrap());

        // plain ranges still work
        assert!(pattern_match("b.rst", "[a-c].rst").unwrap());
        assert!(!pattern_match("-.rst", "[a-c].rst").unwrap());
        assert_eq!(translate_pattern("[a&&b]"), "^[a\\&\\&b]$");
    }

    #[test]
    fn test_directory_pattern_excludes_children() {
        let patterns = vec![compile_pattern("_build").unwrap()];
        assert!(is_excluded("_build", &patterns));
        assert!(is_excluded("_build/html/index.html", &patterns));
        assert!(!is_excluded("guide/_builder.rst", &patterns));
    }

    #[test]
    fn test_matching_source_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("_build/html")).unwrap();
        fs::create_dir_all(root.join("__pycache__")).unwrap();
        fs::create_dir_all(root.join("api")).unwrap();
        fs::write(root.join("index.rst"), "TileFusion").unwrap();
        fs::write(root.join("api/ops.rst"), "ops").unwrap();
        fs::write(root.join("_build/html/index.html"), "built").unwrap();
        fs::write(root.join("__pycache__/conf.cpython-312.pyc"), "").unwrap();
        fs::write(root.join(".DS_Store"), "").unwrap();

        let files = matching_source_files(root, &BuildConfig::new("1.0.0")).unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("api/ops.rst"), PathBuf::from("index.rst")]
        );
    }
}
