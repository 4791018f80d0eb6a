//! Version sources and the development-build stamping rule.
//!
//! The displayed release is the project version, except that a version ending
//! in [`DEV_MARKER`] gets the build date appended, e.g. `1.2.0dev (2024-06-01)`.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::debug;
use regex::Regex;

use crate::error::{ConfigurationError, Result};

/// Suffix identifying a development build.
pub const DEV_MARKER: &str = "dev";

/// Date format of the development stamp.
pub const STAMP_FORMAT: &str = "%Y-%m-%d";

lazy_static::lazy_static! {
    static ref VERSION_ASSIGNMENT: Regex =
        Regex::new(r#"(?m)^__version__\s*(?::\s*str\s*)?=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("version assignment regex is valid");
}

/// Returns true when `version` denotes a development build.
pub fn is_development(version: &str) -> bool {
    version.ends_with(DEV_MARKER)
}

/// Applies the stamping rule to a raw version string.
pub fn stamp_release(version: &str, date: NaiveDate) -> String {
    if is_development(version) {
        with_date_stamp(version, date)
    } else {
        version.to_string()
    }
}

/// Appends ` (YYYY-MM-DD)` unconditionally.
pub(crate) fn with_date_stamp(version: &str, date: NaiveDate) -> String {
    format!("{} ({})", version, date.format(STAMP_FORMAT))
}

/// Where the project version comes from.
pub trait VersionSource: fmt::Debug {
    /// Reads the raw version string.
    fn read_version(&self) -> Result<String>;

    /// Human-readable origin, used in log output.
    fn describe(&self) -> String;
}

/// A version given directly.
#[derive(Debug, Clone)]
pub struct LiteralVersion(pub String);

impl VersionSource for LiteralVersion {
    fn read_version(&self) -> Result<String> {
        let version = self.0.trim();
        if version.is_empty() {
            return Err(ConfigurationError::malformed("<literal>", "empty version"));
        }
        Ok(version.to_string())
    }

    fn describe(&self) -> String {
        format!("literal '{}'", self.0)
    }
}

/// A Python module declaring `__version__ = "..."`.
#[derive(Debug, Clone)]
pub struct ModuleVersion {
    path: PathBuf,
}

impl ModuleVersion {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VersionSource for ModuleVersion {
    fn read_version(&self) -> Result<String> {
        let content = read_source(&self.path)?;
        let captures = VERSION_ASSIGNMENT
            .captures(&content)
            .ok_or_else(|| ConfigurationError::malformed(&self.path, "no __version__ assignment"))?;

        let version = captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        if version.is_empty() {
            return Err(ConfigurationError::malformed(&self.path, "empty __version__"));
        }

        debug!("Found __version__ = '{}' in {}", version, self.path.display());
        Ok(version.to_string())
    }

    fn describe(&self) -> String {
        format!("module {}", self.path.display())
    }
}

/// A `pyproject.toml` carrying `[project] version`.
#[derive(Debug, Clone)]
pub struct PyProjectVersion {
    path: PathBuf,
}

impl PyProjectVersion {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VersionSource for PyProjectVersion {
    fn read_version(&self) -> Result<String> {
        let content = read_source(&self.path)?;
        let document: toml::Table = toml::from_str(&content)
            .map_err(|e| ConfigurationError::malformed(&self.path, e.to_string()))?;

        // PEP 621 first, then the poetry layout
        let version = document
            .get("project")
            .and_then(|project| project.get("version"))
            .or_else(|| {
                document
                    .get("tool")
                    .and_then(|tool| tool.get("poetry"))
                    .and_then(|poetry| poetry.get("version"))
            })
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigurationError::malformed(&self.path, "no [project] version"))?;

        Ok(version.to_string())
    }

    fn describe(&self) -> String {
        format!("pyproject {}", self.path.display())
    }
}

fn read_source(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ConfigurationError::VersionSourceMissing {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    })
}
