//! Loader settings: which version source to read and what to layer on top.
//!
//! Settings are resolved from built-in defaults, then an optional TOML file
//! (`docs-conf.toml` under the base directory by default), then `DOCS_CONF__*`
//! environment variables, e.g. `DOCS_CONF__VERSION_SOURCE__KIND=pyproject`.
//! List overrides take comma-separated values:
//! `DOCS_CONF__OVERRIDES__EXTRA_EXTENSIONS=sphinx.ext.mathjax,sphinx.ext.todo`.

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat, Map};
use log::debug;
use serde::Deserialize;

use crate::config::ConfigOverrides;
use crate::error::{ConfigurationError, Result};
use crate::version::{LiteralVersion, ModuleVersion, PyProjectVersion, VersionSource};

pub const DEFAULT_SETTINGS_FILE: &str = "docs-conf.toml";
pub const DEFAULT_VERSION_MODULE: &str = "python/__init__.py";
pub const ENV_PREFIX: &str = "DOCS_CONF";

const ENV_SEPARATOR: &str = "__";
const LIST_SEPARATOR: &str = ",";

/// Settings keys whose environment values are comma-separated lists.
const LIST_KEYS: &[&str] = &[
    "overrides.extra_extensions",
    "overrides.extra_mock_imports",
    "overrides.extra_suppress_warnings",
];

/// Kind of version source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionSourceKind {
    Literal,
    Module,
    Pyproject,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionSourceSettings {
    pub kind: VersionSourceKind,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub value: Option<String>,
}

impl VersionSourceSettings {
    /// Source for an explicit version file: `.toml` is read as a pyproject,
    /// anything else as a Python module.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => VersionSourceKind::Pyproject,
            _ => VersionSourceKind::Module,
        };
        Self {
            kind,
            path: Some(path),
            value: None,
        }
    }

    /// Builds the configured source, resolving relative paths against `base_dir`.
    pub fn build(&self, base_dir: &Path) -> Result<Box<dyn VersionSource>> {
        let resolve = |default: &str| {
            let path = self
                .path
                .clone()
                .unwrap_or_else(|| PathBuf::from(default));
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        };

        let source: Box<dyn VersionSource> = match self.kind {
            VersionSourceKind::Literal => {
                let value = self.value.clone().ok_or_else(|| {
                    ConfigurationError::Settings(ConfigError::Message(
                        "version_source.value is required for kind = \"literal\"".to_string(),
                    ))
                })?;
                Box::new(LiteralVersion(value))
            }
            VersionSourceKind::Module => Box::new(ModuleVersion::new(resolve(DEFAULT_VERSION_MODULE))),
            VersionSourceKind::Pyproject => Box::new(PyProjectVersion::new(resolve("pyproject.toml"))),
        };
        Ok(source)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoaderSettings {
    pub version_source: VersionSourceSettings,
    #[serde(default)]
    pub overrides: ConfigOverrides,
}

impl LoaderSettings {
    /// Resolves settings from defaults, `path` (if it exists) and the process
    /// environment. Without `path`, `docs-conf.toml` under `base_dir` is used.
    pub fn load(path: Option<&Path>, base_dir: &Path) -> Result<Self> {
        Self::load_with_env(path, base_dir, std::env::vars())
    }

    /// Like [`LoaderSettings::load`], reading variables from `vars`.
    pub fn load_with_env<I>(path: Option<&Path>, base_dir: &Path, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| base_dir.join(DEFAULT_SETTINGS_FILE));
        debug!("Loading loader settings from {}", path.display());

        // Lists are split on commas; scalars stay verbatim so "1.0" is not read as a float
        let prefix = format!("{}{}", ENV_PREFIX, ENV_SEPARATOR);
        let (lists, scalars): (Map<String, String>, Map<String, String>) = vars
            .into_iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .partition(|(name, _)| LIST_KEYS.contains(&settings_key(&name[prefix.len()..]).as_str()));

        let list_env = LIST_KEYS.iter().fold(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .list_separator(LIST_SEPARATOR),
            |env, key| env.with_list_parse_key(key),
        );

        let settings = Config::builder()
            .set_default("version_source.kind", "module")?
            .add_source(File::from(path.as_path()).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .source(Some(scalars)),
            )
            .add_source(list_env.source(Some(lists)))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// `OVERRIDES__EXTRA_EXTENSIONS` -> `overrides.extra_extensions`
fn settings_key(env_suffix: &str) -> String {
    env_suffix.to_lowercase().replace(ENV_SEPARATOR, ".")
}
