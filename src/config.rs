//! The documentation build configuration record.
//!
//! A [`BuildConfig`] is produced once per build by the loader and handed to
//! the generator, which reads it key by key through [`BuildConfig::get`] or
//! the whole [`BuildConfig::to_mapping`]. It has no mutating API.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys the generator recognizes, in the order they are exposed.
pub const RECOGNIZED_KEYS: &[&str] = &[
    "project",
    "version",
    "release",
    "extensions",
    "templates_path",
    "exclude_patterns",
    "html_theme",
    "html_theme_options",
    "html_static_path",
    "autodoc_mock_imports",
    "autodoc_member_order",
    "autodoc_typehints",
    "suppress_warnings",
    "intersphinx_mapping",
];

pub const DEFAULT_PROJECT: &str = "TileFusion";
pub const DEFAULT_THEME: &str = "sphinx_rtd_theme";

// autodoc must be registered before napoleon
const EXTENSIONS: &[&str] = &[
    "sphinx.ext.autodoc",
    "sphinx.ext.napoleon",
    "sphinx.ext.viewcode",
    "sphinx.ext.intersphinx",
    "sphinx_rtd_theme",
];
const TEMPLATES_PATH: &[&str] = &["_templates"];
const EXCLUDE_PATTERNS: &[&str] = &["_build", "Thumbs.db", ".DS_Store", "__pycache__"];
const HTML_STATIC_PATH: &[&str] = &["_static"];
const MOCK_IMPORTS: &[&str] = &["tilefusion"];
const SUPPRESS_WARNINGS: &[&str] = &["autodoc.import_object"];
const INTERSPHINX: &[(&str, &str)] = &[
    ("python", "https://docs.python.org/3"),
    ("numpy", "https://numpy.org/doc/stable"),
];

/// Order in which autodoc lists members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberOrder {
    Alphabetical,
    Groupwise,
    #[default]
    Bysource,
}

impl fmt::Display for MemberOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberOrder::Alphabetical => write!(f, "alphabetical"),
            MemberOrder::Groupwise => write!(f, "groupwise"),
            MemberOrder::Bysource => write!(f, "bysource"),
        }
    }
}

/// Where autodoc renders type hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypehintsMode {
    Signature,
    #[default]
    Description,
    None,
    Both,
}

impl fmt::Display for TypehintsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypehintsMode::Signature => write!(f, "signature"),
            TypehintsMode::Description => write!(f, "description"),
            TypehintsMode::None => write!(f, "none"),
            TypehintsMode::Both => write!(f, "both"),
        }
    }
}

/// Target of a cross-project reference: base URL and optional local inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntersphinxTarget {
    pub base_url: String,
    pub inventory: Option<String>,
}

impl IntersphinxTarget {
    pub fn remote(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            inventory: None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::String(self.base_url.clone()),
            self.inventory.clone().map_or(Value::Null, Value::String),
        ])
    }
}

/// Additions layered on top of the canonical values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub project: Option<String>,
    pub extra_extensions: Vec<String>,
    pub extra_mock_imports: Vec<String>,
    pub extra_suppress_warnings: Vec<String>,
}

/// All documentation build options.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    project: String,
    version: String,
    release: String,
    extensions: Vec<String>,
    templates_path: Vec<String>,
    exclude_patterns: Vec<String>,
    html_theme: String,
    html_theme_options: IndexMap<String, Value>,
    html_static_path: Vec<String>,
    autodoc_mock_imports: Vec<String>,
    autodoc_member_order: MemberOrder,
    autodoc_typehints: TypehintsMode,
    suppress_warnings: Vec<String>,
    intersphinx_mapping: IndexMap<String, IntersphinxTarget>,
}

impl BuildConfig {
    /// Canonical configuration displaying `release`.
    pub fn new(release: impl Into<String>) -> Self {
        Self::with_overrides(release, &ConfigOverrides::default())
    }

    /// Canonical configuration with overrides applied.
    pub fn with_overrides(release: impl Into<String>, overrides: &ConfigOverrides) -> Self {
        let release = release.into();

        let mut html_theme_options = IndexMap::new();
        html_theme_options.insert("navigation_depth".to_string(), Value::from(4));
        html_theme_options.insert("titles_only".to_string(), Value::Bool(false));

        let intersphinx_mapping = INTERSPHINX
            .iter()
            .map(|(name, url)| (name.to_string(), IntersphinxTarget::remote(*url)))
            .collect();

        Self {
            project: overrides
                .project
                .clone()
                .unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
            version: release.clone(),
            release,
            extensions: unique(EXTENSIONS, &overrides.extra_extensions),
            templates_path: unique(TEMPLATES_PATH, &[]),
            exclude_patterns: unique(EXCLUDE_PATTERNS, &[]),
            html_theme: DEFAULT_THEME.to_string(),
            html_theme_options,
            html_static_path: unique(HTML_STATIC_PATH, &[]),
            autodoc_mock_imports: unique(MOCK_IMPORTS, &overrides.extra_mock_imports),
            autodoc_member_order: MemberOrder::default(),
            autodoc_typehints: TypehintsMode::default(),
            suppress_warnings: unique(SUPPRESS_WARNINGS, &overrides.extra_suppress_warnings),
            intersphinx_mapping,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn templates_path(&self) -> &[String] {
        &self.templates_path
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    pub fn html_theme(&self) -> &str {
        &self.html_theme
    }

    pub fn html_theme_options(&self) -> &IndexMap<String, Value> {
        &self.html_theme_options
    }

    pub fn html_static_path(&self) -> &[String] {
        &self.html_static_path
    }

    pub fn autodoc_mock_imports(&self) -> &[String] {
        &self.autodoc_mock_imports
    }

    pub fn autodoc_member_order(&self) -> MemberOrder {
        self.autodoc_member_order
    }

    pub fn autodoc_typehints(&self) -> TypehintsMode {
        self.autodoc_typehints
    }

    pub fn suppress_warnings(&self) -> &[String] {
        &self.suppress_warnings
    }

    pub fn intersphinx_mapping(&self) -> &IndexMap<String, IntersphinxTarget> {
        &self.intersphinx_mapping
    }

    /// Looks up one recognized key. Unrecognized keys yield `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let value = match key {
            "project" => Value::String(self.project.clone()),
            "version" => Value::String(self.version.clone()),
            "release" => Value::String(self.release.clone()),
            "extensions" => string_list(&self.extensions),
            "templates_path" => string_list(&self.templates_path),
            "exclude_patterns" => string_list(&self.exclude_patterns),
            "html_theme" => Value::String(self.html_theme.clone()),
            "html_theme_options" => Value::Object(
                self.html_theme_options
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
            "html_static_path" => string_list(&self.html_static_path),
            "autodoc_mock_imports" => string_list(&self.autodoc_mock_imports),
            "autodoc_member_order" => Value::String(self.autodoc_member_order.to_string()),
            "autodoc_typehints" => Value::String(self.autodoc_typehints.to_string()),
            "suppress_warnings" => string_list(&self.suppress_warnings),
            "intersphinx_mapping" => Value::Object(
                self.intersphinx_mapping
                    .iter()
                    .map(|(name, target)| (name.clone(), target.to_value()))
                    .collect(),
            ),
            _ => return None,
        };
        Some(value)
    }

    /// The whole configuration as an ordered key/value mapping.
    pub fn to_mapping(&self) -> Map<String, Value> {
        RECOGNIZED_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| (key.to_string(), value)))
            .collect()
    }
}

fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

/// Merges `base` and `extra`, keeping the first occurrence of each entry.
fn unique(base: &[&str], extra: &[String]) -> Vec<String> {
    base.iter()
        .map(|s| s.to_string())
        .chain(extra.iter().cloned())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_values() {
        let config = BuildConfig::new("1.0.0");

        assert_eq!(config.project(), "TileFusion");
        assert_eq!(config.version(), "1.0.0");
        assert_eq!(config.release(), "1.0.0");
        assert_eq!(config.html_theme(), "sphinx_rtd_theme");
        assert_eq!(config.templates_path(), ["_templates"]);
        assert_eq!(
            config.exclude_patterns(),
            ["_build", "Thumbs.db", ".DS_Store", "__pycache__"]
        );
        assert_eq!(config.autodoc_mock_imports(), ["tilefusion"]);
        assert_eq!(config.autodoc_member_order(), MemberOrder::Bysource);
        assert_eq!(config.autodoc_typehints(), TypehintsMode::Description);
        assert_eq!(config.suppress_warnings(), ["autodoc.import_object"]);
    }

    #[test]
    fn test_autodoc_precedes_napoleon() {
        let config = BuildConfig::new("1.0.0");
        let position = |name: &str| config.extensions().iter().position(|e| e == name);
        assert!(position("sphinx.ext.autodoc") < position("sphinx.ext.napoleon"));
    }

    #[test]
    fn test_overrides_are_deduplicated() {
        let overrides = ConfigOverrides {
            project: Some("TileFusion Nightly".into()),
            extra_extensions: vec!["sphinx.ext.viewcode".into(), "sphinx.ext.mathjax".into()],
            extra_mock_imports: vec!["tilefusion".into(), "torch".into()],
            extra_suppress_warnings: vec![],
        };
        let config = BuildConfig::with_overrides("1.0.0", &overrides);

        assert_eq!(config.project(), "TileFusion Nightly");
        assert_eq!(config.extensions().len(), 6);
        assert_eq!(config.extensions().last().unwrap(), "sphinx.ext.mathjax");
        assert_eq!(config.autodoc_mock_imports(), ["tilefusion", "torch"]);
    }

    #[test]
    fn test_mapping_has_exactly_recognized_keys() {
        let mapping = BuildConfig::new("1.0.0").to_mapping();
        let keys: Vec<&str> = mapping.keys().map(String::as_str).collect();
        assert_eq!(keys, RECOGNIZED_KEYS);
    }

    #[test]
    fn test_get_unknown_key() {
        let config = BuildConfig::new("1.0.0");
        assert!(config.get("html_logo").is_none());
        assert_eq!(config.get("autodoc_typehints"), Some(Value::from("description")));
    }

    #[test]
    fn test_intersphinx_targets() {
        let value = BuildConfig::new("1.0.0").get("intersphinx_mapping").unwrap();
        assert_eq!(
            value["python"],
            serde_json::json!(["https://docs.python.org/3", null])
        );
        assert_eq!(
            value["numpy"],
            serde_json::json!(["https://numpy.org/doc/stable", null])
        );
    }

    #[test]
    fn test_theme_options_pass_through() {
        let value = BuildConfig::new("1.0.0").get("html_theme_options").unwrap();
        assert_eq!(value, serde_json::json!({"navigation_depth": 4, "titles_only": false}));
    }
}
