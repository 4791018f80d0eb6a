//! End-to-end loading from on-disk version sources and settings files.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;

use docs_conf::settings::VersionSourceKind;
use docs_conf::{
    emit, ConfigLoader, ConfigurationError, FixedClock, LoaderSettings, ModuleVersion,
    PyProjectVersion,
};

fn june_first() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
}

fn write_package(root: &Path, version: &str) {
    fs::create_dir_all(root.join("python")).unwrap();
    fs::write(
        root.join("python/__init__.py"),
        format!("\"\"\"TileFusion.\"\"\"\n\n__version__ = \"{}\"\n", version),
    )
    .unwrap();
}

#[test]
fn test_development_module_is_stamped() {
    let temp_dir = TempDir::new().unwrap();
    write_package(temp_dir.path(), "1.2.0dev");

    let config = ConfigLoader::new(ModuleVersion::new(temp_dir.path().join("python/__init__.py")))
        .with_clock(june_first())
        .load()
        .unwrap();

    assert_eq!(config.release(), "1.2.0dev (2024-06-01)");
    assert_eq!(config.get("release").unwrap(), "1.2.0dev (2024-06-01)");
}

#[test]
fn test_stable_pyproject_is_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pyproject.toml");
    fs::write(&path, "[project]\nname = \"tilefusion\"\nversion = \"1.2.0\"\n").unwrap();

    let config = ConfigLoader::new(PyProjectVersion::new(&path))
        .with_clock(june_first())
        .load()
        .unwrap();

    assert_eq!(config.release(), "1.2.0");
    assert_eq!(config.version(), "1.2.0");
}

#[test]
fn test_missing_module_yields_no_config() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::new(ModuleVersion::new(temp_dir.path().join("python/__init__.py")))
        .load();

    match result {
        Err(ConfigurationError::VersionSourceMissing { path }) => {
            assert!(path.ends_with("python/__init__.py"));
        }
        other => panic!("expected VersionSourceMissing, got {:?}", other),
    }
}

#[test]
fn test_settings_file_drives_loader() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("pyproject.toml"), "[project]\nversion = \"0.9.0dev\"\n").unwrap();
    let settings_path = root.join("docs-conf.toml");
    fs::write(
        &settings_path,
        r#"
[version_source]
kind = "pyproject"

[overrides]
extra_mock_imports = ["torch", "tilefusion"]
"#,
    )
    .unwrap();

    let settings = LoaderSettings::load_with_env(Some(&settings_path), root, Vec::new()).unwrap();
    assert_eq!(settings.version_source.kind, VersionSourceKind::Pyproject);

    let config = ConfigLoader::from_settings(&settings, root)
        .unwrap()
        .with_clock(june_first())
        .load()
        .unwrap();

    assert_eq!(config.release(), "0.9.0dev (2024-06-01)");
    assert_eq!(config.autodoc_mock_imports(), ["tilefusion", "torch"]);
}

#[test]
fn test_intersphinx_keys() {
    let config = ConfigLoader::new(docs_conf::LiteralVersion("1.0.0".into()))
        .load()
        .unwrap();

    let mut keys: Vec<&str> = config.intersphinx_mapping().keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, ["numpy", "python"]);
    assert!(config
        .intersphinx_mapping()
        .values()
        .all(|target| target.inventory.is_none() && target.base_url.starts_with("https://")));
}

#[test]
fn test_emitted_conf_py_carries_release() {
    let temp_dir = TempDir::new().unwrap();
    write_package(temp_dir.path(), "0.1.0dev");

    let config = ConfigLoader::new(ModuleVersion::new(temp_dir.path().join("python/__init__.py")))
        .with_clock(june_first())
        .load()
        .unwrap();
    let conf_py = emit::to_conf_py(&config);

    assert!(conf_py.contains("version = \"0.1.0dev (2024-06-01)\"\n"));
    assert!(conf_py.contains("autodoc_mock_imports = [\n    \"tilefusion\",\n]\n"));
}
