//! The configuration loader.

use std::path::Path;

use log::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::{BuildConfig, ConfigOverrides};
use crate::error::Result;
use crate::settings::LoaderSettings;
use crate::version::{self, VersionSource};

/// Produces a [`BuildConfig`] from a version source and a clock.
pub struct ConfigLoader {
    source: Box<dyn VersionSource>,
    clock: Box<dyn Clock>,
    overrides: ConfigOverrides,
}

impl ConfigLoader {
    pub fn new(source: impl VersionSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            clock: Box::new(SystemClock),
            overrides: ConfigOverrides::default(),
        }
    }

    /// Builds a loader from resolved settings; relative paths are taken from `base_dir`.
    pub fn from_settings(settings: &LoaderSettings, base_dir: &Path) -> Result<Self> {
        Ok(Self {
            source: settings.version_source.build(base_dir)?,
            clock: Box::new(SystemClock),
            overrides: settings.overrides.clone(),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Reads the version and assembles the configuration.
    ///
    /// Fails without producing any configuration if the version source is
    /// missing or malformed.
    pub fn load(&self) -> Result<BuildConfig> {
        debug!("Reading version from {}", self.source.describe());
        let version = self.source.read_version()?;

        // the clock is only read for development builds
        let release = if version::is_development(&version) {
            version::with_date_stamp(&version, self.clock.today())
        } else {
            version
        };

        let config = BuildConfig::with_overrides(release, &self.overrides);
        info!(
            "Loaded documentation config for {} {}",
            config.project(),
            config.release()
        );
        Ok(config)
    }
}

/// Loads with the system clock from `source`.
pub fn load(source: impl VersionSource + 'static) -> Result<BuildConfig> {
    ConfigLoader::new(source).load()
}
