//! Docs Conf
//!
//! Build configuration loader for the TileFusion documentation site: reads
//! the project version, stamps development builds with the build date and
//! exposes every generator option as an immutable, ordered mapping.

pub mod clock;
pub mod config;
pub mod emit;
pub mod error;
pub mod loader;
pub mod matching;
pub mod settings;
pub mod version;

pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::config::{BuildConfig, ConfigOverrides, IntersphinxTarget, MemberOrder, TypehintsMode};
pub use crate::error::ConfigurationError;
pub use crate::loader::{load, ConfigLoader};
pub use crate::settings::{LoaderSettings, VersionSourceKind, VersionSourceSettings};
pub use crate::version::{
    stamp_release, LiteralVersion, ModuleVersion, PyProjectVersion, VersionSource, DEV_MARKER,
};
