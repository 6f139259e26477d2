//! Layered configuration for a conversion run.
//!
//! `defaults/tanakh-mql.default.toml` is embedded into the binary. A user file
//! and command-line overrides are layered on top through [`Loader`] before the
//! result is deserialized into [`ConvertConfig`].

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../defaults/tanakh-mql.default.toml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConvertConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub mirror: MirrorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InputConfig {
    pub dir: PathBuf,
    /// Book file stems, converted in this order.
    pub books: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    pub mql: PathBuf,
    pub batch_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MirrorConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl InputConfig {
    pub fn book_path(&self, book: &str) -> PathBuf {
        self.dir.join(format!("{book}.xml"))
    }
}

impl MirrorConfig {
    /// Where the cleaned copy of `book` goes, if mirroring is on.
    pub fn book_path(&self, book: &str) -> Option<PathBuf> {
        self.enabled.then(|| self.dir.join(format!("{book}.xml")))
    }
}

/// Builds a [`ConvertConfig`] from the embedded TOML, then any `--config`
/// file, then flag values. Later layers win key by key.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Only the embedded `tanakh-mql.default.toml`.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Adds a TOML file the run cannot do without; `build` fails if it is
    /// missing.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Adds a TOML file that may not exist, such as a per-user default.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Sets one dotted key, e.g. `output.batch_size`, above every file layer.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<ConvertConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The configuration a run gets with no `--config` file and no flags.
pub fn load_defaults() -> Result<ConvertConfig, ConfigError> {
    Loader::new().build()
}
