use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};

use crate::{RenderConfig, Result};

const ENV_PREFIX: &str = "QUILL";

/// Layers configuration sources: built-in defaults, then a TOML file, then
/// `QUILL_*` environment variables (`__` separates sections, e.g.
/// `QUILL_SCROLL__BOTTOM_LOCK_MS`).
#[derive(Debug, Clone)]
pub struct ConfigReader {
    path: Option<PathBuf>,
    use_env: bool,
}

impl Default for ConfigReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigReader {
    pub fn new() -> Self {
        Self { path: None, use_env: true }
    }

    /// Reads from an explicit file, which must then exist.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    /// `~/.config/quill/config.toml` on Linux, platform equivalent elsewhere.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quill").join("config.toml"))
    }

    pub fn read(&self) -> Result<RenderConfig> {
        let mut builder = Config::builder().add_source(Config::try_from(&RenderConfig::default())?);

        match &self.path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Reading configuration");
                builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml).required(true));
            }
            None => {
                if let Some(path) = Self::default_path() {
                    builder = builder.add_source(File::from(path.as_path()).format(FileFormat::Toml).required(false));
                }
            }
        }

        if self.use_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config: RenderConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
