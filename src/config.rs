//! Host configuration file
//!
//! An optional TOML file listing images to load and which one to boot.
//! Command line arguments are merged on top of it.
//!
//! ```toml
//! images = ["menu.ipxe", "/srv/netboot/install.ipxe"]
//! boot = "menu.ipxe"
//! trace_commands = true
//! ```

use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings read from a host configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Image files to load, in order
    pub images: Vec<PathBuf>,

    /// Name of the image to boot (defaults to the first executable image)
    pub boot: Option<String>,

    /// Echo each script command before running it
    pub trace_commands: bool,
}

impl HostConfig {
    /// Read a configuration file
    ///
    /// Relative image paths are resolved against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config = Self::parse(&contents)
            .wrap_err_with(|| format!("Invalid config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            for image in &mut config.images {
                if image.is_relative() {
                    *image = base.join(&*image);
                }
            }
        }

        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Add images from the command line after the configured ones
    pub fn with_images(mut self, images: impl IntoIterator<Item = PathBuf>) -> Self {
        self.images.extend(images);
        self
    }

    /// Override the image to boot, if one was given
    pub fn with_boot(mut self, boot: Option<String>) -> Self {
        if boot.is_some() {
            self.boot = boot;
        }
        self
    }

    /// Enable command tracing if requested
    pub fn with_trace_commands(mut self, trace_commands: bool) -> Self {
        self.trace_commands |= trace_commands;
        self
    }
}
