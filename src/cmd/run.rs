//! Run command
//!
//! Loads image files, then boots one of them with the command shell as the
//! script interpreter.

use crate::config::HostConfig;
use crate::loader::load_images;
use clap::Parser;
use color_eyre::eyre::{bail, eyre, Result};
use netboot_image::{exec_image, ExecContext, ImageRegistry, ImageTypes, MemoryImageRegistry};
use netboot_shell::{Shell, ShellConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Image files to load
    pub images: Vec<PathBuf>,

    /// Name of the image to boot (defaults to the first executable image)
    #[arg(short, long)]
    pub boot: Option<String>,

    /// Host configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Echo each script command before running it
    #[arg(short, long, default_value_t = false)]
    pub trace: bool,
}

/// Load the requested images and boot one, returning its status
pub fn run_images(args: RunArgs) -> Result<i32> {
    let config = match &args.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    }
    .with_images(args.images)
    .with_boot(args.boot)
    .with_trace_commands(args.trace);
    debug!(?config, "Host configuration");

    if config.images.is_empty() {
        bail!("No images given: pass image files or a config file listing them");
    }

    let registry: Arc<dyn ImageRegistry> = Arc::new(MemoryImageRegistry::new());
    let loaded = load_images(&config.images, &ImageTypes::new(), registry.as_ref())?;
    if loaded == 0 {
        bail!("None of the given images is in a recognised format");
    }

    let image = match &config.boot {
        Some(name) => registry
            .find(name)
            .ok_or_else(|| eyre!("No such image: {}", name))?,
        None => registry
            .first_executable()
            .ok_or_else(|| eyre!("No executable image loaded"))?,
    };

    let shell = Shell::new(
        Arc::clone(&registry),
        ShellConfig::new().with_trace_commands(config.trace_commands),
    );
    let status = exec_image(&image, &ExecContext::new(registry.as_ref(), &shell))?;
    info!(image = %image.name(), status, "Image finished");

    Ok(status)
}
