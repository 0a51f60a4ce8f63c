//! Probe command
//!
//! Reports which image type recognises a file, without executing it.

use crate::loader::read_image;
use clap::Parser;
use color_eyre::eyre::Result;
use netboot_image::{ImageError, ImageTypes};
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct ProbeArgs {
    /// Image file to inspect
    pub image: PathBuf,
}

/// Print the detected image type; returns whether any type matched
pub fn run_probe(args: ProbeArgs) -> Result<bool> {
    let image = read_image(&args.image)?;

    match ImageTypes::new().autoprobe(&image) {
        Ok(image_type) => {
            println!("{}: {}", image.name(), image_type.name());
            Ok(true)
        }
        Err(ImageError::UnknownFormat(_)) => {
            println!("{}: unknown", image.name());
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
