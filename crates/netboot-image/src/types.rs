//! Image types and execution dispatch
//!
//! Every image format is an [`ImageType`]. Loading an image means asking
//! each known type, in probe order, whether it recognises the buffer; the
//! first one that does tags the image and later handles its execution.

use crate::error::{ImageError, Result};
use crate::image::Image;
use crate::registry::ImageRegistry;
use crate::script::SCRIPT_IMAGE_TYPE;
use std::ffi::CStr;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Order in which image types are probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ProbePriority {
    /// Types with a reliable signature
    #[default]
    Normal,
    /// Types that accept almost anything and must be tried last
    Late,
}

/// Something that executes a single command line
pub trait CommandInterpreter {
    /// Execute one command and return its status (0 on success)
    ///
    /// The command may itself execute images, re-entering the image layer.
    fn execute(&self, command: &CStr) -> i32;
}

/// Collaborators available to an image while it executes
#[derive(Clone, Copy)]
pub struct ExecContext<'a> {
    /// Registry the image was loaded into
    pub registry: &'a dyn ImageRegistry,
    /// Interpreter used for any commands the image contains
    pub interpreter: &'a dyn CommandInterpreter,
}

impl<'a> ExecContext<'a> {
    pub fn new(registry: &'a dyn ImageRegistry, interpreter: &'a dyn CommandInterpreter) -> Self {
        Self {
            registry,
            interpreter,
        }
    }
}

/// An image format
pub trait ImageType: Send + Sync {
    /// Short name of the format
    fn name(&self) -> &'static str;

    /// When this type is probed relative to the others
    fn probe_priority(&self) -> ProbePriority {
        ProbePriority::Normal
    }

    /// Check whether `image` is in this format, tagging it on success
    ///
    /// A buffer in some other format yields [`ImageError::FormatMismatch`],
    /// which is an ordinary negative answer rather than a failure.
    fn probe(&'static self, image: &Image) -> Result<()>;

    /// Execute an image previously recognised by this type
    ///
    /// Returns the image's status: 0 on success, anything else on failure.
    fn exec(&self, image: &Arc<Image>, ctx: &ExecContext<'_>) -> i32;
}

impl fmt::Debug for dyn ImageType + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImageType").field(&self.name()).finish()
    }
}

/// The set of image types known to a loader
#[derive(Clone)]
pub struct ImageTypes {
    types: Vec<&'static dyn ImageType>,
}

impl Default for ImageTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageTypes {
    /// Create a set containing the built-in image types
    pub fn new() -> Self {
        Self::empty().with_type(&SCRIPT_IMAGE_TYPE)
    }

    /// Create a set with no image types
    pub fn empty() -> Self {
        Self { types: Vec::new() }
    }

    /// Add an image type
    ///
    /// Types are kept in probe order; types of equal priority are probed in
    /// the order they were added.
    pub fn with_type(mut self, image_type: &'static dyn ImageType) -> Self {
        let position = self
            .types
            .iter()
            .position(|t| t.probe_priority() > image_type.probe_priority())
            .unwrap_or(self.types.len());
        self.types.insert(position, image_type);
        self
    }

    /// Names of the known types, in probe order
    pub fn names(&self) -> Vec<&'static str> {
        self.types.iter().map(|t| t.name()).collect()
    }

    /// Classify an image by probing every known type in order
    pub fn autoprobe(&self, image: &Image) -> Result<&'static dyn ImageType> {
        if image.image_type().is_some() {
            return Err(image.already_classified());
        }

        for image_type in self.types.iter().copied() {
            match image_type.probe(image) {
                Ok(()) => {
                    debug!(image = %image.name(), image_type = image_type.name(), "Image recognised");
                    return Ok(image_type);
                }
                Err(ImageError::FormatMismatch(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(ImageError::UnknownFormat(image.name().to_string()))
    }
}

/// Execute a classified image through its type
pub fn exec_image(image: &Arc<Image>, ctx: &ExecContext<'_>) -> Result<i32> {
    let image_type = image
        .image_type()
        .ok_or_else(|| ImageError::NotExecutable(image.name().to_string()))?;

    info!(image = %image.name(), image_type = image_type.name(), "Executing image");
    Ok(image_type.exec(image, ctx))
}
