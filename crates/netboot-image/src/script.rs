//! Script images
//!
//! A script is an image whose contents start with [`SCRIPT_MAGIC`]. It is
//! not loaded anywhere: each time it is executed, lines are copied out of
//! the image buffer one at a time and handed to the command interpreter.
//!
//! While a script runs it is removed from the registry, so that a `boot`
//! command inside the script cannot find and re-execute the script itself.
//! An extra reference keeps the image alive in the meantime.

use crate::buffer::ImageBuffer;
use crate::error::{ImageError, Result, ScriptError, STATUS_OK};
use crate::image::{Image, ImageRef};
use crate::registry::ImageRegistry;
use crate::types::{ExecContext, ImageType};
use std::ffi::{CStr, CString};
use std::sync::Arc;
use tracing::{debug, warn};

/// Signature every script starts with
pub const SCRIPT_MAGIC: &[u8; 9] = b"#!script\n";

/// The script image type
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptImageType;

/// Shared instance of the script image type
pub static SCRIPT_IMAGE_TYPE: ScriptImageType = ScriptImageType;

impl ScriptImageType {
    /// Run every line of a script, stopping at the first failing command
    pub fn run(&self, image: &Arc<Image>, ctx: &ExecContext<'_>) -> std::result::Result<(), ScriptError> {
        let _guard = ExecGuard::enter(ctx.registry, image)?;

        for line in ScriptLines::new(image.buffer()) {
            let command = line?;
            debug!(image = %image.name(), "$ {}", command.to_string_lossy());

            let status = ctx.interpreter.execute(&command);
            if status != STATUS_OK {
                return Err(ScriptError::CommandFailed { command, status });
            }
        }

        Ok(())
    }
}

impl ImageType for ScriptImageType {
    fn name(&self) -> &'static str {
        "script"
    }

    fn probe(&'static self, image: &Image) -> Result<()> {
        let mut test = [0u8; SCRIPT_MAGIC.len()];
        let matched = image.buffer().copy_out(0, &mut test).is_ok() && &test == SCRIPT_MAGIC;
        if !matched {
            debug!(image = %image.name(), "Invalid magic signature");
            return Err(ImageError::FormatMismatch(self.name()));
        }

        image.set_type(self)
    }

    fn exec(&self, image: &Arc<Image>, ctx: &ExecContext<'_>) -> i32 {
        match self.run(image, ctx) {
            Ok(()) => STATUS_OK,
            Err(e) => {
                warn!(image = %image.name(), error = %e, "Script failed");
                e.status()
            }
        }
    }
}

/// Hides an executing image from its registry
///
/// Entering marks the image as executing, takes a reference and unregisters
/// the image; dropping the guard re-registers it, releases the reference and
/// clears the mark. An image that was not registered on entry is left
/// unregistered. Entering an image that is already executing fails.
struct ExecGuard<'a> {
    registry: &'a dyn ImageRegistry,
    reference: Option<ImageRef>,
    was_registered: bool,
}

impl<'a> ExecGuard<'a> {
    fn enter(registry: &'a dyn ImageRegistry, image: &Arc<Image>) -> std::result::Result<Self, ScriptError> {
        if !image.begin_execution() {
            return Err(ScriptError::AlreadyRunning(image.name().to_string()));
        }

        let reference = registry.acquire_reference(image);
        let was_registered = match registry.unregister(image) {
            Ok(()) => true,
            Err(ImageError::NotRegistered(_)) => {
                debug!(image = %image.name(), "Executing unregistered image");
                false
            }
            Err(e) => {
                warn!(image = %image.name(), error = %e, "Failed to unregister image");
                false
            }
        };

        Ok(Self {
            registry,
            reference: Some(reference),
            was_registered,
        })
    }
}

impl Drop for ExecGuard<'_> {
    fn drop(&mut self) {
        let Some(reference) = self.reference.take() else {
            return;
        };

        if self.was_registered {
            if let Err(e) = self.registry.register(Arc::clone(reference.image())) {
                warn!(image = %reference.name(), error = %e, "Failed to re-register image");
            }
        }
        reference.end_execution();
        self.registry.release_reference(reference);
    }
}

/// Iterator over the lines of a script buffer
///
/// Lines exclude their terminating newline; the final line need not have
/// one. Each line is copied out into its own NUL-terminated string.
pub(crate) struct ScriptLines<'a> {
    buffer: &'a dyn ImageBuffer,
    offset: usize,
}

impl<'a> ScriptLines<'a> {
    pub(crate) fn new(buffer: &'a dyn ImageBuffer) -> Self {
        Self { buffer, offset: 0 }
    }
}

impl Iterator for ScriptLines<'_> {
    type Item = Result<CString>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.buffer.len();
        if self.offset >= len {
            return None;
        }

        let eol = self.buffer.find_byte(b'\n', self.offset, len).unwrap_or(len);
        let line_len = eol - self.offset;
        let line = copy_line(self.buffer, self.offset, line_len);

        self.offset = match line {
            Ok(_) => self.offset + line_len + 1,
            Err(_) => len,
        };
        Some(line)
    }
}

/// Copy `len` bytes at `offset` into a NUL-terminated string
///
/// An embedded NUL byte ends the string early.
fn copy_line(buffer: &dyn ImageBuffer, offset: usize, len: usize) -> Result<CString> {
    let mut scratch = vec![0u8; len + 1];
    buffer.copy_out(offset, &mut scratch[..len])?;

    Ok(CStr::from_bytes_until_nul(&scratch)
        .map(CStr::to_owned)
        .unwrap_or_default())
}
