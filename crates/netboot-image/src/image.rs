//! Loaded boot images
//!
//! An [`Image`] is a named buffer plus the metadata the image layer keeps
//! about it: the type that recognised it and whether it is currently
//! registered. Images are shared as `Arc<Image>`; the strong count is the
//! image's reference count.

use crate::buffer::{ImageBuffer, MemoryBuffer};
use crate::error::{ImageError, Result};
use crate::types::ImageType;
use bytes::Bytes;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// A loaded boot image
pub struct Image {
    name: String,
    buffer: Box<dyn ImageBuffer>,
    image_type: OnceLock<&'static dyn ImageType>,
    registered: AtomicBool,
    executing: AtomicBool,
}

impl Image {
    /// Create an unclassified, unregistered image over a buffer
    pub fn new(name: impl Into<String>, buffer: impl ImageBuffer + 'static) -> Self {
        Self {
            name: name.into(),
            buffer: Box::new(buffer),
            image_type: OnceLock::new(),
            registered: AtomicBool::new(false),
            executing: AtomicBool::new(false),
        }
    }

    /// Create an image over bytes held in memory
    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::new(name, MemoryBuffer::new(data))
    }

    /// Image name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Image contents
    pub fn buffer(&self) -> &dyn ImageBuffer {
        self.buffer.as_ref()
    }

    /// Length of the image contents in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the image has no contents
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Type that recognised this image, if any
    pub fn image_type(&self) -> Option<&'static dyn ImageType> {
        self.image_type.get().copied()
    }

    /// Tag the image with the type that recognised it
    ///
    /// Classification is permanent: tagging an already classified image
    /// fails with [`ImageError::AlreadyClassified`].
    pub fn set_type(&self, image_type: &'static dyn ImageType) -> Result<()> {
        self.image_type
            .set(image_type)
            .map_err(|_| self.already_classified())
    }

    pub(crate) fn already_classified(&self) -> ImageError {
        ImageError::AlreadyClassified {
            name: self.name.clone(),
            image_type: self.image_type().map(|t| t.name()).unwrap_or("unknown"),
        }
    }

    /// Whether the image is currently visible in its registry
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    /// Record the registration state
    ///
    /// Only registry implementations should call this.
    pub fn set_registered(&self, registered: bool) {
        self.registered.store(registered, Ordering::Release);
    }

    /// Whether the image is currently being executed
    pub fn is_executing(&self) -> bool {
        self.executing.load(Ordering::Acquire)
    }

    /// Mark the image as executing; returns `false` if it already was
    pub(crate) fn begin_execution(&self) -> bool {
        !self.executing.swap(true, Ordering::AcqRel)
    }

    pub(crate) fn end_execution(&self) {
        self.executing.store(false, Ordering::Release);
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("type", &self.image_type().map(|t| t.name()))
            .field("registered", &self.is_registered())
            .field("executing", &self.is_executing())
            .finish()
    }
}

/// Counted reference to an image
///
/// Obtained from [`ImageRegistry::acquire_reference`](crate::ImageRegistry::acquire_reference)
/// and handed back through
/// [`ImageRegistry::release_reference`](crate::ImageRegistry::release_reference). The image
/// cannot be freed while the reference is held.
#[derive(Debug)]
pub struct ImageRef(Arc<Image>);

impl ImageRef {
    /// Take a new reference on an image
    pub fn new(image: &Arc<Image>) -> Self {
        Self(Arc::clone(image))
    }

    /// The referenced image
    pub fn image(&self) -> &Arc<Image> {
        &self.0
    }
}

impl Deref for ImageRef {
    type Target = Image;

    fn deref(&self) -> &Image {
        &self.0
    }
}
