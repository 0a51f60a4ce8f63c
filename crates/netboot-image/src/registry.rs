//! Image registry
//!
//! The registry is the lookup table through which commands find images to
//! execute. Being registered is what makes an image reachable by name; the
//! script executor relies on this to hide a running script from itself.

use crate::error::{ImageError, Result};
use crate::image::{Image, ImageRef};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

/// Registry of loaded images
///
/// Implementations must not hold internal locks across calls: lookups hand
/// out owned `Arc<Image>` handles so that executing an image may re-enter
/// the registry.
pub trait ImageRegistry: Send + Sync {
    /// Make an image visible to lookups
    fn register(&self, image: Arc<Image>) -> Result<()>;

    /// Remove an image from lookups
    fn unregister(&self, image: &Image) -> Result<()>;

    /// Find the first registered image with the given name
    fn find(&self, name: &str) -> Option<Arc<Image>>;

    /// All registered images, in registration order
    fn images(&self) -> Vec<Arc<Image>>;

    /// First registered image that has been classified by an image type
    fn first_executable(&self) -> Option<Arc<Image>> {
        self.images()
            .into_iter()
            .find(|image| image.image_type().is_some())
    }

    /// Take an extra reference on an image
    fn acquire_reference(&self, image: &Arc<Image>) -> ImageRef {
        ImageRef::new(image)
    }

    /// Drop a reference taken with [`acquire_reference`](Self::acquire_reference)
    fn release_reference(&self, reference: ImageRef) {
        drop(reference);
    }
}

/// In-memory image registry
///
/// Images are kept in registration order. Several images may share a name;
/// lookups by name return the earliest.
#[derive(Debug, Default)]
pub struct MemoryImageRegistry {
    images: RwLock<Vec<Arc<Image>>>,
}

impl MemoryImageRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered images
    pub fn len(&self) -> usize {
        self.images
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no images are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ImageRegistry for MemoryImageRegistry {
    fn register(&self, image: Arc<Image>) -> Result<()> {
        let mut images = self.images.write().unwrap_or_else(PoisonError::into_inner);
        if images.iter().any(|entry| Arc::ptr_eq(entry, &image)) {
            return Err(ImageError::AlreadyRegistered(image.name().to_string()));
        }

        info!(image = %image.name(), len = image.len(), "Registered image");
        image.set_registered(true);
        images.push(image);
        Ok(())
    }

    fn unregister(&self, image: &Image) -> Result<()> {
        let mut images = self.images.write().unwrap_or_else(PoisonError::into_inner);
        let position = images
            .iter()
            .position(|entry| std::ptr::eq(Arc::as_ptr(entry), image))
            .ok_or_else(|| ImageError::NotRegistered(image.name().to_string()))?;

        let removed = images.remove(position);
        removed.set_registered(false);
        debug!(image = %removed.name(), "Unregistered image");
        Ok(())
    }

    fn find(&self, name: &str) -> Option<Arc<Image>> {
        self.images
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|image| image.name() == name)
            .cloned()
    }

    fn images(&self) -> Vec<Arc<Image>> {
        self.images
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::SCRIPT_IMAGE_TYPE;

    fn image(name: &str) -> Arc<Image> {
        Arc::new(Image::from_bytes(name.to_string(), &b"#!script\n"[..]))
    }

    #[test]
    fn test_register_and_find() {
        let registry = MemoryImageRegistry::new();
        let boot = image("boot.ipxe");

        registry.register(Arc::clone(&boot)).unwrap();
        assert!(boot.is_registered());
        assert_eq!(registry.len(), 1);

        let found = registry.find("boot.ipxe").unwrap();
        assert!(Arc::ptr_eq(&found, &boot));
        assert!(registry.find("missing").is_none());
    }

    #[test]
    fn test_register_twice_is_rejected() {
        let registry = MemoryImageRegistry::new();
        let boot = image("boot.ipxe");

        registry.register(Arc::clone(&boot)).unwrap();
        let err = registry.register(Arc::clone(&boot)).unwrap_err();
        assert!(matches!(err, ImageError::AlreadyRegistered(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_names_find_first() {
        let registry = MemoryImageRegistry::new();
        let first = image("menu");
        let second = image("menu");

        registry.register(Arc::clone(&first)).unwrap();
        registry.register(Arc::clone(&second)).unwrap();

        let found = registry.find("menu").unwrap();
        assert!(Arc::ptr_eq(&found, &first));
    }

    #[test]
    fn test_unregister() {
        let registry = MemoryImageRegistry::new();
        let boot = image("boot.ipxe");

        registry.register(Arc::clone(&boot)).unwrap();
        registry.unregister(&boot).unwrap();
        assert!(!boot.is_registered());
        assert!(registry.is_empty());
        assert!(registry.find("boot.ipxe").is_none());

        let err = registry.unregister(&boot).unwrap_err();
        assert!(matches!(err, ImageError::NotRegistered(_)));
    }

    #[test]
    fn test_unregister_matches_identity_not_name() {
        let registry = MemoryImageRegistry::new();
        let first = image("menu");
        let second = image("menu");

        registry.register(Arc::clone(&first)).unwrap();
        registry.register(Arc::clone(&second)).unwrap();
        registry.unregister(&second).unwrap();

        assert!(first.is_registered());
        assert!(!second.is_registered());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_first_executable() {
        let registry = MemoryImageRegistry::new();
        let raw = image("raw");
        let script = image("script");
        script.set_type(&SCRIPT_IMAGE_TYPE).unwrap();

        registry.register(raw).unwrap();
        assert!(registry.first_executable().is_none());

        registry.register(Arc::clone(&script)).unwrap();
        let found = registry.first_executable().unwrap();
        assert!(Arc::ptr_eq(&found, &script));
    }

    #[test]
    fn test_acquire_release() {
        let registry = MemoryImageRegistry::new();
        let boot = image("boot.ipxe");
        registry.register(Arc::clone(&boot)).unwrap();
        let count = Arc::strong_count(&boot);

        let reference = registry.acquire_reference(&boot);
        assert_eq!(Arc::strong_count(&boot), count + 1);

        registry.release_reference(reference);
        assert_eq!(Arc::strong_count(&boot), count);
    }
}
