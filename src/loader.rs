//! Loading image files from disk

use color_eyre::eyre::{Result, WrapErr};
use netboot_image::{Image, ImageError, ImageRegistry, ImageTypes};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Read a file into an unclassified image named after the file
pub fn read_image(path: &Path) -> Result<Image> {
    let data = std::fs::read(path)
        .wrap_err_with(|| format!("Failed to read image: {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Image::from_bytes(name, data))
}

/// Load every file, classify it and register the recognised ones
///
/// Files in an unknown format are skipped with a warning. Returns the
/// number of images registered.
pub fn load_images(paths: &[impl AsRef<Path>], types: &ImageTypes, registry: &dyn ImageRegistry) -> Result<usize> {
    let mut loaded = 0;

    for path in paths {
        let path = path.as_ref();
        let image = Arc::new(read_image(path)?);

        match types.autoprobe(&image) {
            Ok(image_type) => {
                info!(path = %path.display(), image_type = image_type.name(), "Loaded image");
            }
            Err(ImageError::UnknownFormat(_)) => {
                warn!(path = %path.display(), "Skipping image in unknown format");
                continue;
            }
            Err(e) => {
                return Err(e).wrap_err_with(|| format!("Failed to probe image: {}", path.display()));
            }
        }

        registry.register(image)?;
        loaded += 1;
    }

    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use netboot_image::MemoryImageRegistry;

    #[test]
    fn test_read_image_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.ipxe");
        std::fs::write(&path, "#!script\necho menu\n").unwrap();

        let image = read_image(&path).unwrap();
        assert_eq!(image.name(), "menu.ipxe");
        assert_eq!(image.len(), 19);
        assert!(image.image_type().is_none());
    }

    #[test]
    fn test_read_missing_image() {
        let err = read_image(Path::new("/nonexistent/boot.ipxe")).unwrap_err();
        assert!(err.to_string().contains("Failed to read image"));
    }

    #[test]
    fn test_load_images_skips_unknown_formats() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("boot.ipxe");
        let kernel = dir.path().join("vmlinuz");
        std::fs::write(&script, "#!script\necho hi\n").unwrap();
        std::fs::write(&kernel, b"\x7fELF\x02\x01\x01").unwrap();

        let registry = MemoryImageRegistry::new();
        let loaded = load_images(&[&script, &kernel], &ImageTypes::new(), &registry).unwrap();

        assert_eq!(loaded, 1);
        assert!(registry.find("boot.ipxe").is_some());
        assert!(registry.find("vmlinuz").is_none());
    }
}
