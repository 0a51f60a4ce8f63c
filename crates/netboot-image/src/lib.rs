//! Netboot image layer
//!
//! This crate models boot images loaded into a network boot environment and
//! provides the script image type, which executes an image line by line
//! through a command interpreter.
//!
//! # Components
//!
//! - **Buffers**: bounded, copy-out access to image contents
//! - **Registry**: lookup table of loaded images
//! - **Image types**: format probing and execution dispatch
//! - **Scripts**: `#!script` images executed one command per line
//!
//! # Example
//!
//! ```
//! use netboot_image::{
//!     exec_image, CommandInterpreter, ExecContext, Image, ImageRegistry, ImageTypes,
//!     MemoryImageRegistry,
//! };
//! use std::ffi::CStr;
//! use std::sync::Arc;
//!
//! struct Echo;
//!
//! impl CommandInterpreter for Echo {
//!     fn execute(&self, command: &CStr) -> i32 {
//!         println!("{}", command.to_string_lossy());
//!         0
//!     }
//! }
//!
//! let registry = MemoryImageRegistry::new();
//! let image = Arc::new(Image::from_bytes("boot", &b"#!script\necho hello\n"[..]));
//!
//! ImageTypes::new().autoprobe(&image).unwrap();
//! registry.register(Arc::clone(&image)).unwrap();
//!
//! let status = exec_image(&image, &ExecContext::new(&registry, &Echo)).unwrap();
//! assert_eq!(status, 0);
//! assert!(image.is_registered());
//! ```

pub mod buffer;
pub mod error;
pub mod image;
pub mod registry;
pub mod script;
pub mod types;

pub use buffer::*;
pub use error::*;
pub use image::*;
pub use registry::*;
pub use script::*;
pub use types::*;
