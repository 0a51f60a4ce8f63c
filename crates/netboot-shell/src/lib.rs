//! Netboot command shell
//!
//! This crate provides the command interpreter that boot scripts run
//! through. It understands a handful of commands:
//!
//! - `echo [words]...`
//! - `true`, `false`, `exit [status]`
//! - `imgstat`: list registered images
//! - `imgfree <name>`: unregister an image
//! - `boot [name]` / `imgexec [name]`: execute a named image, or the first
//!   executable one
//!
//! # Example
//!
//! ```
//! use netboot_image::{Image, ImageRegistry, ImageTypes, MemoryImageRegistry};
//! use netboot_shell::{Shell, ShellConfig};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(MemoryImageRegistry::new());
//! let image = Arc::new(Image::from_bytes("boot", &b"#!script\necho hi\n"[..]));
//! ImageTypes::new().autoprobe(&image).unwrap();
//! registry.register(image).unwrap();
//!
//! let shell = Shell::with_output(registry, ShellConfig::default(), Vec::new());
//! assert_eq!(shell.run_line("boot"), 0);
//! assert_eq!(shell.into_output(), b"hi\n");
//! ```

pub mod config;
pub mod error;
pub mod shell;

pub use config::*;
pub use error::*;
pub use shell::*;
