//! Image buffer access
//!
//! Image contents are not assumed to live in the caller's address space.
//! Everything that reads an image goes through [`ImageBuffer`], which only
//! offers bounded copy-out reads and a bounded byte search.

use crate::error::{ImageError, Result};
use bytes::Bytes;
use std::fmt;

/// Read-only access to the bytes of a loaded image
pub trait ImageBuffer: Send + Sync + fmt::Debug {
    /// Total length of the buffer in bytes
    fn len(&self) -> usize;

    /// Whether the buffer holds no bytes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `dest.len()` bytes starting at `offset` into `dest`
    ///
    /// Fails with [`ImageError::OutOfBounds`] if the range does not lie
    /// entirely within the buffer.
    fn copy_out(&self, offset: usize, dest: &mut [u8]) -> Result<()>;

    /// Find the first `value` byte in `[offset, end)`
    ///
    /// `end` is clamped to the buffer length. Returns the absolute position
    /// of the byte, or `None` if it does not occur in the range.
    fn find_byte(&self, value: u8, offset: usize, end: usize) -> Option<usize>;
}

/// Image buffer held in ordinary memory
#[derive(Clone, Default)]
pub struct MemoryBuffer {
    data: Bytes,
}

impl MemoryBuffer {
    /// Create a buffer over the given bytes
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl ImageBuffer for MemoryBuffer {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn copy_out(&self, offset: usize, dest: &mut [u8]) -> Result<()> {
        let end = offset
            .checked_add(dest.len())
            .filter(|end| *end <= self.data.len())
            .ok_or(ImageError::OutOfBounds {
                offset,
                len: dest.len(),
                buffer_len: self.data.len(),
            })?;
        dest.copy_from_slice(&self.data[offset..end]);
        Ok(())
    }

    fn find_byte(&self, value: u8, offset: usize, end: usize) -> Option<usize> {
        let end = end.min(self.data.len());
        if offset >= end {
            return None;
        }
        self.data[offset..end]
            .iter()
            .position(|b| *b == value)
            .map(|pos| offset + pos)
    }
}

impl fmt::Debug for MemoryBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBuffer")
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_out() {
        let buffer = MemoryBuffer::new(&b"#!script\necho hi\n"[..]);
        let mut dest = [0u8; 4];
        buffer.copy_out(9, &mut dest).unwrap();
        assert_eq!(&dest, b"echo");
    }

    #[test]
    fn test_copy_out_rejects_overrun() {
        let buffer = MemoryBuffer::new(&b"short"[..]);
        let mut dest = [0u8; 9];
        let err = buffer.copy_out(0, &mut dest).unwrap_err();
        assert!(matches!(
            err,
            ImageError::OutOfBounds {
                offset: 0,
                len: 9,
                buffer_len: 5
            }
        ));

        // Offset overflow must not wrap
        let mut dest = [0u8; 2];
        assert!(buffer.copy_out(usize::MAX, &mut dest).is_err());
    }

    #[test]
    fn test_copy_out_empty_range_at_end() {
        let buffer = MemoryBuffer::new(&b"abc"[..]);
        let mut dest = [0u8; 0];
        assert!(buffer.copy_out(3, &mut dest).is_ok());
    }

    #[test]
    fn test_find_byte() {
        let buffer = MemoryBuffer::new(&b"one\ntwo\nthree"[..]);
        assert_eq!(buffer.find_byte(b'\n', 0, buffer.len()), Some(3));
        assert_eq!(buffer.find_byte(b'\n', 4, buffer.len()), Some(7));
        assert_eq!(buffer.find_byte(b'\n', 8, buffer.len()), None);
    }

    #[test]
    fn test_find_byte_is_bounded() {
        let buffer = MemoryBuffer::new(&b"abc\ndef"[..]);
        // Newline lies outside [0, 3)
        assert_eq!(buffer.find_byte(b'\n', 0, 3), None);
        // End past the buffer is clamped
        assert_eq!(buffer.find_byte(b'f', 0, 100), Some(6));
        assert_eq!(buffer.find_byte(b'a', 10, 100), None);
    }

    #[test]
    fn test_memory_buffer_debug() {
        let buffer = MemoryBuffer::new(vec![0u8; 16]);
        assert_eq!(format!("{:?}", buffer), "MemoryBuffer { len: 16, .. }");
        assert!(!buffer.is_empty());
        assert!(MemoryBuffer::default().is_empty());
    }
}
