//! Little-endian structured emitter.
//!
//! A minimal seekable byte sink. The packer writes primitives through this
//! trait instead of poking a `Vec<u8>` directly, so the header back-patch in
//! `kcl::pack` (write zeros, write the body, seek to 0, rewrite the header)
//! reads the same way regardless of what ends up backing the sink.

use bytemuck::Pod;
use std::io::{self, Cursor, Seek, SeekFrom, Write};

/// A little-endian, seekable byte sink.
pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
    fn tell(&mut self) -> io::Result<u64>;
    fn seek_to(&mut self, pos: u64) -> io::Result<()>;

    fn write_u8(&mut self, value: u8) -> io::Result<()> {
        self.write_bytes(&[value])
    }

    fn write_u16(&mut self, value: u16) -> io::Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    fn write_f32(&mut self, value: f32) -> io::Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }
}

/// Write a `Pod` value as raw little-endian bytes (the struct's field order
/// must already match the on-disk layout; callers are expected to use
/// `#[repr(C)]` plain-old-data structs for this).
///
/// A free function rather than a trait method: a generic method would make
/// `ByteSink` non-object-safe, and `kcl::pack`/`Octree::pack` take
/// `&mut dyn ByteSink`.
pub fn write_pod<S: ByteSink + ?Sized, T: Pod>(sink: &mut S, value: &T) -> io::Result<()> {
    sink.write_bytes(bytemuck::bytes_of(value))
}

/// An in-memory byte sink backed by a growable `Vec<u8>`.
#[derive(Debug, Default)]
pub struct VecSink {
    cursor: Cursor<Vec<u8>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { cursor: Cursor::new(Vec::new()) }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.cursor.into_inner()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.cursor.get_ref()
    }
}

impl ByteSink for VecSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        // Writing past the current end must extend the buffer (needed for
        // the initial header placeholder before the back-patch seek).
        let pos = self.cursor.position() as usize;
        let end = pos + bytes.len();
        if end > self.cursor.get_ref().len() {
            self.cursor.get_mut().resize(end, 0);
        }
        self.cursor.write_all(bytes)
    }

    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.cursor.position())
    }

    fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.cursor.seek(SeekFrom::Start(pos))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_little_endian() {
        let mut sink = VecSink::new();
        sink.write_u32(0x01020304).unwrap();
        assert_eq!(sink.as_bytes(), &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn back_patch_overwrites_in_place() {
        let mut sink = VecSink::new();
        sink.write_bytes(&[0u8; 8]).unwrap();
        sink.write_u32(42).unwrap();
        sink.seek_to(0).unwrap();
        sink.write_u32(7).unwrap();
        assert_eq!(sink.as_bytes()[0..4], 7u32.to_le_bytes());
        assert_eq!(sink.as_bytes()[8..12], 42u32.to_le_bytes());
    }
}
