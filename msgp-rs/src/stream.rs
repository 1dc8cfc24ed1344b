//! Streaming reader and writer.
//!
//! [`Reader`] buffers just enough of the underlying [`Read`] to hold the next
//! value and then runs the byte-slice decoders over the buffer, so both
//! decode paths share one implementation of the format. [`Writer`] appends
//! into an internal buffer and hands it to the underlying [`Write`] in
//! chunks.

use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::{marker, read, write, Extension};

/// Buffer size used for refills and flush thresholds.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

// =============================================================================
// Reader
// =============================================================================

/// Buffered MessagePack reader over any [`Read`].
#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
}

macro_rules! reader_scalars {
    ($($name:ident => $t:ty, $decode:path;)*) => {
        $(
            #[doc = concat!("Read a `", stringify!($t), "`.")]
            pub fn $name(&mut self) -> Result<$t> {
                self.decode_with($decode)
            }
        )*
    };
}

impl<R: Read> Reader<R> {
    /// Create a reader over `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(DEFAULT_BUFFER_SIZE),
            pos: 0,
        }
    }

    /// Bytes read from the source but not yet consumed.
    pub fn buffered(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    /// Unwrap the source. Buffered bytes are discarded.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Ensure at least `n` unconsumed bytes are buffered.
    fn fill(&mut self, n: usize) -> Result<&[u8]> {
        if self.buf.len() - self.pos < n {
            if self.pos > 0 {
                self.buf.drain(..self.pos);
                self.pos = 0;
            }
            let mut chunk = [0u8; DEFAULT_BUFFER_SIZE];
            while self.buf.len() < n {
                let read = match self.inner.read(&mut chunk) {
                    Ok(0) => return Err(Error::Truncated),
                    Ok(read) => read,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                };
                self.buf.extend_from_slice(&chunk[..read]);
            }
        }
        Ok(&self.buf[self.pos..])
    }

    /// Buffer the next value, excluding the children of arrays and maps.
    fn next_value(&mut self) -> Result<&[u8]> {
        let m = self.fill(1)?[0];
        let size = marker::header_size(m)?;
        let head = self.fill(size)?;
        let total = size + marker::payload_size(head);
        let value = self.fill(total)?;
        Ok(&value[..total])
    }

    /// Run a byte-slice decoder on the next value and consume what it read.
    fn decode_with<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&[u8]) -> Result<(T, &[u8])>,
    {
        let value = self.next_value()?;
        let len = value.len();
        let (out, rest) = f(value)?;
        let used = len - rest.len();
        self.pos += used;
        Ok(out)
    }

    reader_scalars! {
        read_bool => bool, read::read_bool_bytes;
        read_f32 => f32, read::read_f32_bytes;
        read_f64 => f64, read::read_f64_bytes;
        read_i8 => i8, read::read_i8_bytes;
        read_i16 => i16, read::read_i16_bytes;
        read_i32 => i32, read::read_i32_bytes;
        read_i64 => i64, read::read_i64_bytes;
        read_u8 => u8, read::read_u8_bytes;
        read_u16 => u16, read::read_u16_bytes;
        read_u32 => u32, read::read_u32_bytes;
        read_u64 => u64, read::read_u64_bytes;
    }

    /// Read an array header and return the element count.
    pub fn read_array_header(&mut self) -> Result<u32> {
        self.decode_with(read::array_header)
    }

    /// Read a map header and return the entry count.
    pub fn read_map_header(&mut self) -> Result<u32> {
        self.decode_with(read::map_header)
    }

    /// Check whether the next value is nil without consuming it.
    pub fn is_nil(&mut self) -> Result<bool> {
        Ok(self.fill(1)?[0] == marker::NIL)
    }

    /// Consume a nil marker.
    pub fn read_nil(&mut self) -> Result<()> {
        self.decode_with(|b| read::read_nil_bytes(b).map(|rest| ((), rest)))
    }

    /// Read a map key into `key`, reusing its allocation.
    pub fn read_map_key(&mut self, key: &mut Vec<u8>) -> Result<()> {
        self.decode_with(|b| {
            let (raw, rest) = read::read_map_key_zc(b)?;
            key.clear();
            key.extend_from_slice(raw);
            Ok(((), rest))
        })
    }

    /// Read a string into a new `String`.
    pub fn read_string(&mut self) -> Result<String> {
        let mut s = String::new();
        self.read_string_into(&mut s)?;
        Ok(s)
    }

    /// Read a string into `dst`, reusing its allocation.
    pub fn read_string_into(&mut self, dst: &mut String) -> Result<()> {
        self.decode_with(|b| read::read_string_into(b, dst).map(|rest| ((), rest)))
    }

    /// Read a binary blob into `dst`, reusing its allocation.
    pub fn read_bytes_into(&mut self, dst: &mut Vec<u8>) -> Result<()> {
        self.decode_with(|b| read::read_bytes_into(b, dst).map(|rest| ((), rest)))
    }

    /// Read a binary blob whose length must equal `dst.len()`.
    pub fn read_exact_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        self.decode_with(|b| read::read_exact_bytes(b, dst).map(|rest| ((), rest)))
    }

    /// Read an extension into `e`.
    pub fn read_extension<E>(&mut self, e: &mut E) -> Result<()>
    where
        E: Extension + ?Sized,
    {
        self.decode_with(|b| read::read_extension_bytes(b, e).map(|rest| ((), rest)))
    }

    /// Advance past one complete value of any kind.
    pub fn skip(&mut self) -> Result<()> {
        let mut pending: u64 = 1;
        while pending > 0 {
            let value = self.next_value()?;
            let (len, children) = (value.len(), marker::child_count(value));
            self.pos += len;
            pending = pending - 1 + children;
        }
        Ok(())
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Buffered MessagePack writer over any [`Write`].
///
/// Output is only guaranteed to reach the underlying writer after
/// [`flush`](Writer::flush) or [`into_inner`](Writer::into_inner).
#[derive(Debug)]
pub struct Writer<W: Write> {
    inner: W,
    buf: Vec<u8>,
}

macro_rules! writer_scalars {
    ($($name:ident => $t:ty, $append:path;)*) => {
        $(
            #[doc = concat!("Write a `", stringify!($t), "`.")]
            pub fn $name(&mut self, v: $t) -> Result<()> {
                $append(&mut self.buf, v);
                self.maybe_flush()
            }
        )*
    };
}

impl<W: Write> Writer<W> {
    /// Create a writer over `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(DEFAULT_BUFFER_SIZE),
        }
    }

    fn maybe_flush(&mut self) -> Result<()> {
        if self.buf.len() >= DEFAULT_BUFFER_SIZE {
            self.flush_buf()?;
        }
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.inner.write_all(&self.buf)?;
        self.buf.clear();
        Ok(())
    }

    /// Write all buffered output and flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_buf()?;
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and unwrap the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }

    writer_scalars! {
        write_bool => bool, write::append_bool;
        write_f32 => f32, write::append_f32;
        write_f64 => f64, write::append_f64;
        write_i8 => i8, write::append_i8;
        write_i16 => i16, write::append_i16;
        write_i32 => i32, write::append_i32;
        write_i64 => i64, write::append_i64;
        write_u8 => u8, write::append_u8;
        write_u16 => u16, write::append_u16;
        write_u32 => u32, write::append_u32;
        write_u64 => u64, write::append_u64;
        write_array_header => u32, write::append_array_header;
        write_map_header => u32, write::append_map_header;
    }

    /// Write a nil marker.
    pub fn write_nil(&mut self) -> Result<()> {
        write::append_nil(&mut self.buf);
        self.maybe_flush()
    }

    /// Write a string.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        write::append_str(&mut self.buf, s)?;
        self.maybe_flush()
    }

    /// Write a binary blob.
    pub fn write_bytes(&mut self, b: &[u8]) -> Result<()> {
        write::append_bytes(&mut self.buf, b)?;
        self.maybe_flush()
    }

    /// Write an extension value.
    pub fn write_extension<E>(&mut self, e: &E) -> Result<()>
    where
        E: Extension + ?Sized,
    {
        write::append_extension(&mut self.buf, e)?;
        self.maybe_flush()
    }

    /// Write bytes that are already MessagePack encoded.
    pub fn write_raw(&mut self, raw: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(raw);
        self.maybe_flush()
    }
}
