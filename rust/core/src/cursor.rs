// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary Cursor - fixed-width reads with per-call byte order
//!
//! The shapefile format mixes big-endian record headers with little-endian
//! payloads, so byte order is chosen per read instead of per cursor.
//! Every read assembles its value in a stack-local array.

use std::io::{self, ErrorKind, Read};

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Sequential reader over any [`Read`] source.
///
/// The underlying stream is never assumed to be seekable: the only
/// repositioning supported is a forward skip to an absolute offset.
pub struct BinaryCursor<R> {
    inner: R,
    position: u64,
}

impl<R: Read> BinaryCursor<R> {
    /// Wrap a reader positioned at absolute offset 0
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Absolute number of bytes consumed so far
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Give back the wrapped reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Fill `buf` completely, reporting how far a short read got.
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let start = self.position;
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::Io(e)),
            }
        }
        self.position += filled as u64;

        if filled < buf.len() {
            return Err(Error::UnexpectedEndOfInput {
                offset: start,
                needed: buf.len(),
                available: filled,
            });
        }
        Ok(())
    }

    /// Read a 32-bit signed integer in byte order `E`
    #[inline]
    pub fn read_i32<E: ByteOrder>(&mut self) -> Result<i32> {
        let mut bytes = [0u8; 4];
        self.fill(&mut bytes)?;
        Ok(E::read_i32(&bytes))
    }

    /// Read a 64-bit float in byte order `E`
    #[inline]
    pub fn read_f64<E: ByteOrder>(&mut self) -> Result<f64> {
        let mut bytes = [0u8; 8];
        self.fill(&mut bytes)?;
        Ok(E::read_f64(&bytes))
    }

    #[inline]
    pub fn read_i32_be(&mut self) -> Result<i32> {
        self.read_i32::<BigEndian>()
    }

    #[inline]
    pub fn read_i32_le(&mut self) -> Result<i32> {
        self.read_i32::<LittleEndian>()
    }

    #[inline]
    pub fn read_f64_le(&mut self) -> Result<f64> {
        self.read_f64::<LittleEndian>()
    }

    /// Skip forward to an absolute byte offset.
    ///
    /// Bytes in between are read and discarded. Targets behind the current
    /// position are rejected since the stream cannot rewind.
    pub fn seek_to_offset(&mut self, offset: u64) -> Result<()> {
        if offset < self.position {
            return Err(Error::invalid_format(
                self.position,
                format!("cannot seek backwards to byte {}", offset),
            ));
        }

        let wanted = offset - self.position;
        let skipped = io::copy(&mut (&mut self.inner).take(wanted), &mut io::sink())?;
        let start = self.position;
        self.position += skipped;

        if skipped < wanted {
            return Err(Error::UnexpectedEndOfInput {
                offset: start,
                needed: wanted as usize,
                available: skipped as usize,
            });
        }
        Ok(())
    }
}
