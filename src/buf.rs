use std::mem::size_of;

use crate::error::{Error, Result};
use crate::proto::Endianness;

/// Number of padding bytes needed to advance `offset` to the next multiple
/// of `boundary`.
pub(crate) fn padding_to(offset: usize, boundary: usize) -> usize {
    debug_assert!(boundary.is_power_of_two());
    offset.wrapping_neg() & (boundary - 1)
}

/// A saved read position, used to abandon a partial parse without side
/// effects.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    read: usize,
}

macro_rules! load {
    ($(#[doc = $doc:literal])* $name:ident, $ty:ty) => {
        $(#[doc = $doc])*
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.load_bytes::<{ size_of::<$ty>() }>()?;

            Ok(match self.endianness {
                Endianness::Little => <$ty>::from_le_bytes(bytes),
                Endianness::Big => <$ty>::from_be_bytes(bytes),
            })
        }
    };
}

/// A growable byte window with a read cursor, used for receiving data.
///
/// Bytes are appended at the tail with [`feed`] and consumed at the cursor.
/// Reads past the currently buffered window fail with the need-more-data
/// signal and leave the cursor untouched.
///
/// [`feed`]: Self::feed
///
/// # Examples
///
/// ```
/// use dbus_wire::{Endianness, RecvBuf};
///
/// let mut buf = RecvBuf::with_endianness(Endianness::Little);
/// buf.feed(&[1, 0]);
///
/// assert!(buf.load_u32().is_err());
/// assert_eq!(buf.remaining(), 2);
///
/// buf.feed(&[0, 0]);
/// assert_eq!(buf.load_u32()?, 1);
/// # Ok::<_, dbus_wire::Error>(())
/// ```
pub struct RecvBuf {
    data: Vec<u8>,
    /// Read position in the buffer.
    read: usize,
    /// Upper bound the current parse may read up to, if any.
    fence: Option<usize>,
    /// Endianness of the message being read.
    endianness: Endianness,
}

impl RecvBuf {
    /// Construct a new empty buffer.
    pub fn new() -> Self {
        Self::with_endianness(Endianness::NATIVE)
    }

    /// Construct a new buffer with the specified endianness.
    pub fn with_endianness(endianness: Endianness) -> Self {
        Self {
            data: Vec::new(),
            read: 0,
            fence: None,
            endianness,
        }
    }

    /// Get the endianness of the buffer.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Set the endianness used by primitive loads.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        self.endianness = endianness;
    }

    /// Append bytes at the tail of the buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        debug_assert!(self.fence.is_none(), "feed during a fenced parse");
        self.data.extend_from_slice(bytes);
    }

    /// The current read position, measured from the start of the buffer.
    pub fn pos(&self) -> usize {
        self.read
    }

    /// Remaining bytes between the cursor and the readable end.
    pub fn remaining(&self) -> usize {
        self.end() - self.read
    }

    /// Peek at the next `n` bytes without consuming them.
    pub fn peek(&self, n: usize) -> Option<&[u8]> {
        if self.remaining() < n {
            return None;
        }

        Some(&self.data[self.read..self.read + n])
    }

    /// Consume and return the next `n` bytes.
    pub fn consume(&mut self, n: usize) -> Result<&[u8]> {
        if self.remaining() < n {
            return Err(Error::need_more());
        }

        let bytes = &self.data[self.read..self.read + n];
        self.read += n;
        Ok(bytes)
    }

    /// Advance the cursor to the next multiple of `boundary`.
    ///
    /// Fails with the need-more-data signal and leaves the cursor untouched
    /// if the buffered window is too short to reach the boundary. Padding
    /// bytes are skipped without being validated.
    pub fn align(&mut self, boundary: usize) -> Result<()> {
        let aligned = self.read + padding_to(self.read, boundary);

        if aligned > self.end() {
            return Err(Error::need_more());
        }

        self.read = aligned;
        Ok(())
    }

    /// Discard all consumed bytes and reset the cursor to zero.
    pub fn compact(&mut self) {
        debug_assert!(self.fence.is_none(), "compact during a fenced parse");
        self.data.drain(..self.read);
        self.read = 0;
    }

    /// Save the current read position.
    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint { read: self.read }
    }

    /// Restore a previously saved read position.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        debug_assert!(checkpoint.read <= self.data.len());
        self.read = checkpoint.read;
    }

    /// Restrict reads to the next `len` bytes, returning the previous
    /// restriction. The caller ensures `len` bytes are buffered.
    pub(crate) fn set_fence(&mut self, len: usize) -> Option<usize> {
        debug_assert!(self.read + len <= self.data.len());
        self.fence.replace(self.read + len)
    }

    /// Restore the fence returned by [`set_fence`].
    ///
    /// [`set_fence`]: Self::set_fence
    pub(crate) fn clear_fence(&mut self, previous: Option<usize>) {
        self.fence = previous;
    }

    fn end(&self) -> usize {
        match self.fence {
            Some(fence) => fence,
            None => self.data.len(),
        }
    }

    fn load_bytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        if self.remaining() < N {
            return Err(Error::need_more());
        }

        let mut bytes = [0; N];
        bytes.copy_from_slice(&self.data[self.read..self.read + N]);
        self.read += N;
        Ok(bytes)
    }

    /// Load a single byte.
    pub fn load_u8(&mut self) -> Result<u8> {
        let [b] = self.load_bytes::<1>()?;
        Ok(b)
    }

    load! {
        /// Load an unsigned 16-bit integer at the buffer endianness.
        load_u16, u16
    }

    load! {
        /// Load a signed 16-bit integer at the buffer endianness.
        load_i16, i16
    }

    load! {
        /// Load an unsigned 32-bit integer at the buffer endianness.
        load_u32, u32
    }

    load! {
        /// Load a signed 32-bit integer at the buffer endianness.
        load_i32, i32
    }

    load! {
        /// Load an unsigned 64-bit integer at the buffer endianness.
        load_u64, u64
    }

    load! {
        /// Load a signed 64-bit integer at the buffer endianness.
        load_i64, i64
    }

    load! {
        /// Load an IEEE-754 double at the buffer endianness.
        load_f64, f64
    }

    /// Consume one CR-LF terminated line, returning it without the
    /// terminator.
    ///
    /// Returns `None` until a full line is buffered.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let window = &self.data[self.read..self.end()];

        let Some(at) = window.windows(2).position(|w| w == b"\r\n") else {
            return Ok(None);
        };

        let line = std::str::from_utf8(&window[..at])?.to_owned();
        self.read += at + 2;
        Ok(Some(line))
    }
}

impl Default for RecvBuf {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding() {
        assert_eq!(padding_to(0, 8), 0);
        assert_eq!(padding_to(1, 8), 7);
        assert_eq!(padding_to(8, 8), 0);
        assert_eq!(padding_to(9, 4), 3);
        assert_eq!(padding_to(23, 4), 1);
        assert_eq!(padding_to(3, 1), 0);
    }

    #[test]
    fn align_is_transactional() {
        let mut buf = RecvBuf::new();
        buf.feed(&[0, 0, 0, 1, 2]);

        buf.consume(1).unwrap();
        assert!(buf.align(8).is_err());
        assert_eq!(buf.pos(), 1);

        buf.align(4).unwrap();
        assert_eq!(buf.pos(), 4);
        assert_eq!(buf.load_u8().unwrap(), 1);
    }

    #[test]
    fn checkpoint_rollback() {
        let mut buf = RecvBuf::with_endianness(Endianness::Little);
        buf.feed(&[1, 0, 0, 0, 9]);

        let cp = buf.checkpoint();
        assert_eq!(buf.load_u32().unwrap(), 1);
        assert!(buf.load_u32().is_err());

        buf.rollback(cp);
        assert_eq!(buf.pos(), 0);
        assert_eq!(buf.load_u32().unwrap(), 1);
        assert_eq!(buf.remaining(), 1);
    }

    #[test]
    fn compact_discards_consumed_prefix() {
        let mut buf = RecvBuf::new();
        buf.feed(&[1, 2, 3, 4]);
        buf.consume(2).unwrap();

        buf.compact();
        assert_eq!(buf.pos(), 0);
        assert_eq!(buf.remaining(), 2);
        assert_eq!(buf.peek(2), Some(&[3, 4][..]));
    }

    #[test]
    fn fence_bounds_reads() {
        let mut buf = RecvBuf::new();
        buf.feed(&[1, 2, 3, 4]);

        let prev = buf.set_fence(2);
        assert_eq!(buf.remaining(), 2);
        assert!(buf.consume(3).is_err());
        buf.consume(2).unwrap();
        buf.clear_fence(prev);

        assert_eq!(buf.remaining(), 2);
    }

    #[test]
    fn endianness_loads() {
        let mut buf = RecvBuf::with_endianness(Endianness::Little);
        buf.feed(&[0x01, 0x02, 0x01, 0x02]);
        assert_eq!(buf.load_u16().unwrap(), 0x0201);

        buf.set_endianness(Endianness::Big);
        assert_eq!(buf.load_u16().unwrap(), 0x0102);
    }

    #[test]
    fn read_line_across_chunks() {
        let mut buf = RecvBuf::new();
        buf.feed(b"OK 1234");
        assert_eq!(buf.read_line().unwrap(), None);

        buf.feed(b"\r");
        assert_eq!(buf.read_line().unwrap(), None);

        buf.feed(b"\nAGREE");
        assert_eq!(buf.read_line().unwrap().as_deref(), Some("OK 1234"));
        assert_eq!(buf.read_line().unwrap(), None);
        assert_eq!(buf.remaining(), 5);
    }
}
