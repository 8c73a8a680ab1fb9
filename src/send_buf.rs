use std::num::NonZeroU32;

use crate::error::Result;
use crate::message::{encode, Message};

/// Buffer of outgoing bytes with the serial allocator for the session.
///
/// # Examples
///
/// ```
/// use dbus_wire::{Message, SendBuf};
///
/// let mut send = SendBuf::new();
///
/// let serial = send.next_serial();
/// assert_eq!(serial.get(), 1);
///
/// send.write_message(&Message::method_call("/", "Ping", serial))?;
/// assert!(!send.is_empty());
/// # Ok::<_, dbus_wire::Error>(())
/// ```
pub struct SendBuf {
    buf: Vec<u8>,
    serial: u32,
}

impl SendBuf {
    /// Construct a new empty send buffer.
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            serial: 0,
        }
    }

    /// Allocate the next message serial, skipping zero on wrap-around.
    pub fn next_serial(&mut self) -> NonZeroU32 {
        loop {
            self.serial = self.serial.wrapping_add(1);

            if let Some(serial) = NonZeroU32::new(self.serial) {
                return serial;
            }
        }
    }

    /// Encode a message at the end of the buffer.
    pub fn write_message(&mut self, message: &Message) -> Result<()> {
        let bytes = encode::encode_message(message)?;
        self.buf.extend_from_slice(&bytes);
        Ok(())
    }

    /// Append raw bytes, used for the auth exchange.
    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Test if there is nothing left to send.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The bytes waiting to be sent.
    pub fn get(&self) -> &[u8] {
        &self.buf
    }

    /// Discard `n` bytes from the front after they have been written to
    /// the transport.
    pub fn advance(&mut self, n: usize) {
        self.buf.drain(..n);
    }
}

impl Default for SendBuf {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
