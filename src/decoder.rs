use std::mem;

use tracing::{debug, trace};

use crate::buf::RecvBuf;
use crate::error::{Error, ErrorKind, Result};
use crate::message::{decode, Message};
use crate::sasl::{Auth, Exchange};

/// The phase of the decoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The textual auth phase preceding binary messages.
    Auth,
    /// The binary message phase.
    Binary,
    /// A fatal error occurred; no further bytes are processed.
    Failed,
}

/// An incremental decoder for a D-Bus client byte stream.
///
/// Transport chunks of arbitrary size are appended with [`feed`] and
/// parsed messages pulled with [`read_message`]. The decoder drives the
/// client side of the auth exchange itself: commands it answers with are
/// queued and drained through [`take_outgoing`].
///
/// [`feed`]: Self::feed
/// [`read_message`]: Self::read_message
/// [`take_outgoing`]: Self::take_outgoing
pub struct Decoder {
    buf: RecvBuf,
    outgoing: Vec<u8>,
    phase: Phase,
    exchange: Exchange,
}

impl Decoder {
    /// Construct a decoder for a fresh client stream.
    ///
    /// Queues the leading NUL byte and the `AUTH` command for the given
    /// mechanism.
    pub fn new(auth: Auth<'_>) -> Self {
        Self::with_unix_fd(auth, false)
    }

    /// Like [`new`], but also negotiates Unix file descriptor passing
    /// before sending `BEGIN`.
    ///
    /// [`new`]: Self::new
    pub fn with_unix_fd(auth: Auth<'_>, negotiate_unix_fd: bool) -> Self {
        let exchange = Exchange::new(negotiate_unix_fd);
        let mut outgoing = Vec::new();
        exchange.send_auth(auth, &mut outgoing);

        Self {
            buf: RecvBuf::new(),
            outgoing,
            phase: Phase::Auth,
            exchange,
        }
    }

    /// Construct a decoder for a stream that has already been
    /// authenticated, starting directly in the binary phase.
    pub fn authenticated() -> Self {
        Self {
            buf: RecvBuf::new(),
            outgoing: Vec::new(),
            phase: Phase::Binary,
            exchange: Exchange::completed(),
        }
    }

    /// The current phase of the stream.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The GUID the server reported during authentication, if any.
    pub fn server_guid(&self) -> Option<&str> {
        self.exchange.guid()
    }

    /// Whether the server agreed to pass Unix file descriptors.
    pub fn unix_fd_negotiated(&self) -> bool {
        self.exchange.unix_fd()
    }

    /// Append a chunk of transport bytes.
    ///
    /// Chunks may split any byte boundary, including the fixed header or
    /// the auth/binary transition.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.feed(bytes);
    }

    /// Test if there are outgoing bytes to flush to the transport.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Take the bytes the decoder wants written to the transport.
    pub fn take_outgoing(&mut self) -> Vec<u8> {
        mem::take(&mut self.outgoing)
    }

    /// Drive the stream and pull the next complete message.
    ///
    /// Returns `Ok(None)` when more bytes are needed. Any error is fatal:
    /// the decoder transitions to [`Phase::Failed`] and refuses further
    /// work.
    pub fn read_message(&mut self) -> Result<Option<Message>> {
        loop {
            match self.phase {
                Phase::Failed => return Err(Error::new(ErrorKind::Failed)),
                Phase::Auth => {
                    let line = match self.buf.read_line() {
                        Ok(line) => line,
                        Err(..) => return self.fail(ErrorKind::InvalidSasl.into()),
                    };

                    let Some(line) = line else {
                        return Ok(None);
                    };

                    let done = match self.exchange.advance(&line, &mut self.outgoing) {
                        Ok(done) => done,
                        Err(e) => return self.fail(e),
                    };

                    // Keep the first binary byte at offset zero.
                    self.buf.compact();

                    if done {
                        debug!("entering binary phase");
                        self.phase = Phase::Binary;
                    }
                }
                Phase::Binary => match decode::read_message(&mut self.buf) {
                    Ok(Some(message)) => {
                        self.buf.compact();
                        trace!(serial = message.serial().get(), "message");
                        return Ok(Some(message));
                    }
                    Ok(None) => return Ok(None),
                    Err(e) => return self.fail(e),
                },
            }
        }
    }

    fn fail<T>(&mut self, e: Error) -> Result<T> {
        debug!(error = %e, "decoder failed");
        self.phase = Phase::Failed;
        Err(e)
    }
}
