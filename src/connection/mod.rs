pub use self::transport::Transport;
mod transport;

use std::io::{self, Read, Write};
use std::num::NonZeroU32;

use tokio::io::unix::AsyncFd;
use tokio::io::{Interest, Ready};
use tracing::debug;

use crate::decoder::{Decoder, Phase};
use crate::error::{Error, ErrorKind, Result};
use crate::message::Message;
use crate::sasl::Auth;
use crate::send_buf::SendBuf;

/// An asynchronous D-Bus connection over a [`Transport`].
///
/// Owns the decoder and the send buffer and drives both from socket
/// readiness events. Constructing a connection performs the auth
/// handshake.
pub struct Connection {
    transport: AsyncFd<Transport>,
    decoder: Decoder,
    send: SendBuf,
    /// A message decoded while completing the handshake.
    pending: Option<Message>,
}

impl Connection {
    /// Connect and authenticate against the session bus.
    #[cfg(all(unix, feature = "libc"))]
    pub async fn session_bus() -> Result<Self> {
        let mut id = [0; 32];
        let auth = Auth::external_from_uid(&mut id);
        Self::connect(Transport::session_bus()?, auth).await
    }

    /// Connect and authenticate against the system bus.
    #[cfg(all(unix, feature = "libc"))]
    pub async fn system_bus() -> Result<Self> {
        let mut id = [0; 32];
        let auth = Auth::external_from_uid(&mut id);
        Self::connect(Transport::system_bus()?, auth).await
    }

    /// Connect over the given transport, authenticating with `auth`.
    pub async fn connect(transport: Transport, auth: Auth<'_>) -> Result<Self> {
        transport.set_nonblocking(true)?;

        let mut this = Self {
            transport: AsyncFd::new(transport).map_err(Error::from)?,
            decoder: Decoder::new(auth),
            send: SendBuf::new(),
            pending: None,
        };

        loop {
            if let Some(message) = this.decoder.read_message()? {
                // Decoded along with the final auth lines; hand it to the
                // first recv call.
                this.pending = Some(message);
                break;
            }

            if this.decoder.phase() != Phase::Auth {
                break;
            }

            this.io().await?;
        }

        this.flush().await?;
        debug!(guid = ?this.decoder.server_guid(), "authenticated");
        Ok(this)
    }

    /// The GUID the server reported during authentication, if any.
    pub fn server_guid(&self) -> Option<&str> {
        self.decoder.server_guid()
    }

    /// Allocate the next message serial.
    pub fn next_serial(&mut self) -> NonZeroU32 {
        self.send.next_serial()
    }

    /// Queue a message to be sent.
    ///
    /// The message goes out during the next call to [`recv`] or
    /// [`flush`].
    ///
    /// [`recv`]: Self::recv
    /// [`flush`]: Self::flush
    pub fn send(&mut self, message: &Message) -> Result<()> {
        self.send.write_message(message)
    }

    /// Receive the next message, flushing queued outgoing bytes while
    /// waiting.
    pub async fn recv(&mut self) -> Result<Message> {
        if let Some(message) = self.pending.take() {
            return Ok(message);
        }

        loop {
            if let Some(message) = self.decoder.read_message()? {
                return Ok(message);
            }

            self.io().await?;
        }
    }

    /// Write out all queued bytes.
    pub async fn flush(&mut self) -> Result<()> {
        loop {
            if self.decoder.has_outgoing() {
                let bytes = self.decoder.take_outgoing();
                self.send.extend(&bytes);
            }

            if self.send.is_empty() {
                return Ok(());
            }

            let mut guard = self.transport.writable_mut().await?;

            match guard.get_inner_mut().write(self.send.get()) {
                Ok(n) => self.send.advance(n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => guard.clear_ready(),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Wait for the socket and perform one round of reads and writes.
    async fn io(&mut self) -> Result<()> {
        if self.decoder.has_outgoing() {
            let bytes = self.decoder.take_outgoing();
            self.send.extend(&bytes);
        }

        let mut interest = Interest::READABLE;

        if !self.send.is_empty() {
            interest |= Interest::WRITABLE;
        }

        let mut guard = self.transport.ready_mut(interest).await?;

        if guard.ready().is_writable() && !self.send.is_empty() {
            match guard.get_inner_mut().write(self.send.get()) {
                Ok(n) => self.send.advance(n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    guard.clear_ready_matching(Ready::WRITABLE);
                }
                Err(e) => return Err(e.into()),
            }
        }

        if guard.ready().is_readable() {
            let mut chunk = [0; 4096];

            match guard.get_inner_mut().read(&mut chunk) {
                Ok(0) => return Err(Error::new(ErrorKind::TransportClosed)),
                Ok(n) => self.decoder.feed(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    guard.clear_ready_matching(Ready::READABLE);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
