//! The textual SASL phase D-Bus performs before binary messages.
//!
//! The client sends a single leading NUL byte, an `AUTH` command, an
//! optional `NEGOTIATE_UNIX_FD`, and finally `BEGIN`, after which only
//! binary messages are valid on the stream.


use tracing::trace;

use crate::error::{ErrorKind, Result};

/// The SASL authentication mechanism offered by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth<'a> {
    /// EXTERNAL authentication with a literal identity payload.
    External(&'a [u8]),
}

impl<'a> Auth<'a> {
    /// EXTERNAL authentication for the uid of the current process.
    #[cfg(all(unix, feature = "libc"))]
    pub fn external_from_uid(buf: &'a mut [u8; 32]) -> Auth<'a> {
        // SAFETY: getuid never fails.
        let uid = unsafe { libc::getuid() };
        Self::external_from_u32_ascii_hex(buf, uid)
    }

    /// EXTERNAL authentication for a numeric identity, encoded as the
    /// ASCII hex expansion of its decimal digits.
    pub fn external_from_u32_ascii_hex(buf: &'a mut [u8; 32], id: u32) -> Auth<'a> {
        const HEX: [u8; 16] = *b"0123456789abcdef";

        let mut digits = [0u8; 10];
        let mut n = 0;
        let mut id = id;

        loop {
            digits[n] = b'0' + (id % 10) as u8;
            n += 1;
            id /= 10;

            if id == 0 {
                break;
            }
        }

        let mut at = 0;

        while n > 0 {
            n -= 1;
            let digit = digits[n];
            buf[at] = HEX[(digit >> 4) as usize];
            buf[at + 1] = HEX[(digit & 0xf) as usize];
            at += 2;
        }

        Auth::External(&buf[..at])
    }
}

/// A server response line during the auth phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaslResponse<'a> {
    /// Authentication succeeded; carries the server GUID.
    Ok(&'a str),
    /// Authentication failed; carries the mechanisms the server supports.
    Rejected(&'a str),
    /// Mechanism-specific challenge data in ASCII hex.
    Data(&'a str),
    /// The server reports an error, with an optional message.
    Error(&'a str),
    /// The server agreed to pass Unix file descriptors.
    AgreeUnixFd,
}

/// Parse one server auth line, without its CR LF terminator.
pub(crate) fn parse_response(line: &str) -> Result<SaslResponse<'_>> {
    let line = line.trim_end();

    let (command, rest) = match line.split_once(' ') {
        Some((command, rest)) => (command, rest),
        None => (line, ""),
    };

    match command {
        "OK" => Ok(SaslResponse::Ok(rest)),
        "REJECTED" => Ok(SaslResponse::Rejected(rest)),
        "DATA" => Ok(SaslResponse::Data(rest)),
        "ERROR" => Ok(SaslResponse::Error(rest)),
        "AGREE_UNIX_FD" => Ok(SaslResponse::AgreeUnixFd),
        _ => Err(ErrorKind::InvalidSasl.into()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExchangeState {
    /// AUTH has been sent, waiting for the server verdict.
    WaitingForOk,
    /// NEGOTIATE_UNIX_FD has been sent, waiting for agreement.
    WaitingForAgreeUnixFd,
    /// BEGIN has been sent.
    Done,
}

/// The client side of the auth exchange.
///
/// Server lines are fed to [`advance`], which appends any commands the
/// client answers with to an outgoing buffer and reports when `BEGIN` has
/// been sent.
///
/// [`advance`]: Self::advance
pub(crate) struct Exchange {
    state: ExchangeState,
    negotiate_unix_fd: bool,
    unix_fd: bool,
    guid: Option<Box<str>>,
}

impl Exchange {
    pub(crate) fn new(negotiate_unix_fd: bool) -> Self {
        Self {
            state: ExchangeState::WaitingForOk,
            negotiate_unix_fd,
            unix_fd: false,
            guid: None,
        }
    }

    /// An exchange which has already completed, for streams negotiated
    /// elsewhere.
    pub(crate) fn completed() -> Self {
        Self {
            state: ExchangeState::Done,
            negotiate_unix_fd: false,
            unix_fd: false,
            guid: None,
        }
    }

    /// Queue the leading NUL byte and the AUTH command.
    pub(crate) fn send_auth(&self, auth: Auth<'_>, out: &mut Vec<u8>) {
        out.push(0);

        match auth {
            Auth::External(identity) => {
                out.extend_from_slice(b"AUTH EXTERNAL ");
                out.extend_from_slice(identity);
            }
        }

        out.extend_from_slice(b"\r\n");
    }

    /// Feed one server line, appending any client commands to `out`.
    /// Returns `true` once `BEGIN` has been sent.
    pub(crate) fn advance(&mut self, line: &str, out: &mut Vec<u8>) -> Result<bool> {
        let response = parse_response(line)?;
        trace!(?response, state = ?self.state, "sasl");

        match (self.state, response) {
            (ExchangeState::WaitingForOk, SaslResponse::Ok(guid)) => {
                self.guid = Some(guid.into());

                if self.negotiate_unix_fd {
                    out.extend_from_slice(b"NEGOTIATE_UNIX_FD\r\n");
                    self.state = ExchangeState::WaitingForAgreeUnixFd;
                    Ok(false)
                } else {
                    self.begin(out)
                }
            }
            (ExchangeState::WaitingForOk, SaslResponse::Rejected(mechanisms)) => {
                Err(ErrorKind::SaslRejected(mechanisms.into()).into())
            }
            (ExchangeState::WaitingForAgreeUnixFd, SaslResponse::AgreeUnixFd) => {
                self.unix_fd = true;
                self.begin(out)
            }
            (ExchangeState::WaitingForAgreeUnixFd, SaslResponse::Error(..)) => {
                // The server does not support fd passing; proceed without.
                self.begin(out)
            }
            (_, response) => {
                Err(ErrorKind::SaslFailed(format!("unexpected response {response:?}").into()).into())
            }
        }
    }

    fn begin(&mut self, out: &mut Vec<u8>) -> Result<bool> {
        out.extend_from_slice(b"BEGIN\r\n");
        self.state = ExchangeState::Done;
        Ok(true)
    }

    /// The GUID the server reported with `OK`, if any.
    pub(crate) fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    /// Whether the server agreed to pass Unix file descriptors.
    pub(crate) fn unix_fd(&self) -> bool {
        self.unix_fd
    }
}
