use std::io;
use std::str::Utf8Error;

use crate::object_path::ObjectPathError;
use crate::signature::SignatureError;

/// Result alias using an [`Error`] as the error type by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An error raised by this crate.
///
/// Every error other than the need-more-data signal is fatal to the
/// session it was raised on; the stream is not self-synchronizing.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    #[inline]
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// The insufficient-data signal.
    #[inline]
    pub(crate) fn need_more() -> Self {
        Self::new(ErrorKind::NeedMore)
    }

    /// Test if the error only signals that more bytes are required.
    ///
    /// Such errors are recovered locally by the decoder and never
    /// surface through [`Decoder::read_message`].
    ///
    /// [`Decoder::read_message`]: crate::Decoder::read_message
    #[inline]
    pub fn is_need_more(&self) -> bool {
        matches!(self.kind, ErrorKind::NeedMore)
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<SignatureError> for Error {
    #[inline]
    fn from(error: SignatureError) -> Self {
        Self::new(ErrorKind::Signature(error))
    }
}

impl From<ObjectPathError> for Error {
    #[inline]
    fn from(error: ObjectPathError) -> Self {
        Self::new(ErrorKind::ObjectPath(error))
    }
}

impl From<Utf8Error> for Error {
    #[inline]
    fn from(error: Utf8Error) -> Self {
        Self::new(ErrorKind::Utf8(error))
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::UnexpectedEof => Self::new(ErrorKind::TransportClosed),
            _ => Self::new(ErrorKind::Io(error)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorKind {
    #[error("need more data")]
    NeedMore,
    #[error(transparent)]
    Io(io::Error),
    #[error(transparent)]
    Signature(SignatureError),
    #[error(transparent)]
    ObjectPath(ObjectPathError),
    #[error("invalid UTF-8 in string")]
    Utf8(#[source] Utf8Error),
    #[error("invalid endianness byte {0:#04x}")]
    InvalidEndianness(u8),
    #[error("unsupported protocol version {0}")]
    InvalidProtocolVersion(u8),
    #[error("invalid message type {0}")]
    InvalidMessageType(u8),
    #[error("message serial is zero")]
    ZeroSerial,
    #[error("reply serial is zero")]
    ZeroReplySerial,
    #[error("message is missing the required PATH header")]
    MissingPath,
    #[error("message is missing the required MEMBER header")]
    MissingMember,
    #[error("message is missing the required INTERFACE header")]
    MissingInterface,
    #[error("message is missing the required REPLY_SERIAL header")]
    MissingReplySerial,
    #[error("message is missing the required ERROR_NAME header")]
    MissingErrorName,
    #[error("header field {0} carries a value of the wrong type")]
    HeaderFieldMismatch(u8),
    #[error("body of length {0} is too long (max is 134217728)")]
    BodyTooLong(u32),
    #[error("array of length {0} is too long (max is 67108864)")]
    ArrayTooLong(u32),
    #[error("string is not null terminated")]
    NotNullTerminated,
    #[error("string contains an interior null byte")]
    NulInString,
    #[error("boolean value {0} is not 0 or 1")]
    InvalidBool(u32),
    #[error("encoded content overruns its declared length")]
    LengthOverrun,
    #[error("message body does not match its signature")]
    BodySignatureMismatch,
    #[error("array element does not match the element signature")]
    ElementTypeMismatch,
    #[error("malformed SASL line")]
    InvalidSasl,
    #[error("authentication rejected, server offers: {0}")]
    SaslRejected(Box<str>),
    #[error("authentication failed: {0}")]
    SaslFailed(Box<str>),
    #[error("transport closed")]
    TransportClosed,
    #[error("missing session bus address")]
    MissingBus,
    #[error("invalid D-Bus address")]
    InvalidAddress,
    #[error("decoder is in a failed state")]
    Failed,
}
