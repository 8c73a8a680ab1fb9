//! Low level constants and primitives of the D-Bus wire protocol.

use std::fmt;
use std::ops::{BitAnd, BitOr};

/// The protocol version this crate speaks.
pub(crate) const PROTOCOL_VERSION: u8 = 1;

/// Size of the fixed message header preceding the header-field array.
pub(crate) const FIXED_HEADER_LEN: usize = 12;

/// The maximum byte length of a single array (2^26).
pub(crate) const MAX_ARRAY_LENGTH: u32 = 1 << 26;

/// The maximum byte length of a message body (2^27).
pub(crate) const MAX_BODY_LENGTH: u32 = 1 << 27;

/// The endianness of a message, carried in its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Little endian, the `l` endian byte.
    Little,
    /// Big endian, the `B` endian byte.
    Big,
}

impl Endianness {
    /// The endianness of the current platform.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;
    /// The endianness of the current platform.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;

    /// Decode an endian byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'l' => Some(Self::Little),
            b'B' => Some(Self::Big),
            _ => None,
        }
    }

    /// The endian byte placed at the start of a message.
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Little => b'l',
            Self::Big => b'B',
        }
    }
}

/// The type of a message, the second byte of the fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// A method call, which may prompt a reply.
    MethodCall = 1,
    /// A method reply with returned data.
    MethodReturn = 2,
    /// An error reply.
    Error = 3,
    /// A signal emission.
    Signal = 4,
}

impl MessageType {
    pub(crate) fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::MethodCall),
            2 => Some(Self::MethodReturn),
            3 => Some(Self::Error),
            4 => Some(Self::Signal),
            _ => None,
        }
    }

    pub(crate) fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Flags inside of a D-Bus message.
///
/// Unknown bits are preserved as received.
///
/// # Examples
///
/// ```
/// use dbus_wire::Flags;
///
/// let flags = Flags::EMPTY | Flags::NO_REPLY_EXPECTED;
/// assert!(flags & Flags::NO_REPLY_EXPECTED);
/// assert!(!(flags & Flags::NO_AUTO_START));
/// ```
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Flags(u8);

impl Flags {
    /// An empty set of flags.
    pub const EMPTY: Self = Self(0);
    /// No method return or error reply is expected for this message.
    pub const NO_REPLY_EXPECTED: Self = Self(1);
    /// The bus must not launch an owner for the destination name.
    pub const NO_AUTO_START: Self = Self(2);
    /// The caller is prepared to wait for interactive authorization.
    pub const ALLOW_INTERACTIVE_AUTHORIZATION: Self = Self(4);

    pub(crate) fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub(crate) fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Flags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Flags {
    type Output = bool;

    #[inline]
    fn bitand(self, rhs: Self) -> bool {
        self.0 & rhs.0 != 0
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flags({:#04x})", self.0)
    }
}

/// Header field codes of the `a(yv)` header-field array.
pub(crate) mod header_field {
    /// The object to send a call to, or the object a signal is emitted from.
    pub(crate) const PATH: u8 = 1;
    /// The interface to invoke a method call on, or that a signal is emitted from.
    pub(crate) const INTERFACE: u8 = 2;
    /// The member, either the method name or signal name.
    pub(crate) const MEMBER: u8 = 3;
    /// The name of the error that occurred, for errors.
    pub(crate) const ERROR_NAME: u8 = 4;
    /// The serial number of the message this message is a reply to.
    pub(crate) const REPLY_SERIAL: u8 = 5;
    /// The name of the connection this message is intended for.
    pub(crate) const DESTINATION: u8 = 6;
    /// Unique name of the sending connection.
    pub(crate) const SENDER: u8 = 7;
    /// The signature of the message body.
    pub(crate) const SIGNATURE: u8 = 8;
    /// The number of Unix file descriptors that accompany the message.
    pub(crate) const UNIX_FDS: u8 = 9;
}
