pub(crate) mod decode;
pub(crate) mod encode;


use std::num::NonZeroU32;

use crate::proto::{Endianness, Flags, MessageType};
use crate::signature::{OwnedSignature, SignatureError};
use crate::value::Value;

/// The kind of a [`Message`], carrying the header fields the kind
/// requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// A method call addressed to `path`.
    MethodCall {
        /// The object path the call is addressed to.
        path: Box<str>,
        /// The method being called.
        member: Box<str>,
    },
    /// A reply to the method call with the given serial.
    MethodReturn {
        /// The serial of the call this replies to.
        reply_serial: NonZeroU32,
    },
    /// An error reply to the method call with the given serial.
    Error {
        /// The name of the error that occurred.
        error_name: Box<str>,
        /// The serial of the call this replies to.
        reply_serial: NonZeroU32,
    },
    /// A signal emission.
    Signal {
        /// The object path the signal is emitted from.
        path: Box<str>,
        /// The interface the signal belongs to.
        interface: Box<str>,
        /// The name of the signal.
        member: Box<str>,
    },
}

/// A parsed D-Bus message.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroU32;
///
/// use dbus_wire::{Flags, Message, Value};
///
/// let serial = NonZeroU32::new(1).unwrap();
///
/// let m = Message::method_call("/org/freedesktop/DBus", "RequestName", serial)
///     .with_destination("org.freedesktop.DBus")
///     .with_body(vec![Value::from("se.example.Name"), Value::from(0u32)]);
///
/// assert_eq!(m.signature()?.as_str(), "su");
/// assert_eq!(m.flags(), Flags::EMPTY);
/// # Ok::<_, dbus_wire::SignatureError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub(crate) kind: MessageKind,
    pub(crate) serial: NonZeroU32,
    pub(crate) flags: Flags,
    pub(crate) endianness: Endianness,
    pub(crate) interface: Option<Box<str>>,
    pub(crate) destination: Option<Box<str>>,
    pub(crate) sender: Option<Box<str>>,
    pub(crate) unix_fds: Option<u32>,
    pub(crate) body: Vec<Value>,
}

impl Message {
    fn new(kind: MessageKind, serial: NonZeroU32) -> Self {
        Self {
            kind,
            serial,
            flags: Flags::EMPTY,
            endianness: Endianness::NATIVE,
            interface: None,
            destination: None,
            sender: None,
            unix_fds: None,
            body: Vec::new(),
        }
    }

    /// Construct a method call message.
    ///
    /// The path is validated when the message is encoded.
    pub fn method_call(path: &str, member: &str, serial: NonZeroU32) -> Self {
        Self::new(
            MessageKind::MethodCall {
                path: path.into(),
                member: member.into(),
            },
            serial,
        )
    }

    /// Construct a method return message replying to `reply_serial`.
    pub fn method_return(reply_serial: NonZeroU32, serial: NonZeroU32) -> Self {
        Self::new(MessageKind::MethodReturn { reply_serial }, serial)
    }

    /// Construct an error message replying to `reply_serial`.
    pub fn error(error_name: &str, reply_serial: NonZeroU32, serial: NonZeroU32) -> Self {
        Self::new(
            MessageKind::Error {
                error_name: error_name.into(),
                reply_serial,
            },
            serial,
        )
    }

    /// Construct a signal message.
    pub fn signal(path: &str, interface: &str, member: &str, serial: NonZeroU32) -> Self {
        Self::new(
            MessageKind::Signal {
                path: path.into(),
                interface: interface.into(),
                member: member.into(),
            },
            serial,
        )
    }

    /// The kind of the message.
    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// The wire type corresponding to the kind of this message.
    pub fn message_type(&self) -> MessageType {
        match &self.kind {
            MessageKind::MethodCall { .. } => MessageType::MethodCall,
            MessageKind::MethodReturn { .. } => MessageType::MethodReturn,
            MessageKind::Error { .. } => MessageType::Error,
            MessageKind::Signal { .. } => MessageType::Signal,
        }
    }

    /// The serial of the message.
    pub fn serial(&self) -> NonZeroU32 {
        self.serial
    }

    /// Modify the serial of the message.
    pub fn with_serial(self, serial: NonZeroU32) -> Self {
        Self { serial, ..self }
    }

    /// The flags of the message.
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Modify the flags of the message.
    pub fn with_flags(self, flags: Flags) -> Self {
        Self { flags, ..self }
    }

    /// The endianness the message was or will be encoded at.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Modify the endianness the message will be encoded at.
    pub fn with_endianness(self, endianness: Endianness) -> Self {
        Self { endianness, ..self }
    }

    /// The interface of the message, if any.
    ///
    /// For signals the interface lives in [`MessageKind::Signal`].
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    /// Modify the interface of the message.
    pub fn with_interface(self, interface: &str) -> Self {
        Self {
            interface: Some(interface.into()),
            ..self
        }
    }

    /// The destination of the message, if any.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Modify the destination of the message.
    pub fn with_destination(self, destination: &str) -> Self {
        Self {
            destination: Some(destination.into()),
            ..self
        }
    }

    /// The sender of the message, if any.
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Modify the sender of the message.
    pub fn with_sender(self, sender: &str) -> Self {
        Self {
            sender: Some(sender.into()),
            ..self
        }
    }

    /// The number of Unix file descriptors accompanying the message.
    pub fn unix_fds(&self) -> Option<u32> {
        self.unix_fds
    }

    /// Modify the number of Unix file descriptors accompanying the
    /// message.
    pub fn with_unix_fds(self, unix_fds: u32) -> Self {
        Self {
            unix_fds: Some(unix_fds),
            ..self
        }
    }

    /// The decoded body of the message.
    pub fn body(&self) -> &[Value] {
        &self.body
    }

    /// Replace the body of the message.
    pub fn with_body(self, body: Vec<Value>) -> Self {
        Self { body, ..self }
    }

    /// The signature describing the body of the message.
    pub fn signature(&self) -> Result<OwnedSignature, SignatureError> {
        let mut out = Vec::new();

        for value in &self.body {
            out.extend_from_slice(value.signature()?.as_bytes());
        }

        OwnedSignature::new(&out)
    }
}
