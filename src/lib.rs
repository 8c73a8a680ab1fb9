//! An incremental codec for the D-Bus wire format.
//!
//! The [`Decoder`] consumes a byte stream in arbitrary-sized chunks and
//! yields fully-parsed [`Message`] values, driving the textual SASL
//! handshake and the binary message phase over the same stream. The
//! symmetric encoder lives behind [`SendBuf`].
//!
//! # Examples
//!
//! ```
//! use dbus_wire::{Decoder, Message, SendBuf};
//!
//! let mut send = SendBuf::new();
//! let serial = send.next_serial();
//!
//! let m = Message::method_call("/org/freedesktop/DBus", "Hello", serial)
//!     .with_interface("org.freedesktop.DBus")
//!     .with_destination("org.freedesktop.DBus");
//!
//! send.write_message(&m)?;
//!
//! let mut decoder = Decoder::authenticated();
//! decoder.feed(send.get());
//!
//! let decoded = decoder.read_message()?.expect("a complete message");
//! assert_eq!(decoded, m);
//! # Ok::<_, dbus_wire::Error>(())
//! ```

#[doc(inline)]
pub use self::error::{Error, Result};
mod error;

#[doc(inline)]
pub use self::proto::{Endianness, Flags, MessageType};
pub mod proto;

pub use self::buf::RecvBuf;
mod buf;

#[doc(inline)]
pub use self::signature::{OwnedSignature, Signature, SignatureError};
mod signature;

pub use self::object_path::ObjectPathError;
mod object_path;

pub use self::value::Value;
mod value;

pub use self::message::{Message, MessageKind};
mod message;

pub mod sasl;

pub use self::decoder::{Decoder, Phase};
mod decoder;

pub use self::send_buf::SendBuf;
mod send_buf;

#[cfg(feature = "tokio")]
pub use self::connection::{Connection, Transport};
#[cfg(feature = "tokio")]
mod connection;
