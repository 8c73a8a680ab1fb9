//! The transactional message reader.

use std::num::NonZeroU32;

use crate::buf::RecvBuf;
use crate::error::{Error, ErrorKind, Result};
use crate::proto::{
    header_field, Endianness, Flags, MessageType, FIXED_HEADER_LEN, MAX_ARRAY_LENGTH,
    MAX_BODY_LENGTH, PROTOCOL_VERSION,
};
use crate::signature::{OwnedSignature, Signature};
use crate::value::read::{read_value, read_variant};
use crate::value::Value;

use super::{Message, MessageKind};

/// Read one message from the buffer.
///
/// Either a complete message is returned and its bytes are consumed, or
/// `None` is returned and the cursor is left where it was. Any other error
/// is fatal to the stream.
///
/// The buffer cursor must sit at the start of a message, which is offset
/// zero under the decoder's compact-per-message policy.
pub(crate) fn read_message(buf: &mut RecvBuf) -> Result<Option<Message>> {
    debug_assert_eq!(buf.pos(), 0, "messages are aligned from their first byte");

    let checkpoint = buf.checkpoint();

    match try_read_message(buf) {
        Ok(message) => Ok(Some(message)),
        Err(e) if e.is_need_more() => {
            buf.rollback(checkpoint);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Header field slots populated from the `a(yv)` header-field array.
#[derive(Default)]
struct HeaderFields {
    path: Option<String>,
    interface: Option<String>,
    member: Option<String>,
    error_name: Option<String>,
    reply_serial: Option<u32>,
    destination: Option<String>,
    sender: Option<String>,
    signature: Option<OwnedSignature>,
    unix_fds: Option<u32>,
}

fn try_read_message(buf: &mut RecvBuf) -> Result<Message> {
    if buf.remaining() < FIXED_HEADER_LEN {
        return Err(Error::need_more());
    }

    let endian = buf.load_u8()?;

    let Some(endianness) = Endianness::from_byte(endian) else {
        return Err(ErrorKind::InvalidEndianness(endian).into());
    };

    buf.set_endianness(endianness);

    let message_type = buf.load_u8()?;

    let Some(message_type) = MessageType::from_byte(message_type) else {
        return Err(ErrorKind::InvalidMessageType(message_type).into());
    };

    let flags = Flags::from_bits(buf.load_u8()?);
    let version = buf.load_u8()?;

    if version != PROTOCOL_VERSION {
        return Err(ErrorKind::InvalidProtocolVersion(version).into());
    }

    let body_length = buf.load_u32()?;

    if body_length > MAX_BODY_LENGTH {
        return Err(ErrorKind::BodyTooLong(body_length).into());
    }

    let Some(serial) = NonZeroU32::new(buf.load_u32()?) else {
        return Err(ErrorKind::ZeroSerial.into());
    };

    // Header field array, signature a(yv): length prefix, then struct
    // elements at 8-byte boundaries.
    let fields_length = buf.load_u32()?;

    if fields_length > MAX_ARRAY_LENGTH {
        return Err(ErrorKind::ArrayTooLong(fields_length).into());
    }

    buf.align(8)?;

    if buf.remaining() < fields_length as usize {
        return Err(Error::need_more());
    }

    let previous = buf.set_fence(fields_length as usize);
    let fields = read_header_fields(buf);
    buf.clear_fence(previous);
    let fields = fields.map_err(bounded)?;

    // The body begins at the next 8-byte boundary.
    buf.align(8)?;

    if buf.remaining() < body_length as usize {
        return Err(Error::need_more());
    }

    let body_start = buf.pos();
    let previous = buf.set_fence(body_length as usize);
    let body = read_body(buf, fields.signature.as_deref());
    buf.clear_fence(previous);
    let body = body.map_err(bounded)?;

    if buf.pos() != body_start + body_length as usize {
        return Err(ErrorKind::BodySignatureMismatch.into());
    }

    let (kind, fields) = message_kind(message_type, fields)?;

    let HeaderFields {
        interface,
        destination,
        sender,
        unix_fds,
        ..
    } = fields;

    Ok(Message {
        kind,
        serial,
        flags,
        endianness,
        interface: interface.map(Into::into),
        destination: destination.map(Into::into),
        sender: sender.map(Into::into),
        unix_fds,
        body,
    })
}

/// Inside a fenced region all required bytes are known to be buffered, so
/// running out means the encoded content overran its declared length.
fn bounded(e: Error) -> Error {
    if e.is_need_more() {
        Error::new(ErrorKind::LengthOverrun)
    } else {
        e
    }
}

fn read_header_fields(buf: &mut RecvBuf) -> Result<HeaderFields> {
    let mut fields = HeaderFields::default();

    while buf.remaining() > 0 {
        buf.align(8)?;
        let code = buf.load_u8()?;
        let value = read_variant(buf)?;
        apply_header_field(&mut fields, code, value)?;
    }

    Ok(fields)
}

/// Populate the field slot selected by `code`. Unknown codes are ignored
/// by construction; a known code carrying the wrong value type is a decode
/// error.
fn apply_header_field(fields: &mut HeaderFields, code: u8, value: Value) -> Result<()> {
    match (code, value) {
        (header_field::PATH, Value::ObjectPath(v)) => fields.path = Some(v),
        (header_field::INTERFACE, Value::String(v)) => fields.interface = Some(v),
        (header_field::MEMBER, Value::String(v)) => fields.member = Some(v),
        (header_field::ERROR_NAME, Value::String(v)) => fields.error_name = Some(v),
        (header_field::REPLY_SERIAL, Value::Uint32(v)) => fields.reply_serial = Some(v),
        (header_field::DESTINATION, Value::String(v)) => fields.destination = Some(v),
        (header_field::SENDER, Value::String(v)) => fields.sender = Some(v),
        (header_field::SIGNATURE, Value::Signature(v)) => fields.signature = Some(v),
        (header_field::UNIX_FDS, Value::Uint32(v)) => fields.unix_fds = Some(v),
        (code @ header_field::PATH..=header_field::UNIX_FDS, ..) => {
            return Err(ErrorKind::HeaderFieldMismatch(code).into());
        }
        _ => {}
    }

    Ok(())
}

fn read_body(buf: &mut RecvBuf, signature: Option<&Signature>) -> Result<Vec<Value>> {
    let Some(signature) = signature else {
        if buf.remaining() != 0 {
            return Err(ErrorKind::BodySignatureMismatch.into());
        }

        return Ok(Vec::new());
    };

    let mut body = Vec::new();

    for ty in signature.iter() {
        body.push(read_value(buf, ty)?);
    }

    Ok(body)
}

/// Validate the required header fields for the message type and build the
/// message kind.
fn message_kind(
    message_type: MessageType,
    mut fields: HeaderFields,
) -> Result<(MessageKind, HeaderFields)> {
    let kind = match message_type {
        MessageType::MethodCall => MessageKind::MethodCall {
            path: required(fields.path.take(), ErrorKind::MissingPath)?,
            member: required(fields.member.take(), ErrorKind::MissingMember)?,
        },
        MessageType::MethodReturn => MessageKind::MethodReturn {
            reply_serial: reply_serial(fields.reply_serial)?,
        },
        MessageType::Error => MessageKind::Error {
            error_name: required(fields.error_name.take(), ErrorKind::MissingErrorName)?,
            reply_serial: reply_serial(fields.reply_serial)?,
        },
        MessageType::Signal => MessageKind::Signal {
            path: required(fields.path.take(), ErrorKind::MissingPath)?,
            interface: required(fields.interface.take(), ErrorKind::MissingInterface)?,
            member: required(fields.member.take(), ErrorKind::MissingMember)?,
        },
    };

    Ok((kind, fields))
}

fn required(field: Option<String>, missing: ErrorKind) -> Result<Box<str>> {
    match field {
        Some(value) => Ok(value.into()),
        None => Err(missing.into()),
    }
}

fn reply_serial(field: Option<u32>) -> Result<NonZeroU32> {
    let Some(serial) = field else {
        return Err(ErrorKind::MissingReplySerial.into());
    };

    NonZeroU32::new(serial).ok_or_else(|| ErrorKind::ZeroReplySerial.into())
}
