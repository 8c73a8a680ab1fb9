//! The symmetric message writer.

use crate::error::{ErrorKind, Result};
use crate::proto::{header_field, MAX_ARRAY_LENGTH, MAX_BODY_LENGTH, PROTOCOL_VERSION};
use crate::value::write::BodyWriter;
use crate::value::Value;

use super::{Message, MessageKind};

/// Encode a message into a standalone byte vector.
///
/// The body is encoded first so the fixed header can carry its length up
/// front; the header-field array length is back-patched once the fields
/// are written.
pub(crate) fn encode_message(message: &Message) -> Result<Vec<u8>> {
    let endianness = message.endianness;
    let signature = message.signature()?;

    let mut body = Vec::new();

    {
        let mut w = BodyWriter::new(&mut body, endianness);

        for value in &message.body {
            w.put_value(value)?;
        }
    }

    if body.len() > MAX_BODY_LENGTH as usize {
        return Err(ErrorKind::BodyTooLong(body.len() as u32).into());
    }

    let mut out = Vec::new();
    let mut w = BodyWriter::new(&mut out, endianness);

    w.put_u8(endianness.to_byte());
    w.put_u8(message.message_type().to_byte());
    w.put_u8(message.flags.bits());
    w.put_u8(PROTOCOL_VERSION);
    w.put_u32(body.len() as u32);
    w.put_u32(message.serial.get());

    let fields_len_at = w.pos();
    w.put_u32(0);
    w.pad_to(8);
    let fields_start = w.pos();

    match &message.kind {
        MessageKind::MethodCall { path, member } => {
            put_field(&mut w, header_field::PATH, &Value::ObjectPath(path.to_string()))?;
            put_field(&mut w, header_field::MEMBER, &Value::String(member.to_string()))?;
        }
        MessageKind::MethodReturn { reply_serial } => {
            put_field(
                &mut w,
                header_field::REPLY_SERIAL,
                &Value::Uint32(reply_serial.get()),
            )?;
        }
        MessageKind::Error {
            error_name,
            reply_serial,
        } => {
            put_field(
                &mut w,
                header_field::ERROR_NAME,
                &Value::String(error_name.to_string()),
            )?;
            put_field(
                &mut w,
                header_field::REPLY_SERIAL,
                &Value::Uint32(reply_serial.get()),
            )?;
        }
        MessageKind::Signal {
            path,
            interface,
            member,
        } => {
            put_field(&mut w, header_field::PATH, &Value::ObjectPath(path.to_string()))?;
            put_field(
                &mut w,
                header_field::INTERFACE,
                &Value::String(interface.to_string()),
            )?;
            put_field(&mut w, header_field::MEMBER, &Value::String(member.to_string()))?;
        }
    }

    // A signal's interface is carried by its kind.
    if !matches!(&message.kind, MessageKind::Signal { .. }) {
        if let Some(interface) = &message.interface {
            put_field(
                &mut w,
                header_field::INTERFACE,
                &Value::String(interface.to_string()),
            )?;
        }
    }

    if let Some(destination) = &message.destination {
        put_field(
            &mut w,
            header_field::DESTINATION,
            &Value::String(destination.to_string()),
        )?;
    }

    if let Some(sender) = &message.sender {
        put_field(
            &mut w,
            header_field::SENDER,
            &Value::String(sender.to_string()),
        )?;
    }

    if !signature.is_empty() {
        put_field(
            &mut w,
            header_field::SIGNATURE,
            &Value::Signature(signature),
        )?;
    }

    if let Some(unix_fds) = message.unix_fds {
        put_field(&mut w, header_field::UNIX_FDS, &Value::Uint32(unix_fds))?;
    }

    let fields_len = w.pos() - fields_start;

    if fields_len > MAX_ARRAY_LENGTH as usize {
        return Err(ErrorKind::ArrayTooLong(fields_len as u32).into());
    }

    w.put_u32_at(fields_len_at, fields_len as u32);

    // The body begins at the next 8-byte boundary.
    w.pad_to(8);
    drop(w);

    out.extend_from_slice(&body);
    Ok(out)
}

/// Write one `(yv)` element of the header-field array.
fn put_field(w: &mut BodyWriter<'_>, code: u8, value: &Value) -> Result<()> {
    w.pad_to(8);
    w.put_u8(code);
    let signature = value.signature()?;
    w.put_signature(&signature);
    w.put_value(value)
}
