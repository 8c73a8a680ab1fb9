//! The signature-directed value reader.

use crate::buf::RecvBuf;
use crate::error::{ErrorKind, Result};
use crate::object_path;
use crate::proto::MAX_ARRAY_LENGTH;
use crate::signature::{OwnedSignature, Signature, SignatureError};

use super::Value;

/// Read a single value of the given complete type.
///
/// Alignment is enforced before each value, measured from the start of the
/// message the buffer cursor is positioned in.
pub(crate) fn read_value(buf: &mut RecvBuf, sig: &Signature) -> Result<Value> {
    let bytes = sig.as_bytes();

    let Some(&code) = bytes.first() else {
        return Err(SignatureError::NotSingleCompleteType.into());
    };

    match code {
        b'y' => Ok(Value::Byte(buf.load_u8()?)),
        b'b' => {
            buf.align(4)?;

            match buf.load_u32()? {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                n => Err(ErrorKind::InvalidBool(n).into()),
            }
        }
        b'n' => {
            buf.align(2)?;
            Ok(Value::Int16(buf.load_i16()?))
        }
        b'q' => {
            buf.align(2)?;
            Ok(Value::Uint16(buf.load_u16()?))
        }
        b'i' => {
            buf.align(4)?;
            Ok(Value::Int32(buf.load_i32()?))
        }
        b'u' => {
            buf.align(4)?;
            Ok(Value::Uint32(buf.load_u32()?))
        }
        b'x' => {
            buf.align(8)?;
            Ok(Value::Int64(buf.load_i64()?))
        }
        b't' => {
            buf.align(8)?;
            Ok(Value::Uint64(buf.load_u64()?))
        }
        b'd' => {
            buf.align(8)?;
            Ok(Value::Double(buf.load_f64()?))
        }
        b's' => Ok(Value::String(read_string(buf)?)),
        b'o' => {
            let path = read_string(buf)?;
            object_path::ensure(&path)?;
            Ok(Value::ObjectPath(path))
        }
        b'g' => Ok(Value::Signature(read_signature(buf)?)),
        b'v' => Ok(Value::Variant(Box::new(read_variant(buf)?))),
        b'(' => {
            buf.align(8)?;

            // SAFETY: The field types of a valid struct signature form a
            // valid signature.
            let inner = unsafe { Signature::new_unchecked(&bytes[1..bytes.len() - 1]) };
            let mut fields = Vec::new();

            for field in inner.iter() {
                fields.push(read_value(buf, field)?);
            }

            Ok(Value::Struct(fields))
        }
        b'a' if bytes.get(1) == Some(&b'{') => read_dict(buf, bytes),
        b'a' => {
            // SAFETY: The element type of a valid array signature is a
            // valid signature.
            let elem = unsafe { Signature::new_unchecked(&bytes[1..]) };

            buf.align(4)?;
            let len = buf.load_u32()?;

            if len > MAX_ARRAY_LENGTH {
                return Err(ErrorKind::ArrayTooLong(len).into());
            }

            // Element alignment padding is mandatory even for an empty
            // array and is not counted in the array length.
            buf.align(elem.alignment())?;

            let end = buf.pos() + len as usize;
            let mut items = Vec::new();

            while buf.pos() < end {
                items.push(read_value(buf, elem)?);
            }

            if buf.pos() != end {
                return Err(ErrorKind::LengthOverrun.into());
            }

            Ok(Value::Array(elem.to_owned(), items))
        }
        _ => Err(SignatureError::UnknownTypeCode(code as char).into()),
    }
}

/// Read a variant: a signature of exactly one complete type followed by a
/// value of that type.
pub(crate) fn read_variant(buf: &mut RecvBuf) -> Result<Value> {
    let sig = read_signature(buf)?;

    let mut types = sig.iter();

    let Some(inner) = types.next() else {
        return Err(SignatureError::NotSingleCompleteType.into());
    };

    if types.next().is_some() {
        return Err(SignatureError::NotSingleCompleteType.into());
    }

    read_value(buf, inner)
}

/// Read a dict `a{KV}` as an array of dict entries.
fn read_dict(buf: &mut RecvBuf, bytes: &[u8]) -> Result<Value> {
    // SAFETY: The key of a valid dict-entry signature is a single basic
    // type and the value is a complete type.
    let key_sig = unsafe { Signature::new_unchecked(&bytes[2..3]) };
    let value_sig = unsafe { Signature::new_unchecked(&bytes[3..bytes.len() - 1]) };

    buf.align(4)?;
    let len = buf.load_u32()?;

    if len > MAX_ARRAY_LENGTH {
        return Err(ErrorKind::ArrayTooLong(len).into());
    }

    // Dict entries align like structs, even when the dict is empty.
    buf.align(8)?;

    let end = buf.pos() + len as usize;
    let mut entries = Vec::<(Value, Value)>::new();

    while buf.pos() < end {
        buf.align(8)?;
        let key = read_value(buf, key_sig)?;
        let value = read_value(buf, value_sig)?;

        // Last write wins on duplicate keys.
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }

    if buf.pos() != end {
        return Err(ErrorKind::LengthOverrun.into());
    }

    Ok(Value::Dict(key_sig.to_owned(), value_sig.to_owned(), entries))
}

/// Read a length-prefixed, NUL-terminated string.
fn read_string(buf: &mut RecvBuf) -> Result<String> {
    buf.align(4)?;
    let len = buf.load_u32()? as usize;
    let bytes = buf.consume(len + 1)?;

    if bytes[len] != 0 {
        return Err(ErrorKind::NotNullTerminated.into());
    }

    let bytes = &bytes[..len];

    if bytes.contains(&0) {
        return Err(ErrorKind::NulInString.into());
    }

    Ok(std::str::from_utf8(bytes)?.to_owned())
}

/// Read a one-byte-length-prefixed, NUL-terminated signature.
pub(crate) fn read_signature(buf: &mut RecvBuf) -> Result<OwnedSignature> {
    let len = buf.load_u8()? as usize;
    let bytes = buf.consume(len + 1)?;

    if bytes[len] != 0 {
        return Err(ErrorKind::NotNullTerminated.into());
    }

    Ok(OwnedSignature::new(&bytes[..len])?)
}
