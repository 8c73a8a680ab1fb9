//! The value emitter, mirroring the reader's layout rules.

use crate::buf::padding_to;
use crate::error::{ErrorKind, Result};
use crate::object_path;
use crate::proto::{Endianness, MAX_ARRAY_LENGTH};
use crate::signature::Signature;

use super::Value;

macro_rules! put {
    ($name:ident, $ty:ty) => {
        pub(crate) fn $name(&mut self, value: $ty) {
            let bytes = match self.endianness {
                Endianness::Little => value.to_le_bytes(),
                Endianness::Big => value.to_be_bytes(),
            };

            self.out.extend_from_slice(&bytes);
        }
    };
}

/// Writes values into a byte vector whose start is the alignment origin,
/// i.e. the start of a message or of a message body.
pub(crate) struct BodyWriter<'a> {
    out: &'a mut Vec<u8>,
    endianness: Endianness,
}

impl<'a> BodyWriter<'a> {
    pub(crate) fn new(out: &'a mut Vec<u8>, endianness: Endianness) -> Self {
        Self { out, endianness }
    }

    pub(crate) fn pos(&self) -> usize {
        self.out.len()
    }

    /// Emit zero padding up to the next multiple of `boundary`.
    pub(crate) fn pad_to(&mut self, boundary: usize) {
        let padding = padding_to(self.out.len(), boundary);

        for _ in 0..padding {
            self.out.push(0);
        }
    }

    pub(crate) fn put_u8(&mut self, value: u8) {
        self.out.push(value);
    }

    put!(put_u16, u16);
    put!(put_i16, i16);
    put!(put_u32, u32);
    put!(put_i32, i32);
    put!(put_u64, u64);
    put!(put_i64, i64);
    put!(put_f64, f64);

    pub(crate) fn put_slice(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Back-patch a previously written 32-bit slot.
    pub(crate) fn put_u32_at(&mut self, at: usize, value: u32) {
        let bytes = match self.endianness {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };

        self.out[at..at + 4].copy_from_slice(&bytes);
    }

    /// Write a length-prefixed, NUL-terminated string.
    pub(crate) fn put_str(&mut self, string: &str) -> Result<()> {
        if string.as_bytes().contains(&0) {
            return Err(ErrorKind::NulInString.into());
        }

        self.pad_to(4);
        self.put_u32(string.len() as u32);
        self.put_slice(string.as_bytes());
        self.put_u8(0);
        Ok(())
    }

    /// Write a one-byte-length-prefixed, NUL-terminated signature.
    pub(crate) fn put_signature(&mut self, signature: &Signature) {
        self.put_u8(signature.len() as u8);
        self.put_slice(signature.as_bytes());
        self.put_u8(0);
    }

    /// Write a single value, padding to its alignment boundary first.
    pub(crate) fn put_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Byte(v) => self.put_u8(*v),
            Value::Bool(v) => {
                self.pad_to(4);
                self.put_u32(u32::from(*v));
            }
            Value::Int16(v) => {
                self.pad_to(2);
                self.put_i16(*v);
            }
            Value::Uint16(v) => {
                self.pad_to(2);
                self.put_u16(*v);
            }
            Value::Int32(v) => {
                self.pad_to(4);
                self.put_i32(*v);
            }
            Value::Uint32(v) => {
                self.pad_to(4);
                self.put_u32(*v);
            }
            Value::Int64(v) => {
                self.pad_to(8);
                self.put_i64(*v);
            }
            Value::Uint64(v) => {
                self.pad_to(8);
                self.put_u64(*v);
            }
            Value::Double(v) => {
                self.pad_to(8);
                self.put_f64(*v);
            }
            Value::String(v) => {
                self.put_str(v)?;
            }
            Value::ObjectPath(v) => {
                object_path::ensure(v)?;
                self.put_str(v)?;
            }
            Value::Signature(v) => {
                self.put_signature(v);
            }
            Value::Variant(v) => {
                let signature = v.signature()?;
                self.put_signature(&signature);
                self.put_value(v)?;
            }
            Value::Struct(fields) => {
                self.pad_to(8);

                for field in fields {
                    self.put_value(field)?;
                }
            }
            Value::Array(elem, items) => {
                self.pad_to(4);
                let len_at = self.pos();
                self.put_u32(0);
                self.pad_to(elem.alignment());
                let start = self.pos();

                for item in items {
                    if item.signature()? != **elem {
                        return Err(ErrorKind::ElementTypeMismatch.into());
                    }

                    self.put_value(item)?;
                }

                self.patch_len(len_at, start)?;
            }
            Value::Dict(key_sig, value_sig, entries) => {
                self.pad_to(4);
                let len_at = self.pos();
                self.put_u32(0);
                self.pad_to(8);
                let start = self.pos();

                for (key, value) in entries {
                    if key.signature()? != **key_sig || value.signature()? != **value_sig {
                        return Err(ErrorKind::ElementTypeMismatch.into());
                    }

                    self.pad_to(8);
                    self.put_value(key)?;
                    self.put_value(value)?;
                }

                self.patch_len(len_at, start)?;
            }
        }

        Ok(())
    }

    fn patch_len(&mut self, len_at: usize, start: usize) -> Result<()> {
        let len = self.pos() - start;

        if len > MAX_ARRAY_LENGTH as usize {
            return Err(ErrorKind::ArrayTooLong(len as u32).into());
        }

        self.put_u32_at(len_at, len as u32);
        Ok(())
    }
}
