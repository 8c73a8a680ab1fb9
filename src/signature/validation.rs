use super::SignatureError;

/// The maximum serialized length of a signature.
pub(super) const MAX_SIGNATURE: usize = 255;

/// The maximum nesting of arrays and of structs.
const MAX_CONTAINER_DEPTH: usize = 32;

#[derive(Default, Clone, Copy)]
struct Depth {
    arrays: usize,
    structs: usize,
}

/// Validate a full signature as a sequence of complete types.
pub(super) fn validate(bytes: &[u8]) -> Result<(), SignatureError> {
    if bytes.len() > MAX_SIGNATURE {
        return Err(SignatureError::TooLong);
    }

    let mut pos = 0;

    while pos < bytes.len() {
        pos = consume_one(bytes, pos, Depth::default())?;
    }

    Ok(())
}

/// The end offset of the first complete type of an already-validated
/// signature.
pub(super) fn first_type_end(bytes: &[u8]) -> Result<usize, SignatureError> {
    consume_one(bytes, 0, Depth::default())
}

/// Test if a type code is a basic (non-container) type.
fn is_basic(b: u8) -> bool {
    matches!(
        b,
        b'y' | b'b' | b'n' | b'q' | b'i' | b'u' | b'x' | b't' | b'd' | b's' | b'o' | b'g'
    )
}

/// Consume one complete type starting at `pos`, returning the offset one
/// past its end. The caller ensures `pos` is in bounds.
fn consume_one(bytes: &[u8], pos: usize, depth: Depth) -> Result<usize, SignatureError> {
    match bytes[pos] {
        b if is_basic(b) => Ok(pos + 1),
        b'v' => Ok(pos + 1),
        b'a' => {
            if depth.arrays == MAX_CONTAINER_DEPTH {
                return Err(SignatureError::ExceededMaximumArrayRecursion);
            }

            let elem = pos + 1;

            if elem >= bytes.len() || matches!(bytes[elem], b')' | b'}') {
                return Err(SignatureError::MissingArrayElementType);
            }

            let depth = Depth {
                arrays: depth.arrays + 1,
                ..depth
            };

            if bytes[elem] == b'{' {
                consume_dict_entry(bytes, elem, depth)
            } else {
                consume_one(bytes, elem, depth)
            }
        }
        b'(' => {
            if depth.structs == MAX_CONTAINER_DEPTH {
                return Err(SignatureError::ExceededMaximumStructRecursion);
            }

            let depth = Depth {
                structs: depth.structs + 1,
                ..depth
            };

            let mut at = pos + 1;
            let mut fields = 0;

            loop {
                match bytes.get(at) {
                    None => return Err(SignatureError::StructStartedButNotEnded),
                    Some(b')') => {
                        if fields == 0 {
                            return Err(SignatureError::StructHasNoFields);
                        }

                        return Ok(at + 1);
                    }
                    Some(..) => {
                        at = consume_one(bytes, at, depth)?;
                        fields += 1;
                    }
                }
            }
        }
        b')' => Err(SignatureError::StructEndedButNotStarted),
        b'{' => Err(SignatureError::DictEntryNotInsideArray),
        b'}' => Err(SignatureError::DictEndedButNotStarted),
        b => Err(SignatureError::UnknownTypeCode(b as char)),
    }
}

/// Consume a `{KV}` dict entry whose opening brace is at `open`.
fn consume_dict_entry(bytes: &[u8], open: usize, depth: Depth) -> Result<usize, SignatureError> {
    let key = open + 1;

    match bytes.get(key) {
        None => return Err(SignatureError::DictStartedButNotEnded),
        Some(b'}') => return Err(SignatureError::DictEntryMemberCount),
        Some(&b) if !is_basic(b) => return Err(SignatureError::DictKeyMustBeBasicType),
        Some(..) => {}
    }

    let value = key + 1;

    match bytes.get(value) {
        None => return Err(SignatureError::DictStartedButNotEnded),
        Some(b'}') => return Err(SignatureError::DictEntryMemberCount),
        Some(..) => {}
    }

    let end = consume_one(bytes, value, depth)?;

    match bytes.get(end) {
        None => Err(SignatureError::DictStartedButNotEnded),
        Some(b'}') => Ok(end + 1),
        Some(..) => Err(SignatureError::DictEntryMemberCount),
    }
}
