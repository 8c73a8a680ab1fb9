//! Validation of the D-Bus object path grammar.
//!
//! A path is a `/`-rooted sequence of segments of `[A-Za-z0-9_]`, with no
//! empty segment and no trailing `/` except for the root path itself.

/// Error raised when validating an object path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid D-Bus object path")]
pub struct ObjectPathError;

/// Validate an object path.
pub(crate) fn validate(bytes: &[u8]) -> bool {
    let [b'/', rest @ ..] = bytes else {
        return false;
    };

    // The root path "/" has no segments.
    if rest.is_empty() {
        return true;
    }

    let mut in_segment = false;

    for &b in rest {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' => {
                in_segment = true;
            }
            b'/' => {
                if !in_segment {
                    return false;
                }

                in_segment = false;
            }
            _ => {
                return false;
            }
        }
    }

    in_segment
}

/// Validate an object path, raising [`ObjectPathError`] if it is invalid.
pub(crate) fn ensure(path: &str) -> Result<(), ObjectPathError> {
    if validate(path.as_bytes()) {
        Ok(())
    } else {
        Err(ObjectPathError)
    }
}

#[cfg(test)]
mod tests {
    use super::validate;

    #[test]
    fn valid_paths() {
        assert!(validate(b"/"));
        assert!(validate(b"/a"));
        assert!(validate(b"/org/freedesktop/DBus"));
        assert!(validate(b"/a/b_c/D9"));
    }

    #[test]
    fn invalid_paths() {
        assert!(!validate(b""));
        assert!(!validate(b"a"));
        assert!(!validate(b"//"));
        assert!(!validate(b"/a/"));
        assert!(!validate(b"/a//b"));
        assert!(!validate(b"/a-b"));
        assert!(!validate(b"/a b"));
        assert!(!validate(b"org/freedesktop/DBus"));
    }
}
