pub use self::signature_error::SignatureError;
mod signature_error;

pub use self::iter::SignatureIter;
mod iter;

pub use self::owned_signature::OwnedSignature;
mod owned_signature;

mod validation;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::from_utf8_unchecked;

/// A validated D-Bus type signature.
///
/// # Examples
///
/// ```
/// use dbus_wire::Signature;
///
/// let sig = Signature::new(b"a{sv}ai")?;
///
/// let mut it = sig.iter();
/// assert_eq!(it.next().map(|s| s.as_str()), Some("a{sv}"));
/// assert_eq!(it.next().map(|s| s.as_str()), Some("ai"));
/// assert_eq!(it.next(), None);
/// # Ok::<_, dbus_wire::SignatureError>(())
/// ```
#[derive(Hash, PartialEq, Eq)]
#[repr(transparent)]
pub struct Signature([u8]);

impl Signature {
    /// The empty signature.
    pub const EMPTY: &'static Signature = unsafe { Signature::new_unchecked(&[]) };

    /// Construct a new signature with validation.
    pub fn new(signature: &[u8]) -> Result<&Signature, SignatureError> {
        validation::validate(signature)?;
        // SAFETY: The signature was just validated.
        Ok(unsafe { Self::new_unchecked(signature) })
    }

    /// Construct a new signature without validation. The caller is
    /// responsible for ensuring that the signature is valid.
    ///
    /// # Safety
    ///
    /// The bytes must form a valid signature.
    pub(crate) const unsafe fn new_unchecked(signature: &[u8]) -> &Self {
        // SAFETY: The type is repr(transparent) over [u8].
        &*(signature as *const [u8] as *const Signature)
    }

    /// Test if the signature is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The length of the signature in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the signature as a string.
    pub fn as_str(&self) -> &str {
        // SAFETY: Valid signatures only contain ASCII type codes.
        unsafe { from_utf8_unchecked(&self.0) }
    }

    /// Get the signature as a byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Iterate over the top-level complete types of the signature.
    pub fn iter(&self) -> SignatureIter<'_> {
        SignatureIter::new(self)
    }

    /// The alignment boundary of the first complete type, in bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbus_wire::Signature;
    ///
    /// assert_eq!(Signature::new(b"y")?.alignment(), 1);
    /// assert_eq!(Signature::new(b"ai")?.alignment(), 4);
    /// assert_eq!(Signature::new(b"(yy)")?.alignment(), 8);
    /// # Ok::<_, dbus_wire::SignatureError>(())
    /// ```
    pub fn alignment(&self) -> usize {
        match self.0.first() {
            Some(b'y' | b'g' | b'v') => 1,
            Some(b'n' | b'q') => 2,
            Some(b'b' | b'i' | b'u' | b's' | b'o' | b'a') => 4,
            Some(b'x' | b't' | b'd' | b'(' | b'{') => 8,
            _ => 1,
        }
    }
}

impl fmt::Debug for Signature {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signature").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Signature {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<Signature> for Signature {
    #[inline]
    fn as_ref(&self) -> &Signature {
        self
    }
}

impl ToOwned for Signature {
    type Owned = OwnedSignature;

    #[inline]
    fn to_owned(&self) -> Self::Owned {
        // SAFETY: This signature is valid by construction.
        unsafe { OwnedSignature::from_slice_unchecked(&self.0) }
    }
}

impl PartialEq<[u8]> for Signature {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == *other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for Signature {
    #[inline]
    fn eq(&self, other: &[u8; N]) -> bool {
        self.0 == other[..]
    }
}

impl PartialEq<str> for Signature {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0 == *other.as_bytes()
    }
}
