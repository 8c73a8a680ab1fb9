use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use super::{Signature, SignatureError};

/// An owned, validated D-Bus type signature.
///
/// Dereferences to [`Signature`].
#[derive(Clone, Hash, PartialEq, Eq)]
pub struct OwnedSignature(Vec<u8>);

impl OwnedSignature {
    /// Construct a new empty signature.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Construct a new signature with validation.
    pub fn new(signature: &[u8]) -> Result<Self, SignatureError> {
        Ok(Signature::new(signature)?.to_owned())
    }

    /// Construct from an already-validated byte slice.
    ///
    /// # Safety
    ///
    /// The bytes must form a valid signature.
    pub(super) unsafe fn from_slice_unchecked(signature: &[u8]) -> Self {
        Self(signature.to_vec())
    }
}

impl Deref for OwnedSignature {
    type Target = Signature;

    #[inline]
    fn deref(&self) -> &Signature {
        // SAFETY: The contents are valid by construction.
        unsafe { Signature::new_unchecked(&self.0) }
    }
}

impl Borrow<Signature> for OwnedSignature {
    #[inline]
    fn borrow(&self) -> &Signature {
        self
    }
}

impl AsRef<Signature> for OwnedSignature {
    #[inline]
    fn as_ref(&self) -> &Signature {
        self
    }
}

impl From<&Signature> for OwnedSignature {
    #[inline]
    fn from(signature: &Signature) -> Self {
        signature.to_owned()
    }
}

impl fmt::Debug for OwnedSignature {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OwnedSignature").field(&self.as_str()).finish()
    }
}

impl fmt::Display for OwnedSignature {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<Signature> for OwnedSignature {
    #[inline]
    fn eq(&self, other: &Signature) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&Signature> for OwnedSignature {
    #[inline]
    fn eq(&self, other: &&Signature) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<OwnedSignature> for Signature {
    #[inline]
    fn eq(&self, other: &OwnedSignature) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<OwnedSignature> for &Signature {
    #[inline]
    fn eq(&self, other: &OwnedSignature) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}
