use super::{validation, Signature};

/// Iterator over the top-level complete types of a [`Signature`], as
/// returned by [`Signature::iter`].
pub struct SignatureIter<'a> {
    rest: &'a [u8],
}

impl<'a> SignatureIter<'a> {
    pub(super) fn new(signature: &'a Signature) -> Self {
        Self {
            rest: signature.as_bytes(),
        }
    }
}

impl<'a> Iterator for SignatureIter<'a> {
    type Item = &'a Signature;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        // A constructed signature is valid, so splitting off its first
        // complete type cannot fail.
        let at = validation::first_type_end(self.rest).ok()?;
        let (head, rest) = self.rest.split_at(at);
        self.rest = rest;

        // SAFETY: A complete type out of a valid signature is itself a
        // valid signature.
        Some(unsafe { Signature::new_unchecked(head) })
    }
}
