use super::{Signature, SignatureError};

use SignatureError::*;

macro_rules! test {
    ($input:expr, $expected:pat) => {{
        let actual = Signature::new($input);

        assert!(
            matches!(actual, $expected),
            "{actual:?} does not match {}",
            stringify!($expected)
        );
    }};
}

#[test]
fn signature_validation() {
    test!(b"", Ok(..));
    test!(b"sss", Ok(..));
    test!(b"i", Ok(..));
    test!(b"b", Ok(..));
    test!(b"ai", Ok(..));
    test!(b"(i)", Ok(..));
    test!(b"(a(ii))", Ok(..));
    test!(b"a{sv}", Ok(..));
    test!(b"aa{us}x", Ok(..));
    test!(b"w", Err(UnknownTypeCode(..)));
    test!(b"a", Err(MissingArrayElementType));
    test!(b"aaaaaa", Err(MissingArrayElementType));
    test!(b"ii(ii)a", Err(MissingArrayElementType));
    test!(b"ia", Err(MissingArrayElementType));
    test!(b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaai", Ok(..));
    test!(
        b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaai",
        Err(ExceededMaximumArrayRecursion)
    );
    test!(b")", Err(StructEndedButNotStarted));
    test!(b"}", Err(DictEndedButNotStarted));
    test!(b"i)", Err(StructEndedButNotStarted));
    test!(b"a)", Err(MissingArrayElementType));
    test!(b"(", Err(StructStartedButNotEnded));
    test!(b"(i", Err(StructStartedButNotEnded));
    test!(b"(iiiii", Err(StructStartedButNotEnded));
    test!(b"(ai", Err(StructStartedButNotEnded));
    test!(b"()", Err(StructHasNoFields));
    test!(b"(())", Err(StructHasNoFields));
    test!(b"a()", Err(StructHasNoFields));
    test!(b"i()", Err(StructHasNoFields));
    test!(b"()i", Err(StructHasNoFields));
    test!(b"(a)", Err(MissingArrayElementType));
    test!(b"a{}", Err(DictEntryMemberCount));
    test!(b"a{aii}", Err(DictKeyMustBeBasicType));
    test!(b"a{(ii)i}", Err(DictKeyMustBeBasicType));
    test!(b"a{vs}", Err(DictKeyMustBeBasicType));
    test!(b"a{i}", Err(DictEntryMemberCount));
    test!(b"{is}", Err(DictEntryNotInsideArray));
    test!(b"a{isi}", Err(DictEntryMemberCount));
    test!(b"a{is", Err(DictStartedButNotEnded));
    test!(b" ", Err(UnknownTypeCode(..)));
    test!(b"not a valid signature", Err(UnknownTypeCode(..)));
    test!(b"123", Err(UnknownTypeCode(..)));
    test!(b".", Err(UnknownTypeCode(..)));
    test!(b"h", Err(UnknownTypeCode(..)));
    test!(&[b'i'; 255], Ok(..));
    test!(&[b'i'; 256], Err(TooLong));
    test! {
        b"((((((((((((((((((((((((((((((((ii))))))))))))))))))))))))))))))))",
        Ok(..)
    };
    test! {
        b"(((((((((((((((((((((((((((((((((ii)))))))))))))))))))))))))))))))))",
        Err(ExceededMaximumStructRecursion)
    };
}

#[test]
fn split_top_level_types() -> Result<(), SignatureError> {
    let sig = Signature::new(b"yvs")?;
    let types = sig.iter().map(Signature::as_str).collect::<Vec<_>>();
    assert_eq!(types, ["y", "v", "s"]);

    let sig = Signature::new(b"(yv)s")?;
    let types = sig.iter().map(Signature::as_str).collect::<Vec<_>>();
    assert_eq!(types, ["(yv)", "s"]);

    let sig = Signature::new(b"a(a{us}v)ax")?;
    let types = sig.iter().map(Signature::as_str).collect::<Vec<_>>();
    assert_eq!(types, ["a(a{us}v)", "ax"]);

    assert_eq!(Signature::EMPTY.iter().count(), 0);
    Ok(())
}

#[test]
fn alignment_of_first_type() -> Result<(), SignatureError> {
    assert_eq!(Signature::new(b"y")?.alignment(), 1);
    assert_eq!(Signature::new(b"g")?.alignment(), 1);
    assert_eq!(Signature::new(b"v")?.alignment(), 1);
    assert_eq!(Signature::new(b"n")?.alignment(), 2);
    assert_eq!(Signature::new(b"q")?.alignment(), 2);
    assert_eq!(Signature::new(b"b")?.alignment(), 4);
    assert_eq!(Signature::new(b"i")?.alignment(), 4);
    assert_eq!(Signature::new(b"u")?.alignment(), 4);
    assert_eq!(Signature::new(b"s")?.alignment(), 4);
    assert_eq!(Signature::new(b"o")?.alignment(), 4);
    assert_eq!(Signature::new(b"ay")?.alignment(), 4);
    assert_eq!(Signature::new(b"x")?.alignment(), 8);
    assert_eq!(Signature::new(b"t")?.alignment(), 8);
    assert_eq!(Signature::new(b"d")?.alignment(), 8);
    assert_eq!(Signature::new(b"(y)")?.alignment(), 8);
    assert_eq!(Signature::EMPTY.alignment(), 1);
    Ok(())
}
