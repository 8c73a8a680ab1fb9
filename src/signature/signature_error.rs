/// An error raised when validating a D-Bus type signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("signature is longer than 255 bytes")]
    TooLong,
    #[error("unknown type code `{0}`")]
    UnknownTypeCode(char),
    #[error("array is missing an element type")]
    MissingArrayElementType,
    #[error("exceeded maximum array recursion")]
    ExceededMaximumArrayRecursion,
    #[error("exceeded maximum struct recursion")]
    ExceededMaximumStructRecursion,
    #[error("struct has no field types")]
    StructHasNoFields,
    #[error("struct started but not ended")]
    StructStartedButNotEnded,
    #[error("struct ended but not started")]
    StructEndedButNotStarted,
    #[error("dict entry started but not ended")]
    DictStartedButNotEnded,
    #[error("dict entry ended but not started")]
    DictEndedButNotStarted,
    #[error("dict entry is only valid as an array element")]
    DictEntryNotInsideArray,
    #[error("dict entry key must be a basic type")]
    DictKeyMustBeBasicType,
    #[error("dict entry must have exactly one key and one value type")]
    DictEntryMemberCount,
    #[error("expected exactly one complete type")]
    NotSingleCompleteType,
}
