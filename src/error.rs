/// The crate-wide error taxonomy.
///
/// Every fallible operation in the stack returns one of these; errors are
/// never caught internally, only propagated to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A destination buffer is too small or a configured maximum was exceeded.
    #[error("buffer too small or configured maximum exceeded")]
    Oversize,
    /// A required TLV type marker did not match.
    #[error("unexpected TLV type {found}")]
    WrongTlvType { found: u32 },
    /// A malformed name URI or a malformed (e.g. non-minimal) varint.
    #[error("invalid format")]
    InvalidFormat,
    /// The input ended in the middle of an element.
    #[error("truncated input")]
    BufferUnderflow,
    #[error("unsupported signature type")]
    UnsupportedSignatureType,
    #[error("wrong signature size")]
    WrongSignatureSize,
    #[error("signature verification failed")]
    VerificationFailed,
    /// No callback table entry matched the dispatched packet.
    #[error("no matched callback")]
    NoMatchedCallback,
    #[error("application face callback table is full")]
    CallbackTableFull,
}
