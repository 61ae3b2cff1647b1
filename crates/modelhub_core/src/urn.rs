//! Reversible mapping between backend identifiers and URL-safe tokens.
//!
//! Tokens are URL-safe base64 with the padding stripped, so they can sit in
//! URL paths, query strings and location fragments unescaped. Decoding
//! tolerates the stripped padding but rejects anything outside the token
//! alphabet instead of returning garbage.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Failure modes when reversing a token back into a backend identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("token contains characters outside the url-safe base64 alphabet")]
    InvalidCharacter,
    #[error("token length {0} is not a possible base64 length")]
    InvalidLength(usize),
    #[error("decoded identifier is not valid utf-8")]
    NotUtf8,
}

/// Encodes a backend identifier into a URL-safe token.
///
/// The output contains only `[A-Za-z0-9_-]`; trailing `=` padding is
/// stripped. Encoding never fails.
pub fn encode(id: &str) -> String {
    URL_SAFE_NO_PAD.encode(id.as_bytes())
}

/// Decodes a token produced by [`encode`], or any external value claiming
/// to be one.
///
/// The alphabet is validated up front so malformed input fails with a
/// [`DecodeError`] rather than decoding permissively.
pub fn decode(token: &str) -> Result<String, DecodeError> {
    if !token
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(DecodeError::InvalidCharacter);
    }
    // A base64 payload with padding stripped can never be 1 (mod 4) long.
    if token.len() % 4 == 1 {
        return Err(DecodeError::InvalidLength(token.len()));
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| DecodeError::InvalidLength(token.len()))?;
    String::from_utf8(bytes).map_err(|_| DecodeError::NotUtf8)
}
