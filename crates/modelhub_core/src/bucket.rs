//! Bucket-key sanitization and validation.

/// Minimum length of a bucket key after sanitization.
pub const MIN_KEY_LEN: usize = 3;
/// Maximum length of a bucket key after sanitization.
pub const MAX_KEY_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BucketKeyError {
    #[error("bucket name \"{name}\" is too short after sanitization (minimum {MIN_KEY_LEN} characters)")]
    TooShort { name: String },
    #[error("bucket name \"{name}\" is too long after sanitization (maximum {MAX_KEY_LEN} characters)")]
    TooLong { name: String },
}

/// Maps an arbitrary display name onto the backend's bucket-key alphabet.
///
/// Lowercases, replaces anything outside `[a-z0-9_-]` with `-`, collapses
/// runs of `-`, and trims leading/trailing `-`. `"My Bucket!"` becomes
/// `"my-bucket"`.
pub fn sanitize_bucket_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    let mut last_was_dash = false;
    for ch in raw.chars() {
        let mapped = match ch.to_ascii_lowercase() {
            c @ ('a'..='z' | '0'..='9' | '_') => Some(c),
            _ => None,
        };
        match mapped {
            Some(c) => {
                key.push(c);
                last_was_dash = false;
            }
            None => {
                if !last_was_dash && !key.is_empty() {
                    key.push('-');
                    last_was_dash = true;
                }
            }
        }
    }
    if key.ends_with('-') {
        key.pop();
    }
    key
}

/// Sanitizes a display name and enforces the backend's length limits.
pub fn normalize_bucket_key(raw: &str) -> Result<String, BucketKeyError> {
    let key = sanitize_bucket_key(raw);
    if key.len() < MIN_KEY_LEN {
        return Err(BucketKeyError::TooShort {
            name: raw.to_string(),
        });
    }
    if key.len() > MAX_KEY_LEN {
        return Err(BucketKeyError::TooLong {
            name: raw.to_string(),
        });
    }
    Ok(key)
}
