use crate::error::AppResult;

pub fn hash_password(plaintext: &str) -> AppResult<String> {
    Ok(bcrypt::hash(plaintext, bcrypt::DEFAULT_COST)?)
}

/// Verify plaintext against a stored hash - constant-time via bcrypt.
/// A malformed hash counts as a mismatch.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}
