//! Operator password hashing.

use crate::error::AuthError;

/// bcrypt hasher with a configurable work factor.
///
/// Hashing is CPU-bound; async callers should run it on a blocking thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    /// Creates a hasher, clamping `cost` into bcrypt's accepted range.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(4, 31),
        }
    }

    /// The work factor in use.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes a plaintext password.
    pub fn hash(&self, senha: &str) -> Result<String, AuthError> {
        bcrypt::hash(senha, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Checks a plaintext password against a stored hash.
    ///
    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, senha: &str, hash: &str) -> bool {
        match bcrypt::verify(senha, hash) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("Stored password hash could not be checked: {e}");
                false
            }
        }
    }

    /// Like [`verify`](Self::verify), for an account that may not exist.
    ///
    /// Without a stored hash the password is still hashed at the configured
    /// cost, so an unknown email takes as long to reject as a wrong password.
    pub fn verify_account(&self, senha: &str, hash: Option<&str>) -> bool {
        match hash {
            Some(hash) => self.verify(senha, hash),
            None => {
                let _ = bcrypt::hash(senha, self.cost);
                false
            }
        }
    }
}
