//! Hash-password command handler

use crate::error::AppResult;
use crate::utils::password::hash_password;

/// Produces an argon2 PHC string for `auth.user.password` or
/// `auth.client.secret`.
pub struct HashPasswordCommandHandler {
    password: String,
}

impl HashPasswordCommandHandler {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    /// Hashes the password and prints it to stdout.
    pub fn execute(&self) -> AppResult<String> {
        let hash = hash_password(&self.password)?;
        println!("{}", hash);
        Ok(hash)
    }
}
