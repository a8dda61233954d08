//! Credential hashing for registered users.
//!
//! Passwords are stored as Argon2id PHC strings. The hashing cost comes from
//! `auth.password` in the config; verification reads the cost back out of the stored hash, so
//! raising the cost only affects accounts registered afterwards.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::{config::PasswordConfig, errors::Error};

/// Password policy and hashing cost for the user repository.
#[derive(Debug, Clone)]
pub struct Credentials {
    min_length: usize,
    max_length: usize,
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new(&PasswordConfig::default())
    }
}

impl Credentials {
    pub fn new(config: &PasswordConfig) -> Self {
        Self {
            min_length: config.min_length,
            max_length: config.max_length,
            memory_kib: config.hash_memory_kib,
            iterations: config.hash_iterations,
            parallelism: config.hash_parallelism,
        }
    }

    /// The message shown on the registration form when `password` breaks the length policy.
    pub fn length_problem(&self, password: &str) -> Option<String> {
        let length = password.chars().count();
        if length < self.min_length {
            Some(format!("Password must be at least {} characters", self.min_length))
        } else if length > self.max_length {
            Some(format!("Password must be no more than {} characters", self.max_length))
        } else {
            None
        }
    }

    /// Salted Argon2id PHC string for `password`. CPU-bound.
    pub fn hash(&self, password: &str) -> Result<String, Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2()?.hash_password(password.as_bytes(), &salt).map_err(|e| Error::Internal {
            operation: format!("hash password: {e}"),
        })?;
        Ok(hash.to_string())
    }

    /// Check `password` against a stored PHC string. CPU-bound.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, Error> {
        let parsed = PasswordHash::new(stored_hash).map_err(|e| Error::Internal {
            operation: format!("parse stored password hash: {e}"),
        })?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    }

    /// Spend one hash on a login for an unknown username, so it takes as long as a wrong password.
    pub fn burn(&self, password: &str) {
        if let Err(e) = self.hash(password) {
            tracing::warn!(error = %e, "Dummy password hash failed");
        }
    }

    fn argon2(&self) -> Result<Argon2<'static>, Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None).map_err(|e| Error::Internal {
            operation: format!("create argon2 params: {e}"),
        })?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Credentials {
        Credentials::new(&PasswordConfig {
            min_length: 4,
            max_length: 8,
            hash_memory_kib: 1024,
            hash_iterations: 1,
            hash_parallelism: 1,
        })
    }

    #[test]
    fn test_default_cost_round_trip() {
        let credentials = Credentials::default();
        let hash = credentials.hash("hunter2").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=19456,t=2,p=1"));
        assert!(!hash.contains("hunter2"));
        assert!(credentials.verify("hunter2", &hash).unwrap());
        assert!(!credentials.verify("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_configured_cost_is_embedded() {
        let hash = cheap().hash("pw12").unwrap();
        assert!(hash.contains("m=1024,t=1,p=1"));
    }

    #[test]
    fn test_hash_made_at_another_cost_still_verifies() {
        let old = cheap().hash("hunter2").unwrap();
        assert!(Credentials::default().verify("hunter2", &old).unwrap());
    }

    #[test]
    fn test_registrations_are_salted() {
        let credentials = cheap();
        let first = credentials.hash("same").unwrap();
        let second = credentials.hash("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_length_policy_counts_characters() {
        let credentials = cheap();
        assert_eq!(
            credentials.length_problem("abc").as_deref(),
            Some("Password must be at least 4 characters")
        );
        assert_eq!(credentials.length_problem("abcd"), None);
        // Eight multi-byte characters are within an eight character limit
        assert_eq!(credentials.length_problem("ééééèèèè"), None);
        assert_eq!(
            credentials.length_problem("abcdefghi").as_deref(),
            Some("Password must be no more than 8 characters")
        );
    }

    #[test]
    fn test_invalid_cost_is_an_internal_error() {
        let credentials = Credentials::new(&PasswordConfig {
            hash_iterations: 0,
            ..PasswordConfig::default()
        });
        assert!(matches!(credentials.hash("pw"), Err(Error::Internal { .. })));
    }

    #[test]
    fn test_corrupt_stored_hash_is_an_error() {
        assert!(matches!(
            cheap().verify("pw", "not-a-phc-string"),
            Err(Error::Internal { .. })
        ));
    }
}
