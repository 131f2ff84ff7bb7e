//! Argon2id credential hasher.
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`) so the salt and
//! cost parameters travel with the hash. Verification is constant time.

use std::fmt;

use argon2::password_hash::{
    self, PasswordHash as PhcHash, PasswordHasher, PasswordVerifier, SaltString,
    rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::PasswordHash;
use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// [`CredentialHasher`] backed by Argon2id.
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argon2Hasher").finish_non_exhaustive()
    }
}

impl Argon2Hasher {
    /// Hasher with explicit cost parameters.
    ///
    /// `memory_kib` is the memory cost in KiB, `iterations` the time cost.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, CredentialHasherError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| CredentialHasherError::hashing(err.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, CredentialHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| CredentialHasherError::hashing(err.to_string()))?;
        Ok(PasswordHash::from_bytes(phc.to_string().into_bytes()))
    }

    fn verify(&self, hash: &PasswordHash, password: &str) -> Result<(), CredentialHasherError> {
        let encoded = std::str::from_utf8(hash.as_bytes())
            .map_err(|err| CredentialHasherError::malformed_hash(err.to_string()))?;
        let parsed = PhcHash::new(encoded)
            .map_err(|err| CredentialHasherError::malformed_hash(err.to_string()))?;
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|err| match err {
                password_hash::Error::Password => CredentialHasherError::mismatch(),
                other => CredentialHasherError::malformed_hash(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(1024, 1, 1).expect("cheap params are valid")
    }

    #[rstest]
    fn verify_accepts_the_hashed_password(hasher: Argon2Hasher) {
        let hash = hasher.hash("pw1").expect("hash");
        assert!(hash.as_bytes().starts_with(b"$argon2id$"));
        hasher.verify(&hash, "pw1").expect("password verifies");
    }

    #[rstest]
    fn verify_rejects_other_passwords(hasher: Argon2Hasher) {
        let hash = hasher.hash("pw1").expect("hash");
        assert_eq!(
            hasher.verify(&hash, "wrong"),
            Err(CredentialHasherError::Mismatch)
        );
    }

    #[rstest]
    fn hashing_is_salted(hasher: Argon2Hasher) {
        let first = hasher.hash("pw1").expect("hash");
        let second = hasher.hash("pw1").expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    #[case(b"not-a-phc-string".to_vec())]
    #[case(vec![0xff, 0xfe])]
    fn malformed_hashes_are_reported(hasher: Argon2Hasher, #[case] bytes: Vec<u8>) {
        let result = hasher.verify(&PasswordHash::from_bytes(bytes), "pw1");
        assert!(matches!(
            result,
            Err(CredentialHasherError::MalformedHash { .. })
        ));
    }

    #[rstest]
    fn invalid_params_are_rejected() {
        let result = Argon2Hasher::with_params(0, 0, 0);
        assert!(matches!(result, Err(CredentialHasherError::Hashing { .. })));
    }
}
