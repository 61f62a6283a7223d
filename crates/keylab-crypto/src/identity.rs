//! Identity attributes that keys are derived from.
//!
//! Both identity kinds are validated on construction and are immutable
//! afterwards. Birthdates are checked for shape only: `40131999` is a valid
//! signing birthdate.

use crate::CryptoError;

/// Number of characters in a `DDMMYYYY` birthdate.
pub const BIRTHDATE_LEN: usize = 8;

/// Identity used to derive a signing [`KeyPair`](crate::keys::KeyPair).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningIdentity {
    name: String,
    birthdate: String,
    secret_word: String,
}

impl SigningIdentity {
    /// Validate and build a signing identity.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidIdentity`] if any field is blank or the
    /// birthdate is not exactly eight ASCII digits.
    pub fn new(
        name: impl Into<String>,
        birthdate: impl Into<String>,
        secret_word: impl Into<String>,
    ) -> Result<Self, CryptoError> {
        let name = name.into();
        let birthdate = birthdate.into();
        let secret_word = secret_word.into();

        require_non_blank("name", &name)?;
        require_non_blank("birthdate", &birthdate)?;
        require_non_blank("secret word", &secret_word)?;
        validate_birthdate(&birthdate)?;

        Ok(Self {
            name,
            birthdate,
            secret_word,
        })
    }

    /// Owner name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Birthdate as supplied.
    #[must_use]
    pub fn birthdate(&self) -> &str {
        &self.birthdate
    }

    /// Derivation input: `name || birthdate || secret_word`.
    #[must_use]
    pub fn key_material(&self) -> String {
        format!("{}{}{}", self.name, self.birthdate, self.secret_word)
    }
}

/// Identity used to derive a [`SymmetricKey`](crate::keys::SymmetricKey).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherIdentity {
    email: String,
    birthdate: String,
}

impl CipherIdentity {
    /// Validate and build a cipher identity.
    ///
    /// The birthdate may be a full date or just a year; only emptiness is
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidIdentity`] if either field is blank.
    pub fn new(email: impl Into<String>, birthdate: impl Into<String>) -> Result<Self, CryptoError> {
        let email = email.into();
        let birthdate = birthdate.into();

        require_non_blank("email", &email)?;
        require_non_blank("birthdate", &birthdate)?;

        Ok(Self { email, birthdate })
    }

    /// Owner email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Derivation input: `email || birthdate`.
    #[must_use]
    pub fn key_material(&self) -> String {
        format!("{}{}", self.email, self.birthdate)
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), CryptoError> {
    if value.trim().is_empty() {
        return Err(CryptoError::InvalidIdentity(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Check a signing birthdate is shaped like `DDMMYYYY`.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidIdentity`] unless `birthdate` is exactly
/// eight ASCII digits.
pub fn validate_birthdate(birthdate: &str) -> Result<(), CryptoError> {
    if birthdate.len() != BIRTHDATE_LEN || !birthdate.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CryptoError::InvalidIdentity(
            "birthdate must be in DDMMYYYY format".into(),
        ));
    }
    Ok(())
}
