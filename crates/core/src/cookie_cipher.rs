//! AES-256-GCM sealing for the configuration cookie.
//!
//! The key is the SHA-256 digest of a secret provisioned through the
//! environment. Sealed values are URL-safe base64 of
//! `nonce[12] || ciphertext_with_tag`, so they can sit in a cookie without
//! further escaping.
//!
//! A configuration is sealed in two layers: `password` and `apiKey` are each
//! sealed on their own inside the JSON document, then the whole document is
//! sealed again.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::user_config::UserConfig;

const NONCE_SIZE: usize = 12;

/// Failure to open or seal a cookie value.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("Cookie value is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Cookie value is too short to contain a nonce")]
    Truncated,

    #[error("Decryption failed: wrong key or tampered data")]
    Decryption,

    #[error("Encryption failed")]
    Encryption,

    #[error("Decrypted data is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Decrypted configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Symmetric cipher for cookie payloads. Cheap to clone.
#[derive(Clone)]
pub struct CookieCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CookieCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CookieCipher { .. }")
    }
}

impl CookieCipher {
    /// Derive the AES key from a provisioned secret.
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(digest.as_slice());
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypt a string with a fresh random nonce.
    pub fn seal_str(&self, plaintext: &str) -> Result<String, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Encryption)?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(nonce.as_slice());
        combined.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(combined))
    }

    /// Decrypt a value produced by [`CookieCipher::seal_str`].
    pub fn open_str(&self, sealed: &str) -> Result<String, CipherError> {
        let data = URL_SAFE_NO_PAD.decode(sealed.trim())?;
        if data.len() <= NONCE_SIZE {
            return Err(CipherError::Truncated);
        }
        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CipherError::Decryption)?;
        Ok(String::from_utf8(plaintext)?)
    }

    /// Seal a full configuration into a cookie value.
    pub fn seal_config(&self, config: &UserConfig) -> Result<String, CipherError> {
        let mut inner = config.clone();
        inner.password = self.seal_str(&config.password)?;
        inner.api_key = self.seal_str(&config.api_key)?;
        let json = serde_json::to_string(&inner)?;
        self.seal_str(&json)
    }

    /// Open a cookie value back into a configuration.
    ///
    /// Does not validate or check expiry; see [`UserConfig::check_at`].
    pub fn open_config(&self, sealed: &str) -> Result<UserConfig, CipherError> {
        let json = self.open_str(sealed)?;
        let mut config: UserConfig = serde_json::from_str(&json)?;
        config.password = self.open_str(&config.password)?;
        config.api_key = self.open_str(&config.api_key)?;
        Ok(config)
    }
}
