//! RSA public key loading for RS256 tenants.

use dashmap::DashMap;
use jsonwebtoken::DecodingKey;

use super::DomainError;

/// Parsed RSA public keys keyed by file path.
///
/// A key is read from disk once; later tenants naming the same path reuse it.
#[derive(Default)]
pub struct KeyCache {
    keys: DashMap<String, DecodingKey>,
}

impl KeyCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the decoding key stored at `path`, loading it on first use.
    ///
    /// # Errors
    /// `DomainError::KeyLoad` when the file cannot be read or is not a PEM
    /// encoded RSA public key.
    pub fn rsa_public_key(&self, path: &str) -> Result<DecodingKey, DomainError> {
        if let Some(key) = self.keys.get(path) {
            return Ok(key.clone());
        }

        let key = load_rsa_public_key(path)?;
        self.keys.insert(path.to_owned(), key.clone());
        Ok(key)
    }
}

/// # Errors
/// `DomainError::KeyLoad` on I/O or PEM parse failure.
pub fn load_rsa_public_key(path: &str) -> Result<DecodingKey, DomainError> {
    if path.is_empty() {
        return Err(DomainError::KeyLoad {
            path: String::new(),
            reason: "no key file configured".to_owned(),
        });
    }

    let pem = std::fs::read(path).map_err(|e| DomainError::KeyLoad {
        path: path.to_owned(),
        reason: e.to_string(),
    })?;

    DecodingKey::from_rsa_pem(&pem).map_err(|e| DomainError::KeyLoad {
        path: path.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    const PUBLIC_KEY: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/rsa_public.pem");

    #[test]
    fn loads_and_caches_key() {
        let cache = KeyCache::new();
        assert!(cache.rsa_public_key(PUBLIC_KEY).is_ok());
        assert_eq!(cache.keys.len(), 1);
        assert!(cache.rsa_public_key(PUBLIC_KEY).is_ok());
        assert_eq!(cache.keys.len(), 1);
    }

    #[test]
    fn missing_file_is_key_load_error() {
        assert!(matches!(
            load_rsa_public_key("/nonexistent/key.pem"),
            Err(DomainError::KeyLoad { ref path, .. }) if path == "/nonexistent/key.pem"
        ));
    }

    #[test]
    fn empty_path_is_key_load_error() {
        assert!(matches!(
            load_rsa_public_key(""),
            Err(DomainError::KeyLoad { .. })
        ));
    }

    #[test]
    fn garbage_pem_is_key_load_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a key").unwrap();
        let path = file.path().to_str().unwrap().to_owned();

        assert!(matches!(
            load_rsa_public_key(&path),
            Err(DomainError::KeyLoad { .. })
        ));
    }
}
