//! In-memory keybase and the armored keyfile on disk.
//!
//! A key is a BIP-39 mnemonic; the secp256k1 signing key is derived from it
//! on the Cosmos HD path (`m/44'/118'/0'/0/0`) when a signer is needed. The
//! CLI only ever uses the key named [`DEFAULT_KEY`].

pub mod armor;

use crate::error::DeployError;
use bip39::Mnemonic;
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_KEY: &str = "default";

/// 256 bits of entropy, a 24-word mnemonic.
const ENTROPY_BYTES: usize = 32;

#[derive(Default)]
pub struct Keybase {
    keys: BTreeMap<String, Mnemonic>,
}

impl std::fmt::Debug for Keybase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keybase")
            .field("keys", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Keybase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh key under `name` and return its mnemonic.
    pub fn create(&mut self, name: &str) -> Result<String, DeployError> {
        if self.keys.contains_key(name) {
            return Err(DeployError::Key(format!("key '{}' already exists", name)));
        }
        let entropy: [u8; ENTROPY_BYTES] = rand::random();
        let mnemonic = Mnemonic::from_entropy(&entropy)
            .map_err(|e| DeployError::Key(format!("mnemonic generation failed: {}", e)))?;
        let phrase = mnemonic.to_string();
        self.keys.insert(name.to_string(), mnemonic);
        Ok(phrase)
    }

    /// Add a key from an existing mnemonic, replacing any key of that name.
    pub fn import_mnemonic(&mut self, name: &str, phrase: &str) -> Result<(), DeployError> {
        let mnemonic = Mnemonic::parse_normalized(phrase.trim())
            .map_err(|e| DeployError::Key(format!("invalid mnemonic: {}", e)))?;
        self.keys.insert(name.to_string(), mnemonic);
        Ok(())
    }

    pub fn export_armor(&self, name: &str, passphrase: &str) -> Result<String, DeployError> {
        let phrase = self.mnemonic(name)?;
        armor::armor(phrase.as_bytes(), passphrase)
    }

    pub fn import_armor(
        &mut self,
        name: &str,
        text: &str,
        passphrase: &str,
    ) -> Result<(), DeployError> {
        let secret = armor::unarmor(text, passphrase)?;
        let phrase = String::from_utf8(secret)
            .map_err(|_| DeployError::Key("keyfile does not hold a mnemonic".into()))?;
        self.import_mnemonic(name, &phrase)
    }

    pub fn mnemonic(&self, name: &str) -> Result<String, DeployError> {
        self.keys
            .get(name)
            .map(|m| m.to_string())
            .ok_or_else(|| DeployError::Key(format!("no key named '{}'", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    /// Signer for `name`, derived on the Cosmos HD path.
    #[cfg(feature = "default-client")]
    pub fn signer(&self, name: &str) -> Result<layer_climb::prelude::KeySigner, DeployError> {
        let phrase = self.mnemonic(name)?;
        layer_climb::prelude::KeySigner::new_mnemonic_str(&phrase, None)
            .map_err(|e| DeployError::Signer(format!("failed to derive key '{}': {}", name, e)))
    }

    /// Bech32 account address of `name` under `prefix`.
    #[cfg(feature = "default-client")]
    pub async fn address(&self, name: &str, prefix: &str) -> Result<String, DeployError> {
        use layer_climb::prelude::*;

        let signer = self.signer(name)?;
        let public_key = signer
            .public_key()
            .await
            .map_err(|e| DeployError::Signer(format!("public key: {}", e)))?;
        let addr = AddrKind::Cosmos {
            prefix: prefix.to_string(),
        }
        .address_from_pub_key(&public_key)
        .map_err(|e| DeployError::Signer(format!("address derivation: {}", e)))?;
        Ok(addr.to_string())
    }
}

/// Create a new key and write it, armored, to `path`. Refuses to overwrite.
/// Returns the mnemonic so it can be shown once.
pub fn create_keyfile(path: &Path, passphrase: &str) -> Result<String, DeployError> {
    if path.exists() {
        return Err(DeployError::Key(format!(
            "keyfile {} already exists",
            path.display()
        )));
    }
    tracing::info!(path = %path.display(), "creating keyfile");

    let mut keybase = Keybase::new();
    let mnemonic = keybase.create(DEFAULT_KEY)?;
    let text = keybase.export_armor(DEFAULT_KEY, passphrase)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_private(path, text.as_bytes())?;
    Ok(mnemonic)
}

/// Load the keyfile at `path` into a keybase under [`DEFAULT_KEY`].
pub fn load_keyfile(path: &Path, passphrase: &str) -> Result<Keybase, DeployError> {
    if !path.exists() {
        return Err(DeployError::Key(format!(
            "keyfile {} doesn't exist",
            path.display()
        )));
    }
    let text = std::fs::read_to_string(path)?;
    let mut keybase = Keybase::new();
    keybase.import_armor(DEFAULT_KEY, &text, passphrase)?;
    Ok(keybase)
}

#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> Result<(), DeployError> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> Result<(), DeployError> {
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_create_generates_24_words() {
        let mut kb = Keybase::new();
        let phrase = kb.create(DEFAULT_KEY).unwrap();
        assert_eq!(phrase.split_whitespace().count(), 24);
        assert!(kb.contains(DEFAULT_KEY));
        assert!(kb.create(DEFAULT_KEY).is_err());
    }

    #[test]
    fn test_import_rejects_bad_mnemonic() {
        let mut kb = Keybase::new();
        assert!(kb.import_mnemonic("x", "not a real mnemonic").is_err());
        kb.import_mnemonic("x", PHRASE).unwrap();
        assert_eq!(kb.mnemonic("x").unwrap(), PHRASE);
    }

    #[test]
    fn test_armor_roundtrip_through_keybase() {
        let mut kb = Keybase::new();
        kb.import_mnemonic(DEFAULT_KEY, PHRASE).unwrap();
        let text = kb.export_armor(DEFAULT_KEY, "12345678").unwrap();

        let mut other = Keybase::new();
        other.import_armor(DEFAULT_KEY, &text, "12345678").unwrap();
        assert_eq!(other.mnemonic(DEFAULT_KEY).unwrap(), PHRASE);

        assert!(matches!(
            Keybase::new().import_armor(DEFAULT_KEY, &text, "nope"),
            Err(DeployError::Key(_))
        ));
    }

    #[test]
    fn test_create_keyfile_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.priv");

        let phrase = create_keyfile(&path, "12345678").unwrap();
        let kb = load_keyfile(&path, "12345678").unwrap();
        assert_eq!(kb.mnemonic(DEFAULT_KEY).unwrap(), phrase);

        let err = create_keyfile(&path, "12345678").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[cfg(unix)]
    #[test]
    fn test_keyfile_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("key.priv");
        create_keyfile(&path, "pw").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_load_missing_keyfile() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_keyfile(&dir.path().join("absent"), "pw").unwrap_err();
        assert!(err.to_string().contains("doesn't exist"));
    }
}
