//! Chiffrement des secrets stockés dans la configuration
//!
//! Le token d'authentification de l'utilisateur est persisté dans
//! `config.yaml`. Il y est chiffré avec une clé AES-256 dérivée de l'UUID de
//! la machine, ce qui rend le fichier non-portable mais protégé.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use anyhow::{anyhow, Result};
use base64::Engine;
use sha2::{Digest, Sha256};

/// Préfixe pour identifier les secrets chiffrés
const ENCRYPTED_PREFIX: &str = "encrypted:";

const KEY_SALT: &[u8] = b"ministry-config-encryption-v1";
const NONCE_SALT: &[u8] = b"ministry-nonce-v1";

/// Récupère l'UUID matériel de la machine
///
/// Sur macOS, utilise `ioreg -d2 -c IOPlatformExpertDevice`
/// Sur Linux, utilise `/etc/machine-id` ou `/var/lib/dbus/machine-id`
/// Sur Windows, utilise `wmic csproduct get UUID`
fn get_machine_uuid() -> Result<String> {
    #[cfg(target_os = "macos")]
    {
        let output = std::process::Command::new("ioreg")
            .args(["-d2", "-c", "IOPlatformExpertDevice"])
            .output()?;

        let output_str = String::from_utf8_lossy(&output.stdout);

        // Format: "IOPlatformUUID" = "XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX"
        for line in output_str.lines() {
            if line.contains("IOPlatformUUID") {
                if let Some(uuid) = line.split('"').nth(3) {
                    return Ok(uuid.to_string());
                }
            }
        }

        Err(anyhow!("Failed to extract IOPlatformUUID from ioreg"))
    }

    #[cfg(target_os = "linux")]
    {
        use std::fs;

        if let Ok(uuid) = fs::read_to_string("/etc/machine-id") {
            return Ok(uuid.trim().to_string());
        }

        if let Ok(uuid) = fs::read_to_string("/var/lib/dbus/machine-id") {
            return Ok(uuid.trim().to_string());
        }

        Err(anyhow!("Failed to read machine-id"))
    }

    #[cfg(target_os = "windows")]
    {
        let output = std::process::Command::new("wmic")
            .args(["csproduct", "get", "UUID"])
            .output()?;

        let output_str = String::from_utf8_lossy(&output.stdout);

        // La deuxième ligne contient l'UUID
        if let Some(uuid) = output_str.lines().nth(1) {
            return Ok(uuid.trim().to_string());
        }

        Err(anyhow!("Failed to extract UUID from wmic"))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        Err(anyhow!("Unsupported platform for machine UUID extraction"))
    }
}

/// Dérive une clé AES-256 à partir d'un matériau de clé arbitraire
fn derive_key_from(material: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    hasher.update(KEY_SALT);

    let mut key = [0u8; 32];
    key.copy_from_slice(&hasher.finalize());
    key
}

fn machine_key() -> Result<[u8; 32]> {
    Ok(derive_key_from(&get_machine_uuid()?))
}

/// Chiffre `plaintext` avec une clé explicite
///
/// Le format encodé est : `encrypted:` + base64(nonce(12 bytes) + ciphertext).
/// Le nonce est dérivé du secret : même secret = même chiffré, ce qui évite
/// de réécrire la configuration quand le token n'a pas changé.
pub fn encrypt_with_key(key: &[u8; 32], plaintext: &str) -> Result<String> {
    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| anyhow!("Failed to create cipher: {}", e))?;

    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hasher.update(NONCE_SALT);
    let nonce_hash = hasher.finalize();
    let mut nonce_bytes = [0u8; 12];
    nonce_bytes.copy_from_slice(&nonce_hash[..12]);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| anyhow!("Encryption failed: {}", e))?;

    let mut combined = Vec::with_capacity(12 + ciphertext.len());
    combined.extend_from_slice(&nonce_bytes);
    combined.extend_from_slice(&ciphertext);

    Ok(format!(
        "{}{}",
        ENCRYPTED_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(&combined)
    ))
}

/// Déchiffre une valeur produite par [`encrypt_with_key`]
pub fn decrypt_with_key(key: &[u8; 32], encrypted: &str) -> Result<String> {
    let base64_data = encrypted
        .strip_prefix(ENCRYPTED_PREFIX)
        .ok_or_else(|| anyhow!("Invalid encrypted secret format (missing prefix)"))?;

    let cipher =
        Aes256Gcm::new_from_slice(key).map_err(|e| anyhow!("Failed to create cipher: {}", e))?;

    let combined = base64::engine::general_purpose::STANDARD
        .decode(base64_data)
        .map_err(|e| anyhow!("Invalid base64: {}", e))?;

    if combined.len() < 12 {
        return Err(anyhow!("Invalid ciphertext (too short)"));
    }

    let (nonce_bytes, ciphertext) = combined.split_at(12);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| anyhow!("Decryption failed (wrong machine or corrupted data): {}", e))?;

    String::from_utf8(plaintext).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
}

/// Chiffre un secret avec la clé dérivée de la machine
pub fn encrypt_secret(secret: &str) -> Result<String> {
    encrypt_with_key(&machine_key()?, secret)
}

/// Déchiffre un secret avec la clé dérivée de la machine
pub fn decrypt_secret(encrypted: &str) -> Result<String> {
    decrypt_with_key(&machine_key()?, encrypted)
}

/// Vérifie si une valeur est un secret chiffré
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX)
}

/// Obtient le secret en clair, qu'il soit chiffré ou non
///
/// - Si la valeur commence par "encrypted:", elle est déchiffrée
/// - Sinon, elle est retournée telle quelle (plaintext saisi à la main)
pub fn get_secret(value: &str) -> Result<String> {
    if is_encrypted(value) {
        decrypt_secret(value)
    } else {
        Ok(value.to_string())
    }
}
