//! Extension pour intégrer le client backend dans mmconfig
//!
//! Ce module fournit le trait `ApiConfigExt` qui ajoute à `mmconfig::Config`
//! les réglages du client HTTP et la persistance du token d'authentification.
//!
//! # Exemple
//!
//! ```no_run
//! use mmconfig::get_config;
//! use mmapi::ApiConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! println!("Backend: {}", config.get_api_base_url()?);
//!
//! if config.get_auth_token()?.is_none() {
//!     println!("Not logged in");
//! }
//! # Ok(())
//! # }
//! ```

use crate::client::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use anyhow::{anyhow, Result};
use mmconfig::encryption;
use mmconfig::Config;
use serde_yaml::Value;
use tracing::warn;

const AUTH_TOKEN_PATH: &[&str] = &["accounts", "ministry", "auth_token"];

/// Trait d'extension pour la configuration du client backend
///
/// Les getters retournent la valeur par défaut si la clé est absente ou
/// d'un type inattendu.
pub trait ApiConfigExt {
    /// URL de base de l'API (sans `/` final)
    fn get_api_base_url(&self) -> Result<String>;

    /// Définit l'URL de base de l'API
    fn set_api_base_url(&self, url: &str) -> Result<()>;

    /// Timeout des requêtes HTTP (secondes)
    fn get_api_timeout_secs(&self) -> Result<u64>;

    /// User-Agent envoyé au backend
    fn get_api_user_agent(&self) -> Result<String>;

    /// Token d'authentification (déchiffré automatiquement)
    ///
    /// # Returns
    ///
    /// `None` si aucun utilisateur n'est connecté
    fn get_auth_token(&self) -> Result<Option<String>>;

    /// Enregistre le token d'authentification (chiffré)
    fn set_auth_token(&self, token: &str) -> Result<()>;

    /// Supprime le token d'authentification (logout)
    fn clear_auth_token(&self) -> Result<()>;
}

impl ApiConfigExt for Config {
    fn get_api_base_url(&self) -> Result<String> {
        Ok(self
            .get_optional_string(&["api", "base_url"])
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))
    }

    fn set_api_base_url(&self, url: &str) -> Result<()> {
        self.set_value(&["api", "base_url"], Value::String(url.to_string()))
    }

    fn get_api_timeout_secs(&self) -> Result<u64> {
        match self.get_value(&["api", "timeout_secs"]) {
            Ok(Value::Number(n)) if n.as_u64().is_some_and(|v| v > 0) => {
                Ok(n.as_u64().unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
            }
            _ => Ok(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    fn get_api_user_agent(&self) -> Result<String> {
        Ok(self
            .get_optional_string(&["api", "user_agent"])
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()))
    }

    fn get_auth_token(&self) -> Result<Option<String>> {
        match self.get_optional_string(AUTH_TOKEN_PATH) {
            Some(stored) => encryption::get_secret(&stored)
                .map(Some)
                .map_err(|e| anyhow!("Failed to decrypt auth token: {}", e)),
            None => Ok(None),
        }
    }

    fn set_auth_token(&self, token: &str) -> Result<()> {
        let stored = match encryption::encrypt_secret(token) {
            Ok(encrypted) => encrypted,
            Err(e) => {
                // Pas d'UUID machine (conteneur…) : on garde le token en clair
                warn!("Cannot encrypt auth token, storing it as plaintext: {}", e);
                token.to_string()
            }
        };
        self.set_value(AUTH_TOKEN_PATH, Value::String(stored))
    }

    fn clear_auth_token(&self) -> Result<()> {
        self.set_value(AUTH_TOKEN_PATH, Value::String(String::new()))
    }
}
