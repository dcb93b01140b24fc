//! Extension pour intégrer les réglages du direct dans mmconfig
//!
//! Ce module fournit le trait `LiveConfigExt` qui lit la section `live` de la
//! configuration : budgets de reconnexion, délais et URL de secours.
//!
//! # Exemple
//!
//! ```no_run
//! use mmconfig::get_config;
//! use mmlive::LiveConfigExt;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = get_config();
//! let retry = config.get_live_retry_config()?;
//! println!("max retries: {}", retry.max_retries);
//! println!("backup: {:?}", config.get_live_backup_url()?);
//! # Ok(())
//! # }
//! ```

use crate::constants::*;
use crate::retry::RetryConfig;
use anyhow::Result;
use mmconfig::Config;

/// Trait d'extension pour la configuration du direct
pub trait LiveConfigExt {
    /// Réglages de reconnexion et de bascule
    ///
    /// Les clés absentes prennent la valeur par défaut.
    fn get_live_retry_config(&self) -> Result<RetryConfig>;

    /// Enregistre les réglages de reconnexion
    fn set_live_retry_config(&self, config: &RetryConfig) -> Result<()>;

    /// URL du flux de secours (`None` si non configurée)
    fn get_live_backup_url(&self) -> Result<Option<String>>;

    /// Définit l'URL du flux de secours (chaîne vide pour la supprimer)
    fn set_live_backup_url(&self, url: &str) -> Result<()>;
}

fn count(config: &Config, key: &str, default: u32) -> u32 {
    u32::try_from(config.get_u64(&["live", key], default as u64)).unwrap_or(default)
}

impl LiveConfigExt for Config {
    fn get_live_retry_config(&self) -> Result<RetryConfig> {
        Ok(RetryConfig {
            max_retries: count(self, "max_retries", DEFAULT_MAX_RETRIES),
            reconnect_delay_ms: self
                .get_u64(&["live", "reconnect_delay_ms"], DEFAULT_RECONNECT_DELAY_MS),
            fetch_attempts: count(self, "fetch_attempts", DEFAULT_FETCH_ATTEMPTS),
            fetch_backoff_ms: self
                .get_u64(&["live", "fetch_backoff_ms"], DEFAULT_FETCH_BACKOFF_MS),
            stability_window_ms: self
                .get_u64(&["live", "stability_window_ms"], DEFAULT_STABILITY_WINDOW_MS),
            error_debounce_ms: self
                .get_u64(&["live", "error_debounce_ms"], DEFAULT_ERROR_DEBOUNCE_MS),
            recovery_poll_ms: self
                .get_u64(&["live", "recovery_poll_ms"], DEFAULT_RECOVERY_POLL_MS),
            buffering_timeout_ms: self
                .get_u64(&["live", "buffering_timeout_ms"], DEFAULT_BUFFERING_TIMEOUT_MS),
        })
    }

    fn set_live_retry_config(&self, config: &RetryConfig) -> Result<()> {
        self.set_number(&["live", "max_retries"], config.max_retries as u64)?;
        self.set_number(&["live", "reconnect_delay_ms"], config.reconnect_delay_ms)?;
        self.set_number(&["live", "fetch_attempts"], config.fetch_attempts as u64)?;
        self.set_number(&["live", "fetch_backoff_ms"], config.fetch_backoff_ms)?;
        self.set_number(&["live", "stability_window_ms"], config.stability_window_ms)?;
        self.set_number(&["live", "error_debounce_ms"], config.error_debounce_ms)?;
        self.set_number(&["live", "recovery_poll_ms"], config.recovery_poll_ms)?;
        self.set_number(&["live", "buffering_timeout_ms"], config.buffering_timeout_ms)
    }

    fn get_live_backup_url(&self) -> Result<Option<String>> {
        Ok(self.get_optional_string(&["live", "backup_url"]))
    }

    fn set_live_backup_url(&self, url: &str) -> Result<()> {
        self.set_value(
            &["live", "backup_url"],
            serde_yaml::Value::String(url.trim().to_string()),
        )
    }
}
