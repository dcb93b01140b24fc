//! # Ministry Media Configuration Module
//!
//! This module provides configuration management for Ministry Media, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use mmconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let level = config.get_log_min_level()?;
//! let install_id = config.get_install_id()?;
//!
//! // Update configuration values
//! config.set_log_min_level("DEBUG".to_string())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::info;
use uuid::Uuid;

// Chiffrement des secrets (token d'authentification)
pub mod encryption;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("ministry.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load Ministry Media configuration"));
}

const ENV_CONFIG_DIR: &str = "MINISTRY_CONFIG";
const ENV_PREFIX: &str = "MINISTRY_CONFIG__";
const CONFIG_DIR_NAME: &str = ".ministry";

// Default values for configuration
const DEFAULT_LOG_MIN_LEVEL: &str = "INFO";
const DEFAULT_LOG_ENABLE_CONSOLE: bool = true;

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> anyhow::Result<bool> {
            match self.get_value($path) {
                Ok(serde_yaml::Value::Bool(b)) => Ok(b),
                _ => Ok($default),
            }
        }

        pub fn $setter(&self, value: bool) -> anyhow::Result<()> {
            self.set_value($path, serde_yaml::Value::Bool(value))
        }
    };
}

/// Configuration manager for Ministry Media
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
///
/// Feature crates (`mmapi`, `mmlive`) add their own getters through
/// extension traits implemented for `Config`.
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.lock_data().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(CONFIG_DIR_NAME).exists() {
            return CONFIG_DIR_NAME.to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(CONFIG_DIR_NAME);
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        CONFIG_DIR_NAME.to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!(
                "Configuration path {} is not a directory",
                path.display()
            ));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `MINISTRY_CONFIG` environment variable
    /// 3. `.ministry` in the current directory
    /// 4. `.ministry` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for read/write permissions.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir=%config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file=%path, "Loaded config file");
            data
        } else {
            info!(config_file=%path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = Self::lower_keys_value(default_value);

        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Directory holding `config.yaml`
    pub fn directory(&self) -> &str {
        &self.config_dir
    }

    fn lock_data(&self) -> MutexGuard<'_, Value> {
        // Un panic pendant une écriture ne rend pas l'arbre YAML incohérent
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let yaml = {
            let data = self.lock_data();
            serde_yaml::to_string(&*data)?
        };
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["live", "max_retries"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock_data();
            Self::set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key_value = Value::String(path[0].to_lowercase());
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock_data();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    /// Gets a non-empty string value, `None` when missing, empty or not a string
    pub fn get_optional_string(&self, path: &[&str]) -> Option<String> {
        match self.get_value(path) {
            Ok(Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let key_path = stripped.split("__").collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        new_map.insert(Value::String(s.to_lowercase()), Self::lower_keys_value(v));
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Gets the install identifier, generating one if it doesn't exist
    ///
    /// The identifier is sent with push-notification registrations so the
    /// backend can replace the token of a reinstalled device.
    pub fn get_install_id(&self) -> Result<String> {
        let path = &["host", "install_id"];
        match self.get_value(path) {
            Ok(Value::String(id)) if !id.trim().is_empty() => Ok(id.trim().to_string()),
            _ => {
                let new_id = Uuid::new_v4().to_string();
                self.set_value(path, Value::String(new_id.clone()))?;
                Ok(new_id)
            }
        }
    }

    impl_bool_config!(
        get_log_enable_console,
        set_log_enable_console,
        &["host", "logger", "enable_console"],
        DEFAULT_LOG_ENABLE_CONSOLE
    );

    /// Récupère le niveau de log minimum depuis la configuration
    pub fn get_log_min_level(&self) -> Result<String> {
        match self.get_value(&["host", "logger", "min_level"]) {
            Ok(Value::String(s)) => Ok(s),
            _ => Ok(DEFAULT_LOG_MIN_LEVEL.to_string()),
        }
    }

    /// Définit le niveau de log minimum dans la configuration
    pub fn set_log_min_level(&self, level: String) -> Result<()> {
        self.set_value(&["host", "logger", "min_level"], Value::String(level))
    }

    /// Reads an unsigned number (durations in ms, counters)
    ///
    /// Missing keys and non-numeric values give `default`.
    pub fn get_u64(&self, path: &[&str], default: u64) -> u64 {
        match self.get_value(path) {
            Ok(Value::Number(n)) => n.as_u64().unwrap_or(default),
            _ => default,
        }
    }

    /// Stores a number at `path`
    pub fn set_number(&self, path: &[&str], value: u64) -> Result<()> {
        self.set_value(path, Value::Number(Number::from(value)))
    }
}

/// Returns the global configuration instance
///
/// The configuration is lazily loaded on first access.
///
/// # Panics
///
/// Panics if the configuration directory cannot be created or the
/// embedded defaults fail to parse.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_defaults_are_loaded() {
        let (_dir, config) = temp_config();
        assert_eq!(config.get_u64(&["live", "recovery_poll_ms"], 0), 30_000);
        assert_eq!(config.get_log_min_level().unwrap(), "INFO");
        assert!(config.get_log_enable_console().unwrap());
    }

    #[test]
    fn test_set_value_persists_to_disk() {
        let (dir, config) = temp_config();
        config.set_number(&["live", "max_retries"], 5).unwrap();

        let reloaded = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(reloaded.get_u64(&["live", "max_retries"], 0), 5);
    }

    #[test]
    fn test_get_u64_falls_back_on_bad_values() {
        let (_dir, config) = temp_config();
        config
            .set_value(&["live", "max_retries"], Value::String("three".to_string()))
            .unwrap();
        assert_eq!(config.get_u64(&["live", "max_retries"], 3), 3);
        assert_eq!(config.get_u64(&["live", "no_such_key"], 7), 7);
    }

    #[test]
    fn test_external_file_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "API:\n  Base_URL: http://localhost:9000\n",
        )
        .unwrap();

        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(
            config.get_optional_string(&["api", "base_url"]).as_deref(),
            Some("http://localhost:9000")
        );
        // Untouched defaults survive the merge
        assert_eq!(config.get_u64(&["api", "timeout_secs"], 0), 30);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let (_dir, config) = temp_config();
        assert!(config.get_value(&["nope", "missing"]).is_err());
        assert!(config.get_optional_string(&["nope"]).is_none());
    }

    #[test]
    fn test_install_id_is_stable() {
        let (_dir, config) = temp_config();
        let first = config.get_install_id().unwrap();
        let second = config.get_install_id().unwrap();
        assert_eq!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }

    #[test]
    fn test_merge_yaml_replaces_scalars() {
        let mut default: Value = serde_yaml::from_str("a: 1\nb:\n  c: 2\n").unwrap();
        let external: Value = serde_yaml::from_str("b:\n  c: 3\n  d: 4\n").unwrap();
        merge_yaml(&mut default, &external);

        let c = Config::get_value_internal(&default, &["b", "c"]).unwrap();
        assert_eq!(c.as_u64(), Some(3));
        let a = Config::get_value_internal(&default, &["a"]).unwrap();
        assert_eq!(a.as_u64(), Some(1));
        let d = Config::get_value_internal(&default, &["b", "d"]).unwrap();
        assert_eq!(d.as_u64(), Some(4));
    }
}
