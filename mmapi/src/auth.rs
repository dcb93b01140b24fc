//! Auth token storage
//!
//! The backend hands out a bearer token at login. The client keeps it in a
//! [`TokenStore`] so that course enrollment and comments can be sent on
//! behalf of the user across runs.

use crate::error::Result;
use std::fmt::Debug;
use std::sync::RwLock;

/// Storage for the bearer token
pub trait TokenStore: Send + Sync + Debug {
    /// Current token, if any
    fn load(&self) -> Option<String>;

    /// Replace the stored token
    fn save(&self, token: &str) -> Result<()>;

    /// Forget the token (logout)
    fn clear(&self) -> Result<()>;
}

/// In-memory token store (lost when the process exits)
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn save(&self, token: &str) -> Result<()> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

#[cfg(feature = "mmconfig")]
pub use config_store::ConfigTokenStore;

#[cfg(feature = "mmconfig")]
mod config_store {
    use super::TokenStore;
    use crate::config_ext::ApiConfigExt;
    use crate::error::Result;
    use mmconfig::Config;
    use std::sync::Arc;
    use tracing::warn;

    /// Token store persisted (encrypted) in the configuration file
    #[derive(Debug, Clone)]
    pub struct ConfigTokenStore {
        config: Arc<Config>,
    }

    impl ConfigTokenStore {
        pub fn new(config: Arc<Config>) -> Self {
            Self { config }
        }
    }

    impl TokenStore for ConfigTokenStore {
        fn load(&self) -> Option<String> {
            match self.config.get_auth_token() {
                Ok(token) => token,
                Err(e) => {
                    warn!("Stored auth token is unreadable, ignoring it: {}", e);
                    None
                }
            }
        }

        fn save(&self, token: &str) -> Result<()> {
            Ok(self.config.set_auth_token(token)?)
        }

        fn clear(&self) -> Result<()> {
            Ok(self.config.clear_auth_token()?)
        }
    }
}
