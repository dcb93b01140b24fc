//! Extension pour lire les réglages d'intégration YouTube depuis mmconfig

use crate::recovery::{EmbedRecovery, DEFAULT_ALTERNATE_ATTEMPTS};
use anyhow::Result;
use mmconfig::Config;

/// Trait d'extension pour la configuration de l'intégration YouTube
pub trait EmbedConfigExt {
    /// Nombre de rechargements sur l'hôte alternatif avant l'iframe simple
    fn get_embed_alternate_attempts(&self) -> Result<u32>;

    fn set_embed_alternate_attempts(&self, attempts: u32) -> Result<()>;

    /// Crée une machine de récupération configurée pour cette vidéo
    fn embed_recovery(&self, video_id: &str) -> Result<EmbedRecovery> {
        Ok(EmbedRecovery::new(
            video_id,
            self.get_embed_alternate_attempts()?,
        ))
    }
}

impl EmbedConfigExt for Config {
    fn get_embed_alternate_attempts(&self) -> Result<u32> {
        let value = self.get_u64(
            &["embed", "alternate_attempts"],
            DEFAULT_ALTERNATE_ATTEMPTS as u64,
        );
        Ok(u32::try_from(value).unwrap_or(DEFAULT_ALTERNATE_ATTEMPTS))
    }

    fn set_embed_alternate_attempts(&self, attempts: u32) -> Result<()> {
        self.set_number(&["embed", "alternate_attempts"], attempts as u64)
    }
}
