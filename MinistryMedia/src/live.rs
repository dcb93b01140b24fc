//! Écran du direct en ligne de commande
//!
//! stdin reçoit les messages de la page du lecteur (`playing`, `waiting`,
//! `error:3`…) ainsi que quelques commandes : `focus on|off`, `retry`,
//! `page` et `quit`. Chaque statut est écrit en JSON sur stdout, chaque
//! chargement sous forme de script à injecter dans la page.

use std::sync::Arc;

use anyhow::Result;
use mmapi::MinistryClient;
use mmconfig::Config;
use mmlive::{
    load_script, render_live_player, LiveConfigExt, LiveSession, LogKeepAwake, StaticSource,
    StreamSource,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

pub async fn run(
    config: &Config,
    client: MinistryClient,
    backup: Option<String>,
    url: Option<String>,
) -> Result<()> {
    let source: Arc<dyn StreamSource> = match url {
        Some(url) => Arc::new(StaticSource::new(url)),
        None => Arc::new(client),
    };
    let backup = match backup {
        Some(url) => Some(url),
        None => config.get_live_backup_url()?,
    };
    let retry_config = config.get_live_retry_config()?;

    info!(
        "📡 Starting live session (backup: {})",
        backup.as_deref().unwrap_or("none")
    );
    let mut session = LiveSession::spawn(source, Arc::new(LogKeepAwake), retry_config, backup);
    let mut status = session.status();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            load = session.next_load() => match load {
                Some(url) => {
                    info!("▶️ Loading {}", url);
                    println!("{}", load_script(&url));
                }
                None => break,
            },
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let report = status.borrow_and_update().clone();
                if let Some(message) = &report.message {
                    warn!("Live stream unavailable: {}", message);
                }
                println!("{}", serde_json::to_string(&report)?);
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" => {}
                    "quit" => break,
                    "retry" => session.retry().await?,
                    "focus on" => session.set_focused(true).await?,
                    "focus off" => session.set_focused(false).await?,
                    "page" => match session.current().url {
                        Some(url) => println!("{}", render_live_player(&url)),
                        None => warn!("No stream loaded yet"),
                    },
                    message => {
                        if let Err(e) = session.player_message(message).await {
                            warn!("Ignoring player message {:?}: {}", message, e);
                        }
                    }
                }
            },
        }
    }

    session.unmount().await?;
    info!("✅ Live session closed");
    Ok(())
}
