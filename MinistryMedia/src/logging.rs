//! Initialisation des logs
//!
//! Le niveau vient de `host.logger.min_level` ; `RUST_LOG` a priorité.

use mmconfig::Config;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

pub fn init_logging(config: &Config, verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        config
            .get_log_min_level()
            .unwrap_or_else(|_| "info".to_string())
            .to_lowercase()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let enable_console = config.get_log_enable_console().unwrap_or(true);

    let subscriber = Registry::default().with(filter);
    if enable_console {
        // stdout est réservé aux résultats des commandes
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .init();
    } else {
        subscriber.init();
    }
}
