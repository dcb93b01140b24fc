mod catalogue;
mod live;
mod logging;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mmapi::{ApiConfigExt, MinistryClient};
use mmconfig::Config;
use tracing::info;

#[derive(Parser)]
#[command(name = "ministry")]
#[command(about = "Ministry Media client: live service, catalogue and community", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory (defaults to $MINISTRY_CONFIG or ~/.ministry)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the live service; player messages and controls are read from stdin
    Live {
        /// Backup stream used once the primary keeps failing
        #[arg(long)]
        backup: Option<String>,
        /// Play this URL instead of asking the backend
        #[arg(long)]
        url: Option<String>,
    },
    /// List the videos of a category (sermons, prophecy, worship, ...)
    Videos { category: String },
    /// Upcoming events
    Events,
    /// Quote of the day
    Quote,
    /// Read a Bible chapter
    Bible { book: String, chapter: u32 },
    /// Submit a prayer request
    Pray {
        #[arg(long)]
        name: String,
        #[arg(long)]
        request: String,
        #[arg(long)]
        email: Option<String>,
        /// Only the prayer team will see it
        #[arg(long)]
        private: bool,
    },
    /// Register for an event
    Register {
        event: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Log in to the mentorship area
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Mentorship courses, with their lessons when an id is given
    Courses { course: Option<String> },
    /// Enroll in a course (requires login)
    Enroll { course: String },
    /// Comments of a course video
    Comments { video: String },
    /// Comment a course video, or reply with --reply-to
    Comment {
        video: String,
        body: String,
        #[arg(long)]
        reply_to: Option<String>,
    },
    /// Print the player page for a YouTube URL or id
    Embed { video: String },
    /// Register this install for push notifications
    RegisterDevice {
        token: String,
        #[arg(long, default_value = "android")]
        platform: String,
    },
    /// Preload and print the home screen
    Home,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ========== PHASE 1 : Configuration et logs ==========
    let config = Arc::new(Config::load_config(cli.config.as_deref().unwrap_or(""))?);
    logging::init_logging(&config, cli.verbose);

    info!("📡 Backend: {}", config.get_api_base_url()?);

    // ========== PHASE 2 : Client backend ==========
    let client = MinistryClient::from_config(config.clone())?;

    // ========== PHASE 3 : Commande ==========
    match cli.command {
        Commands::Live { backup, url } => live::run(&config, client, backup, url).await,
        Commands::Videos { category } => catalogue::videos(&client, &category).await,
        Commands::Events => catalogue::events(&client).await,
        Commands::Quote => catalogue::quote(&client).await,
        Commands::Bible { book, chapter } => catalogue::bible(&client, &book, chapter).await,
        Commands::Pray {
            name,
            request,
            email,
            private,
        } => catalogue::pray(&client, name, request, email, private).await,
        Commands::Register { event, name, email } => {
            catalogue::register(&client, &event, name, email).await
        }
        Commands::Login { email, password } => catalogue::login(&client, &email, &password).await,
        Commands::Logout => catalogue::logout(&client).await,
        Commands::Courses { course } => catalogue::courses(&client, course.as_deref()).await,
        Commands::Enroll { course } => catalogue::enroll(&client, &course).await,
        Commands::Comments { video } => catalogue::comments(&client, &video).await,
        Commands::Comment {
            video,
            body,
            reply_to,
        } => catalogue::comment(&client, &video, &body, reply_to.as_deref()).await,
        Commands::Embed { video } => catalogue::embed(&config, &video).await,
        Commands::RegisterDevice { token, platform } => {
            catalogue::register_device(&config, &client, &token, &platform).await
        }
        Commands::Home => catalogue::home(&client).await,
    }
}
