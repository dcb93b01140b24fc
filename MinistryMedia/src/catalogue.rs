//! Commandes du catalogue et de la communauté

use anyhow::{anyhow, Result};
use mmapi::{
    preload_home_feed, BootstrapContext, Comment, DevicePlatform, EventRegistration, HomeFeed,
    MinistryClient, PrayerRequest, VideoCategory,
};
use mmconfig::Config;
use mmembed::{extract_video_id, EmbedAction, EmbedConfigExt, PlayerMessage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

pub async fn videos(client: &MinistryClient, category: &str) -> Result<()> {
    let category: VideoCategory = category.parse().map_err(|e: String| anyhow!(e))?;
    let videos = client.videos(category).await?;

    println!("{} ({})", category.title(), videos.len());
    for video in videos {
        match &video.speaker {
            Some(speaker) => println!("  [{}] {} - {}", video.id, video.title, speaker),
            None => println!("  [{}] {}", video.id, video.title),
        }
    }
    Ok(())
}

pub async fn events(client: &MinistryClient) -> Result<()> {
    let now = chrono::Utc::now();
    let mut events: Vec<_> = client
        .events()
        .await?
        .into_iter()
        .filter(|e| e.is_upcoming(now))
        .collect();
    events.sort_by_key(|e| e.starts_at);

    if events.is_empty() {
        println!("No upcoming events");
    }
    for event in events {
        let place = event.location.as_deref().unwrap_or("-");
        let open = if event.registration_open { "" } else { " (closed)" };
        println!(
            "  [{}] {} {} @ {}{}",
            event.id,
            event.starts_at.format("%Y-%m-%d %H:%M"),
            event.title,
            place,
            open
        );
    }
    Ok(())
}

pub async fn quote(client: &MinistryClient) -> Result<()> {
    let quote = client.daily_quote().await?;
    println!("{}", quote.text);
    if let Some(reference) = quote.reference.as_ref().or(quote.author.as_ref()) {
        println!("  - {}", reference);
    }
    Ok(())
}

pub async fn bible(client: &MinistryClient, book: &str, chapter: u32) -> Result<()> {
    let chapter = client.bible_chapter(book, chapter).await?;
    println!("{} {}", chapter.book, chapter.chapter);
    for verse in &chapter.verses {
        println!("{:>3} {}", verse.number, verse.text);
    }
    Ok(())
}

pub async fn pray(
    client: &MinistryClient,
    name: String,
    request: String,
    email: Option<String>,
    private: bool,
) -> Result<()> {
    let mut prayer = PrayerRequest::new(name, request);
    prayer.email = email;
    prayer.is_private = private;

    let receipt = client.submit_prayer_request(&prayer).await?;
    info!("🙏 Prayer request {} received", receipt.id);
    println!(
        "{}",
        receipt
            .message
            .unwrap_or_else(|| "Your prayer request has been received".to_string())
    );
    Ok(())
}

pub async fn register(
    client: &MinistryClient,
    event_id: &str,
    name: String,
    email: String,
) -> Result<()> {
    let receipt = client
        .register_for_event(event_id, &EventRegistration::new(name, email))
        .await?;
    println!(
        "Registered for event {} (registration {})",
        receipt.event_id, receipt.registration_id
    );
    Ok(())
}

pub async fn login(client: &MinistryClient, email: &str, password: &str) -> Result<()> {
    let session = client.login(email, password).await?;
    info!("✅ Logged in as {}", session.user.email);
    println!("Welcome {}", session.user.name);
    Ok(())
}

pub async fn logout(client: &MinistryClient) -> Result<()> {
    client.logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn courses(client: &MinistryClient, course: Option<&str>) -> Result<()> {
    match course {
        Some(course_id) => {
            for lesson in client.course_videos(course_id).await? {
                println!("  {:>2}. [{}] {}", lesson.position, lesson.id, lesson.title);
            }
        }
        None => {
            for course in client.courses().await? {
                let mentor = course.mentor.as_deref().unwrap_or("-");
                println!(
                    "  [{}] {} ({} lessons, {})",
                    course.id, course.title, course.lessons, mentor
                );
            }
            if client.is_authenticated() {
                let enrolled = client.my_enrollments().await?;
                println!("Enrolled in {} course(s)", enrolled.len());
            }
        }
    }
    Ok(())
}

pub async fn enroll(client: &MinistryClient, course_id: &str) -> Result<()> {
    let enrollment = client.enroll(course_id).await?;
    println!(
        "Enrolled in course {} on {}",
        enrollment.course_id,
        enrollment.enrolled_at.format("%Y-%m-%d")
    );
    Ok(())
}

fn print_thread(comment: &Comment, depth: usize) {
    println!(
        "{}{} ({}): {}",
        "  ".repeat(depth + 1),
        comment.author,
        comment.created_at.format("%Y-%m-%d %H:%M"),
        comment.body
    );
    for reply in &comment.replies {
        print_thread(reply, depth + 1);
    }
}

pub async fn comments(client: &MinistryClient, video_id: &str) -> Result<()> {
    let threads = client.comments(video_id).await?;
    if threads.is_empty() {
        println!("No comments yet");
    }
    for comment in &threads {
        print_thread(comment, 0);
    }
    Ok(())
}

pub async fn comment(
    client: &MinistryClient,
    video_id: &str,
    body: &str,
    reply_to: Option<&str>,
) -> Result<()> {
    let posted = match reply_to {
        Some(parent) => client.reply(parent, body).await?,
        None => client.post_comment(video_id, body).await?,
    };
    println!("Comment {} posted", posted.id);
    Ok(())
}

/// Affiche la page du lecteur puis suit les messages du lecteur sur stdin
pub async fn embed(config: &Config, video: &str) -> Result<()> {
    let video_id = extract_video_id(video)?;
    let mut recovery = config.embed_recovery(&video_id)?;
    print_action(&recovery.current());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "quit" => break,
            "reset" => print_action(&recovery.reset()),
            message => match recovery.on_message(message) {
                Ok(Some(action)) => print_action(&action),
                Ok(None) => {
                    if matches!(message.parse::<PlayerMessage>(), Ok(PlayerMessage::Ready)) {
                        info!("▶️ Player ready for {}", recovery.video_id());
                    }
                }
                Err(e) => warn!("Ignoring player message: {}", e),
            },
        }
    }
    Ok(())
}

fn print_action(action: &EmbedAction) {
    match action {
        EmbedAction::Render(page) => println!("{}", page),
        EmbedAction::ShowWatchLink(url) => println!("Watch on YouTube: {}", url),
    }
}

pub async fn register_device(
    config: &Config,
    client: &MinistryClient,
    token: &str,
    platform: &str,
) -> Result<()> {
    let platform: DevicePlatform = platform.parse().map_err(|e: String| anyhow!(e))?;
    let install_id = config.get_install_id()?;
    client.register_device(token, platform, &install_id).await?;
    println!("Device {} registered", install_id);
    Ok(())
}

/// Préchargement de l'accueil, comme au démarrage de l'application
pub async fn home(client: &MinistryClient) -> Result<()> {
    let context: BootstrapContext<HomeFeed> = BootstrapContext::new();
    context.set(preload_home_feed(client).await)?;

    let feed = context
        .take()
        .ok_or_else(|| anyhow!("home feed already consumed"))?;
    if feed.is_empty() {
        warn!("Home feed is empty, backend unreachable?");
    }

    if let Some(quote) = &feed.daily_quote {
        println!("\"{}\"", quote.text);
    }
    println!("Latest sermons:");
    for video in &feed.latest_sermons {
        println!("  [{}] {}", video.id, video.title);
    }
    println!("Upcoming events:");
    for event in &feed.upcoming_events {
        println!(
            "  [{}] {} {}",
            event.id,
            event.starts_at.format("%Y-%m-%d"),
            event.title
        );
    }
    Ok(())
}
