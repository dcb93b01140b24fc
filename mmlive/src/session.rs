//! Live session task.
//!
//! [`LiveSession::spawn`] runs a [`FailoverPolicy`] on its own tokio task.
//! The task owns the timers, the fetch in flight and the keep-awake guard;
//! everything reaches the policy from one `select!` loop, so inputs are
//! handled strictly in arrival order. Dropping or unmounting the session
//! cancels every timer.

use crate::error::{Error, Result, StreamError};
use crate::events::PlaybackEvent;
use crate::keep_awake::{KeepAwake, KeepAwakeGuard};
use crate::policy::{Effect, FailoverPolicy, Input, TimerKind};
use crate::resolver::StreamSource;
use crate::retry::RetryConfig;
use crate::state::StatusReport;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// Commands sent to the session task
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Player(PlaybackEvent),
    Focus(bool),
    Retry,
    Unmount,
}

/// Handle to a running live session
#[derive(Debug)]
pub struct LiveSession {
    commands: mpsc::Sender<SessionCommand>,
    status: watch::Receiver<StatusReport>,
    loads: mpsc::UnboundedReceiver<String>,
    join_handle: JoinHandle<()>,
}

impl LiveSession {
    /// Mount the live screen: start fetching the stream URL right away
    pub fn spawn(
        source: Arc<dyn StreamSource>,
        keep_awake: Arc<dyn KeepAwake>,
        config: RetryConfig,
        backup_url: Option<String>,
    ) -> Self {
        let (commands, rx) = mpsc::channel(32);
        let (status_tx, status) = watch::channel(StatusReport::default());
        let (load_tx, loads) = mpsc::unbounded_channel();

        let driver = Driver {
            policy: FailoverPolicy::new(config, backup_url),
            source,
            guard: KeepAwakeGuard::new(keep_awake),
            timers: HashMap::new(),
            fetch: None,
            loads: load_tx,
            status: status_tx,
        };
        let join_handle = tokio::spawn(driver.run(rx));

        Self {
            commands,
            status,
            loads,
            join_handle,
        }
    }

    /// Receiver of the status published after every transition
    pub fn status(&self) -> watch::Receiver<StatusReport> {
        self.status.clone()
    }

    /// Latest status
    pub fn current(&self) -> StatusReport {
        self.status.borrow().clone()
    }

    /// Next URL the player must load (`None` once the session stopped)
    pub async fn next_load(&mut self) -> Option<String> {
        self.loads.recv().await
    }

    /// Forward a player event
    pub async fn player_event(&self, event: PlaybackEvent) -> Result<()> {
        self.send(SessionCommand::Player(event)).await
    }

    /// Forward a raw message of the player page (`playing`, `error:3`…)
    pub async fn player_message(&self, message: &str) -> Result<()> {
        let event = message.parse::<PlaybackEvent>()?;
        self.player_event(event).await
    }

    pub async fn set_focused(&self, focused: bool) -> Result<()> {
        self.send(SessionCommand::Focus(focused)).await
    }

    /// Manual retry: back to the primary URL with a fresh budget
    pub async fn retry(&self) -> Result<()> {
        self.send(SessionCommand::Retry).await
    }

    /// Unmount the screen and wait for the task to stop
    pub async fn unmount(self) -> Result<()> {
        // Canal déjà fermé : la tâche est terminée
        let _ = self.commands.send(SessionCommand::Unmount).await;
        self.join_handle.await?;
        Ok(())
    }

    async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::SessionClosed)
    }
}

struct PendingFetch {
    ticket: u64,
    future: BoxFuture<'static, std::result::Result<String, StreamError>>,
}

enum Wake {
    Command(Option<SessionCommand>),
    Resolved(u64, std::result::Result<String, StreamError>),
    Timer(TimerKind),
}

struct Driver {
    policy: FailoverPolicy,
    source: Arc<dyn StreamSource>,
    guard: KeepAwakeGuard,
    timers: HashMap<TimerKind, Instant>,
    fetch: Option<PendingFetch>,
    loads: mpsc::UnboundedSender<String>,
    status: watch::Sender<StatusReport>,
}

impl Driver {
    async fn run(mut self, mut rx: mpsc::Receiver<SessionCommand>) {
        info!(backup = ?self.policy.backup_url(), "Starting live session");
        self.apply(Input::Mount);

        loop {
            let next_timer = self.next_timer();

            let wake = tokio::select! {
                cmd = rx.recv() => Wake::Command(cmd),
                (ticket, result) = wait_fetch(&mut self.fetch) => Wake::Resolved(ticket, result),
                kind = wait_timer(next_timer) => Wake::Timer(kind),
            };

            match wake {
                Wake::Command(None) | Wake::Command(Some(SessionCommand::Unmount)) => {
                    self.apply(Input::Unmount);
                    break;
                }
                Wake::Command(Some(cmd)) => {
                    let input = match cmd {
                        SessionCommand::Player(event) => Input::Player(event),
                        SessionCommand::Focus(focused) => Input::Focus(focused),
                        SessionCommand::Retry => Input::UserRetry,
                        SessionCommand::Unmount => Input::Unmount,
                    };
                    self.apply(input);
                }
                Wake::Resolved(ticket, result) => {
                    self.fetch = None;
                    self.apply(Input::Resolved { ticket, result });
                }
                Wake::Timer(kind) => {
                    self.timers.remove(&kind);
                    self.apply(Input::Timer(kind));
                }
            }
        }

        info!("Live session stopped");
    }

    fn next_timer(&self) -> Option<(TimerKind, Instant)> {
        self.timers
            .iter()
            .min_by_key(|(_, at)| **at)
            .map(|(kind, at)| (*kind, *at))
    }

    fn apply(&mut self, input: Input) {
        let now = Instant::now();

        for effect in self.policy.handle(input, now) {
            match effect {
                Effect::Fetch { ticket } => {
                    let source = Arc::clone(&self.source);
                    self.fetch = Some(PendingFetch {
                        ticket,
                        future: Box::pin(async move { source.fetch_stream_url().await }),
                    });
                }
                Effect::Load { url } => {
                    if self.loads.send(url).is_err() {
                        debug!("No player attached, load dropped");
                    }
                }
                Effect::StartTimer { kind, after } => {
                    self.timers.insert(kind, now + after);
                }
                Effect::CancelTimer(kind) => {
                    self.timers.remove(&kind);
                }
                Effect::CancelAllTimers => {
                    self.timers.clear();
                    self.fetch = None;
                }
                Effect::KeepAwake(wanted) => self.guard.set(wanted),
            }
        }

        let report = self.policy.report();
        self.status.send_if_modified(move |current| {
            if *current != report {
                debug!(phase = %report.phase, retry = report.retry_count, "Live status");
                *current = report;
                true
            } else {
                false
            }
        });
    }
}

async fn wait_fetch(
    fetch: &mut Option<PendingFetch>,
) -> (u64, std::result::Result<String, StreamError>) {
    match fetch {
        Some(pending) => {
            let result = (&mut pending.future).await;
            (pending.ticket, result)
        }
        None => std::future::pending().await,
    }
}

async fn wait_timer(next: Option<(TimerKind, Instant)>) -> TimerKind {
    match next {
        Some((kind, at)) => {
            sleep_until(at).await;
            kind
        }
        None => std::future::pending().await,
    }
}
