//! Retry and failover state machine of the live screen.
//!
//! The policy is synchronous and does no I/O: every input (mount, resolver
//! result, player event, timer firing, focus change, user retry, unmount)
//! comes with the current instant and returns the [`Effect`]s the driver has
//! to carry out. Timers are identified by [`TimerKind`]; arming a kind
//! replaces the previous timer of that kind.
//!
//! ```text
//! Idle ─mount─▶ FetchingUrl ─url─▶ Connecting ─playing─▶ Playing ─10s─▶ Stable
//!                   │                  ▲   │                 │   ▲
//!                   │ 3 × fail         │   │ error           ▼   │ playing
//!                   ▼                  │   ▼             Buffering
//!                 Error ◀─exhausted── retry / failover ◀──error──┘
//!                   │ poll every 30s (primary only)
//!                   └──────────url──────────▶ Connecting
//! ```

use crate::constants::{OFFLINE_MESSAGE, STALLED_CODE};
use crate::error::StreamError;
use crate::events::PlaybackEvent;
use crate::retry::RetryConfig;
use crate::state::{Phase, StatusReport, StreamState};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Timers owned by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Pause between two channel-status requests
    FetchBackoff,
    /// Delay before reloading the player after an error
    Reconnect,
    /// End of the stability window
    Stability,
    /// Background resolver poll while offline
    RecoveryPoll,
    /// Connecting or buffering for too long
    BufferingWatchdog,
}

/// Inputs of the policy
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Mount,
    /// Result of the fetch started with `Effect::Fetch { ticket }`
    Resolved {
        ticket: u64,
        result: Result<String, StreamError>,
    },
    Player(PlaybackEvent),
    Timer(TimerKind),
    Focus(bool),
    UserRetry,
    Unmount,
}

/// Actions requested from the driver
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Ask the resolver for the stream URL; supersedes any fetch in flight
    Fetch { ticket: u64 },
    /// Load this URL in the player
    Load { url: String },
    StartTimer { kind: TimerKind, after: Duration },
    CancelTimer(TimerKind),
    /// Drop every timer and the fetch in flight
    CancelAllTimers,
    /// Acquire (`true`) or release (`false`) the keep-awake lock
    KeepAwake(bool),
}

/// Live stream failover policy
#[derive(Debug)]
pub struct FailoverPolicy {
    config: RetryConfig,
    backup_url: Option<String>,
    state: StreamState,
    focused: bool,
    unmounted: bool,
    armed: HashSet<TimerKind>,
    next_ticket: u64,
    pending_fetch: Option<u64>,
    keep_awake: bool,
    effects: Vec<Effect>,
}

impl FailoverPolicy {
    /// Create a policy; an empty backup URL counts as no backup
    pub fn new(config: RetryConfig, backup_url: Option<String>) -> Self {
        Self {
            config,
            backup_url: backup_url.filter(|url| !url.trim().is_empty()),
            state: StreamState::default(),
            focused: true,
            unmounted: false,
            armed: HashSet::new(),
            next_ticket: 1,
            pending_fetch: None,
            keep_awake: false,
            effects: Vec::new(),
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn backup_url(&self) -> Option<&str> {
        self.backup_url.as_deref()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }

    /// Whether the keep-awake lock should currently be held
    pub fn keep_awake_held(&self) -> bool {
        self.keep_awake
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.armed.contains(&kind)
    }

    /// Ticket of the fetch whose result is awaited
    pub fn pending_fetch(&self) -> Option<u64> {
        self.pending_fetch
    }

    pub fn report(&self) -> StatusReport {
        let message = match (&self.state.phase, &self.state.error) {
            (Phase::Error, Some(err)) => Some(err.to_string()),
            _ => None,
        };

        StatusReport {
            phase: self.state.phase,
            url: self.state.current_url.clone(),
            is_primary: self.state.is_primary,
            retry_count: self.state.retry_count,
            is_playing: self.state.is_playing,
            message,
            recovering: self.state.recovering,
            keep_awake: self.keep_awake,
        }
    }

    /// Feed one input; returns the effects in the order they must be applied
    pub fn handle(&mut self, input: Input, now: Instant) -> Vec<Effect> {
        if self.unmounted {
            debug!(?input, "Live policy unmounted, input ignored");
            return Vec::new();
        }

        match input {
            Input::Mount => self.on_mount(),
            Input::Resolved { ticket, result } => self.on_resolved(ticket, result),
            Input::Player(event) => self.on_player(event, now),
            Input::Timer(kind) => self.on_timer(kind, now),
            Input::Focus(focused) => {
                debug!(focused, "Live screen focus changed");
                self.focused = focused;
            }
            Input::UserRetry => self.on_user_retry(),
            Input::Unmount => self.on_unmount(),
        }

        self.refresh_keep_awake();
        std::mem::take(&mut self.effects)
    }

    // ========================================================================
    // Resolver
    // ========================================================================

    fn on_mount(&mut self) {
        if self.state.phase != Phase::Idle {
            debug!(phase = %self.state.phase, "Already mounted");
            return;
        }
        info!("Live screen mounted, fetching stream URL");
        self.start_fetch_round();
    }

    fn start_fetch_round(&mut self) {
        self.state.phase = Phase::FetchingUrl;
        self.state.fetch_attempts = 1;
        self.issue_fetch();
    }

    fn issue_fetch(&mut self) {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending_fetch = Some(ticket);
        self.effects.push(Effect::Fetch { ticket });
    }

    fn on_resolved(&mut self, ticket: u64, result: Result<String, StreamError>) {
        if self.pending_fetch != Some(ticket) {
            debug!(ticket, "Stale stream URL result ignored");
            return;
        }
        self.pending_fetch = None;

        match result {
            Ok(url) if !url.trim().is_empty() => self.on_url(url.trim().to_string()),
            Ok(_) => self.on_fetch_failed(StreamError::network("empty stream URL")),
            Err(err) => self.on_fetch_failed(err),
        }
    }

    fn on_url(&mut self, url: String) {
        match self.state.phase {
            Phase::FetchingUrl => info!(%url, "Stream URL obtained"),
            Phase::Error if self.state.recovering => {
                info!(%url, "Stream back online");
                self.state.recovering = false;
            }
            phase => {
                debug!(%phase, "Stream URL outside of a fetch ignored");
                return;
            }
        }

        self.state.fetch_attempts = 0;
        self.state.retry_count = 0;
        self.state.error = None;
        self.state.is_primary = true;
        self.connect(url);
    }

    fn on_fetch_failed(&mut self, err: StreamError) {
        match self.state.phase {
            Phase::FetchingUrl => {
                warn!(
                    attempt = self.state.fetch_attempts,
                    budget = self.config.fetch_budget(),
                    "Stream URL fetch failed: {}",
                    err
                );
                self.state.error = Some(err);

                if self.state.fetch_attempts < self.config.fetch_budget() {
                    self.arm(TimerKind::FetchBackoff, self.config.fetch_backoff());
                } else if let Some(backup) = self.failover_target() {
                    self.fail_over(backup);
                } else {
                    self.enter_terminal(OFFLINE_MESSAGE);
                }
            }
            Phase::Error if self.state.recovering => {
                debug!("Background recovery poll failed: {}", err);
                self.arm(TimerKind::RecoveryPoll, self.config.recovery_poll());
            }
            phase => debug!(%phase, "Fetch failure outside of a fetch ignored"),
        }
    }

    // ========================================================================
    // Player
    // ========================================================================

    fn on_player(&mut self, event: PlaybackEvent, now: Instant) {
        match event {
            PlaybackEvent::Playing => self.on_playing(),
            PlaybackEvent::Error(code) => self.on_error(StreamError::playback(code), now),
            ref buffering if buffering.is_buffering() => self.on_buffering(buffering),
            _ => debug!(%event, phase = %self.state.phase, "Player progress"),
        }
    }

    fn on_playing(&mut self) {
        match self.state.phase {
            Phase::Connecting if self.is_armed(TimerKind::Reconnect) => {
                // Le lecteur n'a pas encore été rechargé
                debug!("Playing event from the previous load ignored");
            }
            Phase::Connecting => {
                info!(
                    url = ?self.state.current_url,
                    primary = self.state.is_primary,
                    "Stream playing"
                );
                self.cancel(TimerKind::BufferingWatchdog);
                self.state.phase = Phase::Playing;
                self.state.is_playing = true;
                self.arm(TimerKind::Stability, self.config.stability_window());
            }
            Phase::Buffering => {
                self.cancel(TimerKind::BufferingWatchdog);
                self.state.phase = if self.state.is_stable {
                    Phase::Stable
                } else {
                    Phase::Playing
                };
                debug!(phase = %self.state.phase, "Buffering over");
            }
            Phase::Playing | Phase::Stable => {}
            phase => debug!(%phase, "Playing event ignored"),
        }
    }

    fn on_buffering(&mut self, event: &PlaybackEvent) {
        match self.state.phase {
            Phase::Playing | Phase::Stable => {
                debug!(%event, "Stream buffering");
                self.state.phase = Phase::Buffering;
                self.arm(TimerKind::BufferingWatchdog, self.config.buffering_timeout());
            }
            phase => debug!(%event, %phase, "Buffering event ignored"),
        }
    }

    fn on_error(&mut self, err: StreamError, now: Instant) {
        if !self.state.phase.has_player() {
            debug!(phase = %self.state.phase, "Player error without player ignored: {}", err);
            return;
        }

        if let Some(last) = self.state.last_error_at {
            if self.state.last_error_hit_stable
                && now.saturating_duration_since(last) < self.config.error_debounce()
            {
                debug!("Error right after a stable connection dropped: {}", err);
                return;
            }
        }

        if self.is_armed(TimerKind::Reconnect) {
            debug!("Error before reload ignored: {}", err);
            return;
        }

        warn!(
            retry = self.state.retry_count,
            primary = self.state.is_primary,
            "Playback error: {}",
            err
        );

        self.state.last_error_hit_stable = self.state.is_stable;
        self.state.last_error_at = Some(now);
        self.cancel(TimerKind::Stability);
        self.cancel(TimerKind::BufferingWatchdog);
        self.state.is_playing = false;
        self.state.is_stable = false;
        self.state.error = Some(err);

        if self.state.retry_count < self.config.max_retries {
            self.state.retry_count += 1;
            self.state.phase = Phase::Connecting;
            self.arm(TimerKind::Reconnect, self.config.reconnect_delay());
        } else if let Some(backup) = self.failover_target() {
            self.fail_over(backup);
        } else {
            let message = format!(
                "playback failed after {} retries",
                self.config.max_retries
            );
            self.enter_terminal(&message);
        }
    }

    // ========================================================================
    // Timers
    // ========================================================================

    fn on_timer(&mut self, kind: TimerKind, now: Instant) {
        if !self.armed.remove(&kind) {
            debug!(?kind, "Timer not armed, ignored");
            return;
        }

        match kind {
            TimerKind::FetchBackoff if self.state.phase == Phase::FetchingUrl => {
                self.state.fetch_attempts += 1;
                debug!(attempt = self.state.fetch_attempts, "Retrying stream URL fetch");
                self.issue_fetch();
            }
            TimerKind::Reconnect if self.state.phase == Phase::Connecting => {
                if let Some(url) = self.state.current_url.clone() {
                    info!(%url, retry = self.state.retry_count, "Reconnecting");
                    self.load(url);
                }
            }
            TimerKind::Stability
                if matches!(self.state.phase, Phase::Playing | Phase::Buffering) =>
            {
                debug!("Stream stable");
                self.state.is_stable = true;
                self.state.retry_count = 0;
                if self.state.phase == Phase::Playing {
                    self.state.phase = Phase::Stable;
                }
            }
            TimerKind::RecoveryPoll
                if self.state.phase == Phase::Error && self.state.recovering =>
            {
                debug!("Background recovery poll");
                self.issue_fetch();
            }
            TimerKind::BufferingWatchdog
                if matches!(self.state.phase, Phase::Connecting | Phase::Buffering) =>
            {
                warn!(phase = %self.state.phase, "Stream stalled");
                self.on_error(StreamError::playback(STALLED_CODE), now);
            }
            kind => debug!(?kind, phase = %self.state.phase, "Timer fired in another phase"),
        }
    }

    fn arm(&mut self, kind: TimerKind, after: Duration) {
        self.armed.insert(kind);
        self.effects.push(Effect::StartTimer { kind, after });
    }

    fn cancel(&mut self, kind: TimerKind) {
        if self.armed.remove(&kind) {
            self.effects.push(Effect::CancelTimer(kind));
        }
    }

    fn cancel_all(&mut self) {
        self.armed.clear();
        self.pending_fetch = None;
        self.effects.push(Effect::CancelAllTimers);
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn connect(&mut self, url: String) {
        self.cancel(TimerKind::FetchBackoff);
        self.cancel(TimerKind::Reconnect);
        self.cancel(TimerKind::Stability);
        self.cancel(TimerKind::RecoveryPoll);
        self.state.phase = Phase::Connecting;
        self.state.current_url = Some(url.clone());
        self.state.is_playing = false;
        self.state.is_stable = false;
        self.load(url);
    }

    fn load(&mut self, url: String) {
        self.effects.push(Effect::Load { url });
        self.arm(TimerKind::BufferingWatchdog, self.config.buffering_timeout());
    }

    /// Backup URL if the one-time failover is still available
    fn failover_target(&self) -> Option<String> {
        if self.state.is_primary && !self.state.failover_used {
            self.backup_url.clone()
        } else {
            None
        }
    }

    fn fail_over(&mut self, backup: String) {
        warn!(backup = %backup, "Primary stream exhausted, switching to backup");
        self.state.failover_used = true;
        self.state.is_primary = false;
        self.state.retry_count = 0;
        self.connect(backup);
    }

    fn enter_terminal(&mut self, message: &str) {
        self.cancel(TimerKind::FetchBackoff);
        self.cancel(TimerKind::Reconnect);
        self.cancel(TimerKind::Stability);
        self.cancel(TimerKind::BufferingWatchdog);

        self.state.phase = Phase::Error;
        self.state.is_playing = false;
        self.state.is_stable = false;
        self.state.error = Some(StreamError::exhausted(message));

        // Pas de retour automatique au primaire une fois sur le secours
        self.state.recovering = self.state.is_primary;
        if self.state.recovering {
            warn!(
                poll = ?self.config.recovery_poll(),
                "{}, polling in background",
                message
            );
            self.arm(TimerKind::RecoveryPoll, self.config.recovery_poll());
        } else {
            warn!("{}, waiting for user retry", message);
        }
    }

    fn on_user_retry(&mut self) {
        if self.state.phase == Phase::Idle {
            debug!("Retry before mount ignored");
            return;
        }
        info!("Manual retry, back to the primary stream");
        self.cancel_all();
        self.state = StreamState::default();
        self.start_fetch_round();
    }

    fn on_unmount(&mut self) {
        info!(phase = %self.state.phase, "Live screen unmounted");
        self.cancel_all();
        self.unmounted = true;
        self.state.is_playing = false;
        self.state.recovering = false;
    }

    fn refresh_keep_awake(&mut self) {
        let wanted = !self.unmounted
            && self.focused
            && self.state.is_playing
            && self.state.phase != Phase::Error;

        if wanted != self.keep_awake {
            debug!(keep_awake = wanted, "Keep-awake changed");
            self.keep_awake = wanted;
            self.effects.push(Effect::KeepAwake(wanted));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMARY: &str = "https://live.example/primary.m3u8";
    const BACKUP: &str = "https://backup.example/live.m3u8";

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn with_backup() -> FailoverPolicy {
        FailoverPolicy::new(RetryConfig::default(), Some(BACKUP.to_string()))
    }

    fn without_backup() -> FailoverPolicy {
        FailoverPolicy::new(RetryConfig::default(), None)
    }

    fn fetch_ticket(effects: &[Effect]) -> Option<u64> {
        effects.iter().find_map(|e| match e {
            Effect::Fetch { ticket } => Some(*ticket),
            _ => None,
        })
    }

    fn loaded_url(effects: &[Effect]) -> Option<&str> {
        effects.iter().find_map(|e| match e {
            Effect::Load { url } => Some(url.as_str()),
            _ => None,
        })
    }

    fn starts(effects: &[Effect], kind: TimerKind) -> Option<Duration> {
        effects.iter().find_map(|e| match e {
            Effect::StartTimer { kind: k, after } if *k == kind => Some(*after),
            _ => None,
        })
    }

    fn offline() -> Result<String, StreamError> {
        Err(StreamError::network("success: false"))
    }

    /// Mount and resolve the primary URL: phase Connecting, player loaded
    fn connected(policy: &mut FailoverPolicy, now: Instant) {
        let fx = policy.handle(Input::Mount, now);
        let ticket = fetch_ticket(&fx).unwrap();
        let fx = policy.handle(
            Input::Resolved {
                ticket,
                result: Ok(PRIMARY.to_string()),
            },
            now,
        );
        assert_eq!(loaded_url(&fx), Some(PRIMARY));
    }

    fn playing(policy: &mut FailoverPolicy, now: Instant) -> Vec<Effect> {
        policy.handle(Input::Player(PlaybackEvent::Playing), now)
    }

    fn error(policy: &mut FailoverPolicy, now: Instant) -> Vec<Effect> {
        policy.handle(Input::Player(PlaybackEvent::Error("3".to_string())), now)
    }

    #[test]
    fn test_mount_fetches_url() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        assert_eq!(policy.state().phase, Phase::Idle);

        let fx = policy.handle(Input::Mount, t0);
        assert_eq!(fx, vec![Effect::Fetch { ticket: 1 }]);
        assert_eq!(policy.state().phase, Phase::FetchingUrl);
        assert_eq!(policy.pending_fetch(), Some(1));
    }

    #[test]
    fn test_url_obtained_connects() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);

        let state = policy.state();
        assert_eq!(state.phase, Phase::Connecting);
        assert_eq!(state.current_url.as_deref(), Some(PRIMARY));
        assert!(state.is_primary);
        assert!(policy.is_armed(TimerKind::BufferingWatchdog));
    }

    #[test]
    fn test_playing_then_stable_resets_retries() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);

        let fx = playing(&mut policy, t0);
        assert_eq!(starts(&fx, TimerKind::Stability), Some(secs(10)));
        assert_eq!(policy.state().phase, Phase::Playing);

        // Une erreur, reconnexion, puis lecture stable
        error(&mut policy, t0 + secs(1));
        assert_eq!(policy.state().retry_count, 1);
        policy.handle(Input::Timer(TimerKind::Reconnect), t0 + secs(4));
        playing(&mut policy, t0 + secs(5));
        policy.handle(Input::Timer(TimerKind::Stability), t0 + secs(15));

        let state = policy.state();
        assert_eq!(state.phase, Phase::Stable);
        assert!(state.is_stable);
        assert_eq!(state.retry_count, 0);
    }

    #[test]
    fn test_error_below_max_retries_reconnects_same_url() {
        let mut policy = with_backup();
        let mut now = Instant::now();
        connected(&mut policy, now);

        for r in 0..policy.config().max_retries {
            assert_eq!(policy.state().retry_count, r);
            now += secs(1);
            let fx = error(&mut policy, now);

            let state = policy.state();
            assert_eq!(state.phase, Phase::Connecting);
            assert_eq!(state.current_url.as_deref(), Some(PRIMARY));
            assert!(state.is_primary);
            assert_eq!(state.retry_count, r + 1);
            assert_eq!(starts(&fx, TimerKind::Reconnect), Some(secs(3)));

            now += secs(3);
            let fx = policy.handle(Input::Timer(TimerKind::Reconnect), now);
            assert_eq!(loaded_url(&fx), Some(PRIMARY));
        }
    }

    #[test]
    fn test_exhausted_primary_fails_over_once() {
        let mut policy = with_backup();
        let mut now = Instant::now();
        connected(&mut policy, now);

        for _ in 0..policy.config().max_retries {
            now += secs(1);
            error(&mut policy, now);
            now += secs(3);
            policy.handle(Input::Timer(TimerKind::Reconnect), now);
        }

        now += secs(1);
        let fx = error(&mut policy, now);
        assert_eq!(loaded_url(&fx), Some(BACKUP));
        let state = policy.state();
        assert_eq!(state.phase, Phase::Connecting);
        assert!(!state.is_primary);
        assert!(state.failover_used);
        assert_eq!(state.retry_count, 0);

        // Le secours a aussi son budget, puis plus aucune bascule
        for _ in 0..policy.config().max_retries {
            now += secs(1);
            let fx = error(&mut policy, now);
            assert_eq!(loaded_url(&fx), None);
            now += secs(3);
            let fx = policy.handle(Input::Timer(TimerKind::Reconnect), now);
            assert_eq!(loaded_url(&fx), Some(BACKUP));
        }

        now += secs(1);
        let fx = error(&mut policy, now);
        assert_eq!(loaded_url(&fx), None);
        let state = policy.state();
        assert_eq!(state.phase, Phase::Error);
        assert!(!state.is_primary);
        assert!(!state.recovering);
        assert!(matches!(state.error, Some(StreamError::ExhaustedRetries { .. })));
        assert!(!policy.is_armed(TimerKind::RecoveryPoll));
    }

    #[test]
    fn test_exhausted_without_backup_starts_recovery() {
        let mut policy = without_backup();
        let mut now = Instant::now();
        connected(&mut policy, now);

        for _ in 0..policy.config().max_retries {
            now += secs(1);
            error(&mut policy, now);
            now += secs(3);
            policy.handle(Input::Timer(TimerKind::Reconnect), now);
        }
        now += secs(1);
        let fx = error(&mut policy, now);

        assert_eq!(policy.state().phase, Phase::Error);
        assert!(policy.state().recovering);
        assert!(policy.state().is_primary);
        assert_eq!(starts(&fx, TimerKind::RecoveryPoll), Some(secs(30)));
        assert!(policy.report().can_retry());
    }

    #[test]
    fn test_error_after_stable_is_debounced() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);
        playing(&mut policy, t0);
        policy.handle(Input::Timer(TimerKind::Stability), t0 + secs(10));
        assert_eq!(policy.state().phase, Phase::Stable);

        error(&mut policy, t0 + secs(11));
        assert_eq!(policy.state().retry_count, 1);
        let after_first = policy.state().clone();

        let fx = error(&mut policy, t0 + secs(12));
        assert!(fx.is_empty());
        assert_eq!(policy.state(), &after_first);
    }

    #[test]
    fn test_error_after_reload_within_debounce_is_dropped() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);
        playing(&mut policy, t0);
        policy.handle(Input::Timer(TimerKind::Stability), t0 + secs(10));

        error(&mut policy, t0 + secs(11));
        let fx = policy.handle(Input::Timer(TimerKind::Reconnect), t0 + secs(14));
        assert!(loaded_url(&fx).is_some());
        playing(&mut policy, t0 + Duration::from_millis(14_500));
        assert!(!policy.is_armed(TimerKind::Reconnect));
        assert_eq!(policy.state().phase, Phase::Playing);
        let before = policy.state().clone();

        // 4 s après la première erreur, le lecteur rechargé est déjà actif
        let fx = error(&mut policy, t0 + secs(15));
        assert!(fx.is_empty());
        assert_eq!(policy.state(), &before);
        assert_eq!(policy.state().retry_count, 1);
        assert_eq!(policy.state().phase, Phase::Playing);
    }

    #[test]
    fn test_debounce_expires() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);
        playing(&mut policy, t0);
        policy.handle(Input::Timer(TimerKind::Stability), t0 + secs(10));

        error(&mut policy, t0 + secs(11));
        policy.handle(Input::Timer(TimerKind::Reconnect), t0 + secs(14));
        playing(&mut policy, t0 + secs(15));

        error(&mut policy, t0 + secs(17));
        assert_eq!(policy.state().retry_count, 2);
    }

    #[test]
    fn test_no_debounce_without_stable() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);
        playing(&mut policy, t0);

        error(&mut policy, t0 + secs(1));
        policy.handle(Input::Timer(TimerKind::Reconnect), t0 + secs(4));
        error(&mut policy, t0 + secs(5));
        assert_eq!(policy.state().retry_count, 2);
    }

    #[test]
    fn test_unmount_cancels_everything() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);
        playing(&mut policy, t0);
        assert!(policy.keep_awake_held());

        let fx = policy.handle(Input::Unmount, t0 + secs(1));
        assert!(fx.contains(&Effect::CancelAllTimers));
        assert!(fx.contains(&Effect::KeepAwake(false)));
        assert!(policy.is_unmounted());

        let snapshot = policy.state().clone();
        for kind in [
            TimerKind::Stability,
            TimerKind::Reconnect,
            TimerKind::BufferingWatchdog,
            TimerKind::RecoveryPoll,
            TimerKind::FetchBackoff,
        ] {
            assert!(policy.handle(Input::Timer(kind), t0 + secs(30)).is_empty());
        }
        assert!(error(&mut policy, t0 + secs(31)).is_empty());
        assert_eq!(policy.state(), &snapshot);
    }

    #[test]
    fn test_keep_awake_follows_focus_and_playback() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);
        assert!(!policy.keep_awake_held());

        let fx = playing(&mut policy, t0);
        assert!(fx.contains(&Effect::KeepAwake(true)));

        let fx = policy.handle(Input::Focus(false), t0 + secs(1));
        assert_eq!(fx, vec![Effect::KeepAwake(false)]);

        let fx = policy.handle(Input::Focus(true), t0 + secs(2));
        assert_eq!(fx, vec![Effect::KeepAwake(true)]);

        // Buffering garde le verrou
        policy.handle(Input::Player(PlaybackEvent::Waiting), t0 + secs(3));
        assert_eq!(policy.state().phase, Phase::Buffering);
        assert!(policy.keep_awake_held());

        let fx = error(&mut policy, t0 + secs(4));
        assert!(fx.contains(&Effect::KeepAwake(false)));
    }

    #[test]
    fn test_keep_awake_never_in_error() {
        let mut policy = without_backup();
        let config = policy.config().clone();
        let mut now = Instant::now();
        connected(&mut policy, now);

        for _ in 0..=config.max_retries {
            playing(&mut policy, now);
            now += secs(1);
            error(&mut policy, now);
            now += secs(3);
            policy.handle(Input::Timer(TimerKind::Reconnect), now);
        }

        assert_eq!(policy.state().phase, Phase::Error);
        policy.handle(Input::Focus(true), now);
        assert!(!policy.keep_awake_held());
    }

    #[test]
    fn test_offline_then_background_recovery() {
        let mut policy = without_backup();
        let t0 = Instant::now();

        let mut fx = policy.handle(Input::Mount, t0);
        for attempt in 1..=3u64 {
            let ticket = fetch_ticket(&fx).unwrap();
            let now = t0 + secs(2 * (attempt - 1));
            fx = policy.handle(
                Input::Resolved {
                    ticket,
                    result: offline(),
                },
                now,
            );
            if attempt < 3 {
                assert_eq!(starts(&fx, TimerKind::FetchBackoff), Some(secs(2)));
                fx = policy.handle(Input::Timer(TimerKind::FetchBackoff), now + secs(2));
            }
        }

        let report = policy.report();
        assert_eq!(report.phase, Phase::Error);
        assert_eq!(report.message.as_deref(), Some("stream offline"));
        assert!(report.recovering);
        assert_eq!(starts(&fx, TimerKind::RecoveryPoll), Some(secs(30)));

        // Premier sondage : toujours hors ligne
        let fx = policy.handle(Input::Timer(TimerKind::RecoveryPoll), t0 + secs(34));
        let ticket = fetch_ticket(&fx).unwrap();
        let fx = policy.handle(
            Input::Resolved {
                ticket,
                result: offline(),
            },
            t0 + secs(34),
        );
        assert_eq!(policy.state().phase, Phase::Error);
        assert_eq!(starts(&fx, TimerKind::RecoveryPoll), Some(secs(30)));

        // Second sondage : le direct est revenu
        let fx = policy.handle(Input::Timer(TimerKind::RecoveryPoll), t0 + secs(64));
        let ticket = fetch_ticket(&fx).unwrap();
        let fx = policy.handle(
            Input::Resolved {
                ticket,
                result: Ok("https://x/live.m3u8".to_string()),
            },
            t0 + secs(64),
        );

        assert_eq!(loaded_url(&fx), Some("https://x/live.m3u8"));
        let state = policy.state();
        assert_eq!(state.phase, Phase::Connecting);
        assert_eq!(state.current_url.as_deref(), Some("https://x/live.m3u8"));
        assert!(!state.recovering);
        assert!(policy.report().message.is_none());
    }

    #[test]
    fn test_fetch_exhausted_uses_backup() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        let mut fx = policy.handle(Input::Mount, t0);

        for attempt in 1..=3 {
            let ticket = fetch_ticket(&fx).unwrap();
            fx = policy.handle(
                Input::Resolved {
                    ticket,
                    result: offline(),
                },
                t0,
            );
            if attempt < 3 {
                fx = policy.handle(Input::Timer(TimerKind::FetchBackoff), t0);
            }
        }

        assert_eq!(loaded_url(&fx), Some(BACKUP));
        assert!(!policy.state().is_primary);
        assert!(policy.state().failover_used);
    }

    #[test]
    fn test_user_retry_resets_to_primary() {
        let mut policy = with_backup();
        let mut now = Instant::now();
        connected(&mut policy, now);
        for _ in 0..=policy.config().max_retries {
            now += secs(1);
            error(&mut policy, now);
            now += secs(3);
            policy.handle(Input::Timer(TimerKind::Reconnect), now);
        }
        assert!(!policy.state().is_primary);

        let fx = policy.handle(Input::UserRetry, now);
        assert_eq!(fx[0], Effect::CancelAllTimers);
        let ticket = fetch_ticket(&fx).unwrap();

        let state = policy.state();
        assert_eq!(state.phase, Phase::FetchingUrl);
        assert!(state.is_primary);
        assert!(!state.failover_used);
        assert_eq!(state.retry_count, 0);

        let fx = policy.handle(
            Input::Resolved {
                ticket,
                result: Ok(PRIMARY.to_string()),
            },
            now,
        );
        assert_eq!(loaded_url(&fx), Some(PRIMARY));
    }

    #[test]
    fn test_stale_fetch_result_ignored() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        let fx = policy.handle(Input::Mount, t0);
        let old_ticket = fetch_ticket(&fx).unwrap();

        let fx = policy.handle(Input::UserRetry, t0);
        let new_ticket = fetch_ticket(&fx).unwrap();
        assert_ne!(old_ticket, new_ticket);

        let fx = policy.handle(
            Input::Resolved {
                ticket: old_ticket,
                result: Ok("https://stale.example/old.m3u8".to_string()),
            },
            t0,
        );
        assert!(fx.is_empty());
        assert_eq!(policy.state().phase, Phase::FetchingUrl);
    }

    #[test]
    fn test_empty_url_counts_as_failure() {
        let mut policy = without_backup();
        let t0 = Instant::now();
        let fx = policy.handle(Input::Mount, t0);
        let ticket = fetch_ticket(&fx).unwrap();

        let fx = policy.handle(
            Input::Resolved {
                ticket,
                result: Ok("   ".to_string()),
            },
            t0,
        );
        assert_eq!(policy.state().phase, Phase::FetchingUrl);
        assert!(starts(&fx, TimerKind::FetchBackoff).is_some());
    }

    #[test]
    fn test_buffering_watchdog_reports_stall() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);
        playing(&mut policy, t0);

        let fx = policy.handle(Input::Player(PlaybackEvent::Stalled), t0 + secs(2));
        assert_eq!(starts(&fx, TimerKind::BufferingWatchdog), Some(secs(20)));
        assert_eq!(policy.state().phase, Phase::Buffering);

        policy.handle(Input::Timer(TimerKind::BufferingWatchdog), t0 + secs(22));
        let state = policy.state();
        assert_eq!(state.phase, Phase::Connecting);
        assert_eq!(state.retry_count, 1);
        assert_eq!(state.error, Some(StreamError::playback("stalled")));
    }

    #[test]
    fn test_buffering_returns_to_stable() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);
        playing(&mut policy, t0);
        policy.handle(Input::Timer(TimerKind::Stability), t0 + secs(10));

        policy.handle(Input::Player(PlaybackEvent::Waiting), t0 + secs(12));
        assert_eq!(policy.state().phase, Phase::Buffering);
        let fx = playing(&mut policy, t0 + secs(13));
        assert!(fx.contains(&Effect::CancelTimer(TimerKind::BufferingWatchdog)));
        assert_eq!(policy.state().phase, Phase::Stable);
    }

    #[test]
    fn test_unarmed_timer_ignored() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);
        let snapshot = policy.state().clone();

        assert!(policy
            .handle(Input::Timer(TimerKind::Stability), t0 + secs(10))
            .is_empty());
        assert!(policy
            .handle(Input::Timer(TimerKind::RecoveryPoll), t0 + secs(30))
            .is_empty());
        assert_eq!(policy.state(), &snapshot);
    }

    #[test]
    fn test_playing_before_reload_ignored() {
        let mut policy = with_backup();
        let t0 = Instant::now();
        connected(&mut policy, t0);
        playing(&mut policy, t0);
        error(&mut policy, t0 + secs(1));

        playing(&mut policy, t0 + secs(2));
        assert_eq!(policy.state().phase, Phase::Connecting);
        assert!(!policy.state().is_playing);
    }
}
