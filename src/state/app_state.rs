use crate::components::screens::ScreenKind;
use crate::components::status::StatusLight;
use crate::state::ticker::TickerQuote;
use log::{debug, info, warn};
use mlb_api::{GameRecord, ScheduleEntry, StandingsTable};
use std::time::{Duration, Instant};

/// Where the loop is in its life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Refreshing,
    Rotating,
    /// Connectivity could not be established; retrying until an operator restarts.
    Failed,
}

/// Everything the last successful pull produced. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub date: String,
    pub games: Vec<GameRecord>,
    pub favorite_game: Option<GameRecord>,
    pub standings: StandingsTable,
    pub schedule: Vec<ScheduleEntry>,
    pub ticker: Option<TickerQuote>,
}

/// Fires once `interval` has passed since the last mark; immediately if never marked.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    interval: Duration,
    last_run: Option<Instant>,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_run: None }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.last_run
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }

    pub fn mark(&mut self, now: Instant) {
        self.last_run = Some(now);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub message: String,
    pub since: Instant,
}

/// What the display should show right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveScreen {
    Splash,
    Error,
    Page(ScreenKind),
}

#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub refresh: Duration,
    pub rotation: Duration,
    pub recovery: Duration,
    pub housekeeping: Duration,
}

/// The loop's state machine. Pure: every transition takes `now` and does no I/O.
#[derive(Debug)]
pub struct ScoreboardState {
    phase: Phase,
    snapshot: Option<Snapshot>,
    rotation: Vec<ScreenKind>,
    current: usize,
    error: Option<ErrorNotice>,
    status: StatusLight,
    refresh: IntervalTimer,
    rotate: IntervalTimer,
    recovery: IntervalTimer,
    housekeeping: IntervalTimer,
    started: Instant,
}

impl ScoreboardState {
    pub fn new(rotation: Vec<ScreenKind>, timings: Timings, now: Instant) -> Self {
        let mut housekeeping = IntervalTimer::new(timings.housekeeping);
        housekeeping.mark(now);
        Self {
            phase: Phase::Uninitialized,
            snapshot: None,
            rotation,
            current: 0,
            error: None,
            status: StatusLight::Startup,
            refresh: IntervalTimer::new(timings.refresh),
            rotate: IntervalTimer::new(timings.rotation),
            recovery: IntervalTimer::new(timings.recovery),
            housekeeping,
            started: now,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorNotice> {
        self.error.as_ref()
    }

    pub fn status(&self) -> StatusLight {
        self.status
    }

    pub fn uptime(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    pub fn active_screen(&self) -> ActiveScreen {
        if self.error.is_some() {
            return ActiveScreen::Error;
        }
        match (&self.snapshot, self.rotation.get(self.current)) {
            (Some(_), Some(kind)) => ActiveScreen::Page(*kind),
            _ => ActiveScreen::Splash,
        }
    }

    fn transition(&mut self, next: Phase) {
        if self.phase != next {
            debug!("phase {:?} -> {:?}", self.phase, next);
            self.phase = next;
        }
    }

    pub fn begin_init(&mut self) {
        if self.phase == Phase::Uninitialized {
            self.transition(Phase::Initializing);
            self.status = StatusLight::Connecting;
        }
    }

    pub fn init_succeeded(&mut self) {
        self.transition(Phase::Ready);
        self.status = StatusLight::Online;
        self.error = None;
    }

    pub fn init_failed(&mut self, reason: impl Into<String>, now: Instant) {
        let message = reason.into();
        warn!("initialisation failed: {message}");
        self.transition(Phase::Failed);
        self.status = StatusLight::Error;
        self.error = Some(ErrorNotice { message, since: now });
        self.recovery.mark(now);
    }

    pub fn recovery_due(&self, now: Instant) -> bool {
        self.phase == Phase::Failed && self.recovery.is_due(now)
    }

    pub fn recovery_attempted(&mut self, connected: bool, now: Instant) {
        self.recovery.mark(now);
        if connected {
            info!("connectivity recovered");
            self.init_succeeded();
        }
    }

    pub fn refresh_due(&self, now: Instant) -> bool {
        self.phase == Phase::Ready && self.refresh.is_due(now)
    }

    pub fn begin_refresh(&mut self) {
        self.transition(Phase::Refreshing);
        self.status = StatusLight::DataRefresh;
    }

    pub fn refresh_succeeded(&mut self, snapshot: Snapshot, now: Instant) {
        if self.snapshot.is_none() {
            // First data: start the rotation from its first page.
            self.current = 0;
            self.rotate.mark(now);
        }
        self.snapshot = Some(snapshot);
        self.error = None;
        self.refresh.mark(now);
        self.status = StatusLight::Online;
        self.transition(Phase::Ready);
    }

    /// The pull failed: keep the last good snapshot, show why, and wait a full interval.
    pub fn refresh_failed(&mut self, reason: impl Into<String>, now: Instant) {
        self.error = Some(ErrorNotice { message: reason.into(), since: now });
        self.refresh.mark(now);
        self.status = StatusLight::DataError;
        self.transition(Phase::Ready);
    }

    pub fn rotation_due(&self, now: Instant) -> bool {
        self.phase == Phase::Ready
            && self.snapshot.is_some()
            && !self.rotation.is_empty()
            && self.rotate.is_due(now)
    }

    /// Advance round-robin to the next page. A pending error overlay is dropped
    /// since there is good data to show underneath.
    pub fn rotate(&mut self, now: Instant) {
        self.transition(Phase::Rotating);
        if !self.rotation.is_empty() {
            self.current = (self.current + 1) % self.rotation.len();
        }
        self.error = None;
        self.rotate.mark(now);
        self.transition(Phase::Ready);
    }

    /// Last-resort handler for an iteration that blew up.
    pub fn iteration_failed(&mut self, reason: impl Into<String>, now: Instant) {
        self.error = Some(ErrorNotice { message: reason.into(), since: now });
        self.status = StatusLight::Error;
        if matches!(self.phase, Phase::Refreshing | Phase::Rotating) {
            self.refresh.mark(now);
            self.transition(Phase::Ready);
        }
    }

    pub fn housekeeping_due(&self, now: Instant) -> bool {
        self.housekeeping.is_due(now)
    }

    pub fn housekeeping_done(&mut self, now: Instant) {
        self.housekeeping.mark(now);
    }

    pub fn link_lost(&mut self) {
        self.status = StatusLight::Connecting;
    }

    pub fn link_restored(&mut self) {
        self.status = StatusLight::Online;
    }
}
