use crate::components::scene::Scene;
use crate::components::screens::{ScreenSet, error_scene, splash_scene};
use crate::draw::MatrixDisplay;
use crate::state::app_settings::Settings;
use crate::state::app_state::{ActiveScreen, Phase, ScoreboardState, Timings};
use crate::state::network::NetworkLink;
use crate::state::refresher;
use anyhow::bail;
use futures_util::FutureExt;
use log::{error, info, warn};
use mlb_api::client::StatsClient;
use mlb_api::clock::{Clock, SystemClock};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    /// Exit so the supervisor starts a fresh process.
    Restart,
}

/// The application loop: owns the client, the state machine and the screens,
/// and is the only writer of the data snapshot.
pub struct App<L, C = SystemClock> {
    pub settings: Settings,
    pub state: ScoreboardState,
    screens: ScreenSet,
    client: StatsClient<L, C>,
    exit: Option<ExitReason>,
}

impl<L: NetworkLink, C: Clock> App<L, C> {
    pub fn new(settings: Settings, link: L, clock: C) -> Self {
        let client = StatsClient::with_clock(link, clock)
            .with_base_url(settings.base_url.clone())
            .with_ttl(settings.cache_ttl());
        let screens = ScreenSet::new(&settings.favorite_team, settings.ticker.is_some());
        let timings = Timings {
            refresh: settings.refresh_interval(),
            rotation: settings.rotation_speed(),
            recovery: settings.recovery_retry(),
            housekeeping: settings.housekeeping_interval(),
        };
        let state = ScoreboardState::new(screens.rotation(), timings, client.clock().now());

        Self { settings, state, screens, client, exit: None }
    }

    fn now(&self) -> Instant {
        self.client.clock().now()
    }

    pub fn exit_reason(&self) -> Option<ExitReason> {
        self.exit
    }

    pub fn request_exit(&mut self, reason: ExitReason) {
        info!("exit requested: {reason:?}");
        self.exit = Some(reason);
    }

    /// One pass of the loop: advance the state machine, then show the active
    /// screen. Returns how long to pause before the next pass.
    pub async fn step<D: MatrixDisplay>(&mut self, display: &mut D) -> Duration {
        let outcome = AssertUnwindSafe(self.iterate()).catch_unwind().await;
        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(format!("{e:#}")),
            Err(panic) => Some(format!("panicked: {}", panic_message(&*panic))),
        };
        let failure = failure.or_else(|| {
            self.render(display)
                .err()
                .map(|e| format!("display failed: {e}"))
        });

        let Some(reason) = failure else {
            return self.settings.loop_pause();
        };

        error!("loop iteration failed: {reason}");
        let now = self.now();
        self.state.iteration_failed(reason, now);
        if !self.client.fetcher().is_connected() {
            error!("link is down as well, restarting");
            self.exit = Some(ExitReason::Restart);
        }
        if let Err(e) = self.render(display) {
            error!("could not show error screen: {e}");
        }
        self.settings.error_pause()
    }

    pub fn render<D: MatrixDisplay>(&self, display: &mut D) -> std::io::Result<()> {
        display.show(&self.scene(), self.state.status())
    }

    pub fn scene(&self) -> Scene {
        let splash = || splash_scene(&self.settings.favorite_team, self.state.status());
        match self.state.active_screen() {
            ActiveScreen::Splash => splash(),
            ActiveScreen::Error => error_scene(self.state.error().map_or("", |e| e.message.as_str())),
            ActiveScreen::Page(kind) => match self.state.snapshot() {
                Some(snapshot) => self.screens.scene(kind, snapshot),
                None => splash(),
            },
        }
    }

    async fn iterate(&mut self) -> anyhow::Result<()> {
        let now = self.now();
        match self.state.phase() {
            Phase::Uninitialized => self.state.begin_init(),
            Phase::Initializing => self.connect().await,
            Phase::Failed => {
                if self.state.recovery_due(now) {
                    self.recover().await;
                }
            }
            Phase::Ready => {
                if self.state.housekeeping_due(now) {
                    self.housekeeping().await;
                }
                if self.state.refresh_due(now) {
                    // Pull on the next pass so the refresh status gets shown first.
                    self.state.begin_refresh();
                } else if self.state.rotation_due(now) {
                    self.state.rotate(now);
                }
            }
            Phase::Refreshing => self.refresh().await,
            Phase::Rotating => bail!("loop stuck mid-rotation"),
        }
        Ok(())
    }

    async fn connect(&mut self) {
        let attempts = self.settings.connect_attempts;
        if self.client.fetcher_mut().connect(attempts).await {
            let ip = self.client.fetcher().ip_address();
            info!("connected, address {}", ip.as_deref().unwrap_or("n/a"));
            self.state.init_succeeded();
        } else {
            let now = self.now();
            self.state.init_failed(format!("No network after {attempts} attempts"), now);
        }
    }

    async fn recover(&mut self) {
        info!("retrying connection");
        let connected = self
            .client
            .fetcher_mut()
            .connect(self.settings.connect_attempts)
            .await;
        let now = self.now();
        self.state.recovery_attempted(connected, now);
    }

    async fn refresh(&mut self) {
        let previous_quote = self.state.snapshot().and_then(|s| s.ticker.clone());
        match refresher::pull(&mut self.client, &self.settings).await {
            Ok(mut snapshot) => {
                snapshot.ticker =
                    refresher::refresh_quote(&self.client, &self.settings, previous_quote).await;
                let now = self.now();
                self.state.refresh_succeeded(snapshot, now);
            }
            Err(reason) => {
                warn!("refresh failed, keeping last good data: {reason}");
                let now = self.now();
                self.state.refresh_failed(reason, now);
            }
        }
    }

    async fn housekeeping(&mut self) {
        let now = self.now();
        self.state.housekeeping_done(now);
        info!(
            "heartbeat: {:?}, up {}s, {} cached responses",
            self.state.phase(),
            self.state.uptime(now).as_secs(),
            self.client.cache().len(),
        );

        if self.client.fetcher().is_connected() {
            return;
        }
        warn!("link is down, reconnecting");
        self.state.link_lost();
        let attempts = self.settings.connect_attempts;
        if self.client.fetcher_mut().connect(attempts).await {
            self.state.link_restored();
        } else {
            warn!("reconnect failed, will try again next heartbeat");
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::screens::ScreenKind;
    use crate::components::status::StatusLight;
    use crate::state::app_settings::TickerSettings;
    use crate::state::network::HttpLink;
    use crate::test_support::{
        FakeLink, ManualClock, RecordingDisplay, nl_east, opening_day_link, schedule, wire_game,
    };
    use serde_json::json;

    fn settings() -> Settings {
        Settings {
            date: Some("2024-04-01".into()),
            cache_ttl_secs: 1,
            ..Settings::default()
        }
    }

    struct Harness {
        app: App<FakeLink, ManualClock>,
        link: FakeLink,
        clock: ManualClock,
        display: RecordingDisplay,
    }

    impl Harness {
        fn new(settings: Settings, link: FakeLink) -> Self {
            let clock = ManualClock::new();
            let app = App::new(settings, link.clone(), clock.clone());
            Self { app, link, clock, display: RecordingDisplay::default() }
        }

        async fn step(&mut self) -> Duration {
            self.app.step(&mut self.display).await
        }

        async fn step_after(&mut self, secs: u64) -> Duration {
            self.clock.advance(secs);
            self.step().await
        }

        /// Start, connect, and complete the first pull.
        async fn boot(&mut self) {
            for _ in 0..4 {
                self.step().await;
            }
            assert_eq!(self.app.state.phase(), Phase::Ready);
        }
    }

    #[tokio::test]
    async fn boot_shows_splash_then_game() {
        let mut h = Harness::new(settings(), opening_day_link());

        h.step().await;
        assert_eq!(h.app.state.phase(), Phase::Initializing);
        assert_eq!(h.display.last().text()[2], "connecting");

        h.step().await;
        assert_eq!(h.app.state.phase(), Phase::Ready);
        assert_eq!(h.display.last().title, "MLB");

        h.step().await;
        assert_eq!(h.app.state.phase(), Phase::Refreshing);
        assert_eq!(h.display.last_status(), StatusLight::DataRefresh);

        h.step().await;
        assert_eq!(h.app.state.phase(), Phase::Ready);
        assert_eq!(h.display.last().title, "NYM @ ATL");
        assert_eq!(h.display.last().text()[1], "ATL  5");
        assert_eq!(h.display.last_status(), StatusLight::Online);
    }

    #[tokio::test]
    async fn pages_rotate_on_the_rotation_timer() {
        let mut h = Harness::new(settings(), opening_day_link());
        h.boot().await;

        h.step_after(14).await;
        assert_eq!(h.display.last().title, "NYM @ ATL");

        h.step_after(1).await;
        assert_eq!(h.display.last().title, "NL East");
        assert_eq!(h.display.last().text()[0], "ATL  89-51     -*");

        h.step_after(15).await;
        assert!(h.display.last().title.starts_with("ATL next"));

        h.step_after(15).await;
        assert_eq!(h.display.last().title, "NYM @ ATL");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_last_good_game() {
        let mut h = Harness::new(settings(), opening_day_link());
        h.boot().await;
        h.step_after(15).await;
        h.step_after(15).await;
        assert_eq!(h.app.state.active_screen(), ActiveScreen::Page(ScreenKind::Schedule));

        h.link.set_reachable(false);
        h.step_after(30).await;
        assert_eq!(h.app.state.phase(), Phase::Refreshing);
        h.step().await;

        assert_eq!(h.app.state.phase(), Phase::Ready);
        assert_eq!(h.display.last().title, "Error");
        assert!(h.display.last().text()[1].contains("Network error"));
        assert_eq!(h.display.last_status(), StatusLight::DataError);

        let fetches = h.link.fetches();
        h.step_after(1).await;
        assert_eq!(h.link.fetches(), fetches, "no busy retry after a failed pull");
        assert_eq!(h.display.last().title, "NYM @ ATL");
        assert_eq!(h.display.last().text()[1], "ATL  5");
    }

    #[tokio::test]
    async fn refresh_replaces_snapshot_wholesale() {
        let mut h = Harness::new(settings(), opening_day_link());
        h.boot().await;

        h.link.route("/schedule", schedule(vec![wire_game(745_001, "ATL", "NYM", 7, 3, "Final")]));
        h.step_after(60).await;
        h.step().await;

        let game = h.app.state.snapshot().and_then(|s| s.favorite_game.clone()).unwrap();
        assert_eq!(game.home_score, 7);
    }

    #[tokio::test]
    async fn live_favorite_game_is_enriched_from_the_feed() {
        let link = opening_day_link();
        let mut game = wire_game(745_001, "ATL", "NYM", 2, 1, "Live");
        game["linescore"] = json!({ "currentInning": 3, "inningState": "Bottom" });
        link.route("/schedule", schedule(vec![game]));
        link.route("/feed/live", json!({
            "gameData": { "status": { "abstractGameState": "Live" } },
            "liveData": {
                "linescore": { "currentInning": 3, "inningState": "Bottom", "outs": 2,
                               "teams": { "home": { "runs": 3 }, "away": { "runs": 1 } } },
                "plays": { "currentPlay": {
                    "playEvents": [ { "details": { "description": "Ronald Acuna Jr. singles" } } ],
                    "matchup": { "pitcher": { "fullName": "Kodai Senga" }, "batter": { "fullName": "Ozzie Albies" } }
                } }
            }
        }));
        let mut h = Harness::new(settings(), link);
        h.boot().await;

        let game = h.app.state.snapshot().and_then(|s| s.favorite_game.clone()).unwrap();
        assert_eq!(game.home_score, 3);
        assert_eq!(game.away_pitcher, "Kodai Senga");
        assert_eq!(game.batter, "Ozzie Albies");
        assert_eq!(game.live.outs, 2);
        assert_eq!(h.display.last().text()[2], "Bot 3rd ◇◇◇");
        assert_eq!(h.display.last().text()[4], "Ronald Acuna Jr. singles");
    }

    #[tokio::test]
    async fn missing_live_feed_does_not_fail_the_pull() {
        let link = opening_day_link();
        link.route("/schedule", schedule(vec![wire_game(745_001, "ATL", "NYM", 2, 1, "Live")]));
        let mut h = Harness::new(settings(), link);
        h.boot().await;

        assert!(h.app.state.error().is_none());
        assert_eq!(h.app.state.snapshot().unwrap().favorite_game.as_ref().unwrap().home_score, 2);
    }

    #[tokio::test]
    async fn no_network_at_boot_enters_recovery() {
        let link = FakeLink::default();
        let mut h = Harness::new(settings(), link);

        h.step().await;
        h.step().await;
        assert_eq!(h.app.state.phase(), Phase::Failed);
        assert_eq!(h.display.last().text()[1], "No network after 3 attempts");
        assert_eq!(h.display.last_status(), StatusLight::Error);

        h.link.set_reachable(true);
        h.step_after(29).await;
        assert_eq!(h.app.state.phase(), Phase::Failed);

        h.step_after(1).await;
        assert_eq!(h.app.state.phase(), Phase::Ready);
        assert_eq!(h.app.exit_reason(), None, "recovery never restarts on its own");
    }

    #[tokio::test]
    async fn panicking_iteration_is_caught_and_shown() {
        let mut h = Harness::new(settings(), opening_day_link());
        h.boot().await;

        h.link.panic_on_fetch(true);
        h.step_after(60).await;
        let pause = h.step().await;

        assert_eq!(pause, Duration::from_secs(5));
        assert_eq!(h.app.state.phase(), Phase::Ready);
        assert_eq!(h.display.last().title, "Error");
        assert!(h.display.last().text()[1].contains("fetch exploded"));
        assert_eq!(h.app.exit_reason(), None, "link is still up");
    }

    #[tokio::test]
    async fn iteration_failure_with_link_down_requests_restart() {
        let mut h = Harness::new(settings(), opening_day_link());
        h.boot().await;

        h.link.set_reachable(false);
        h.step_after(60).await;
        h.step().await;
        assert!(!h.link.is_connected());

        h.display.fail = true;
        let pause = h.step_after(1).await;

        assert_eq!(pause, Duration::from_secs(5));
        assert_eq!(h.app.exit_reason(), Some(ExitReason::Restart));
    }

    #[tokio::test]
    async fn housekeeping_reconnects_a_dropped_link() {
        let mut h = Harness::new(settings(), opening_day_link());
        h.boot().await;

        h.link.set_reachable(false);
        h.step_after(60).await;
        h.step().await;
        assert!(!h.link.is_connected());

        h.link.set_reachable(true);
        h.step_after(60).await;
        assert!(h.link.is_connected());
    }

    #[tokio::test]
    async fn ticker_page_keeps_previous_quote_on_failure() {
        let link = opening_day_link();
        link.route("price.json", json!({ "bpi": { "USD": { "rate_float": 64210.7 } } }));
        let ticker = TickerSettings {
            label: "BTC".into(),
            url: "https://example.com/price.json".into(),
            json_path: vec!["bpi".into(), "USD".into(), "rate_float".into()],
        };
        let mut h = Harness::new(Settings { ticker: Some(ticker), ..settings() }, link);
        h.boot().await;
        assert_eq!(h.app.state.snapshot().unwrap().ticker.as_ref().unwrap().text(), "$64210");

        h.link.route("price.json", json!({ "unexpected": true }));
        h.step_after(60).await;
        h.step().await;

        assert!(h.app.state.error().is_none(), "ticker trouble is not a failed pull");
        let quote = h.app.state.snapshot().unwrap().ticker.clone().unwrap();
        assert_eq!(quote.price, 64210.7);

        for _ in 0..3 {
            h.step_after(15).await;
        }
        assert_eq!(h.display.last().text(), vec!["BTC", "$64210"]);
    }

    #[tokio::test]
    async fn unreachable_ticker_host_leaves_the_stats_link_up() {
        let mut server = mockito::Server::new_async().await;
        let games = schedule(vec![wire_game(745_001, "ATL", "NYM", 5, 3, "Final")]);
        server
            .mock("GET", mockito::Matcher::Regex("^/api/v1/schedule".into()))
            .with_body(games.to_string())
            .expect_at_least(1)
            .create_async()
            .await;
        server
            .mock("GET", mockito::Matcher::Regex("^/api/v1/standings".into()))
            .with_body(nl_east().to_string())
            .create_async()
            .await;

        let base_url = format!("{}/api/v1", server.url());
        let ticker = TickerSettings {
            label: "BTC".into(),
            url: "http://127.0.0.1:1/price.json".into(),
            json_path: vec!["price".into()],
        };
        let settings = Settings { base_url: base_url.clone(), ticker: Some(ticker), ..settings() };
        let clock = ManualClock::new();
        let link = HttpLink::new(base_url, Duration::from_secs(2));
        let mut app = App::new(settings, link, clock.clone());
        let mut display = RecordingDisplay::default();

        for _ in 0..4 {
            app.step(&mut display).await;
        }
        assert_eq!(app.state.phase(), Phase::Ready);
        assert!(app.state.snapshot().unwrap().ticker.is_none());
        assert!(app.client.fetcher().is_connected());
        assert_eq!(display.last_status(), StatusLight::Online);

        clock.advance(60);
        app.step(&mut display).await;
        app.step(&mut display).await;

        assert!(app.client.fetcher().is_connected());
        assert!(app.state.error().is_none());
        assert_eq!(display.last_status(), StatusLight::Online);
        assert_eq!(app.exit_reason(), None);
    }

    #[tokio::test]
    async fn cached_responses_are_reused_within_ttl() {
        let link = opening_day_link();
        let settings = Settings { cache_ttl_secs: 300, ..settings() };
        let mut h = Harness::new(settings, link);
        h.boot().await;
        let fetches = h.link.fetches();

        h.step_after(60).await;
        h.step().await;

        assert_eq!(h.link.fetches(), fetches);
    }

    #[test]
    fn panic_payloads_become_messages() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
