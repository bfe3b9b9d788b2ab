use crate::components::scene::Scene;
use crate::components::status::StatusLight;
use crate::draw::MatrixDisplay;
use crate::state::network::NetworkLink;
use chrono::NaiveDate;
use mlb_api::client::{ApiError, ApiResult};
use mlb_api::clock::Clock;
use mlb_api::fetch::Fetch;
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub use mlb_api::fixtures::{schedule, wire_game};

#[derive(Default)]
struct LinkState {
    routes: Vec<(String, String)>,
    reachable: bool,
    up: bool,
    panic_on_fetch: bool,
    fetches: usize,
}

/// Scriptable link. Clones share state so a test can flip it while the app owns a copy.
#[derive(Clone, Default)]
pub struct FakeLink(Rc<RefCell<LinkState>>);

impl FakeLink {
    pub fn reachable() -> Self {
        let link = Self::default();
        link.set_reachable(true);
        link
    }

    /// Answer any URL containing `key`. Later routes shadow earlier ones.
    pub fn route(&self, key: &str, body: Value) {
        self.0.borrow_mut().routes.insert(0, (key.to_owned(), body.to_string()));
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.0.borrow_mut().reachable = reachable;
    }

    pub fn panic_on_fetch(&self, on: bool) {
        self.0.borrow_mut().panic_on_fetch = on;
    }

    pub fn fetches(&self) -> usize {
        self.0.borrow().fetches
    }
}

impl Fetch for FakeLink {
    async fn fetch(&self, url: &str) -> ApiResult<String> {
        if self.0.borrow().panic_on_fetch {
            panic!("fetch exploded");
        }
        let mut state = self.0.borrow_mut();
        state.fetches += 1;
        if !state.reachable {
            state.up = false;
            return Err(ApiError::Network(url.to_owned(), "unreachable".into()));
        }
        match state.routes.iter().find(|(key, _)| url.contains(key.as_str())) {
            Some((_, body)) => Ok(body.clone()),
            None => Err(ApiError::Api(404, url.to_owned())),
        }
    }
}

impl NetworkLink for FakeLink {
    async fn connect(&mut self, _max_attempts: u32) -> bool {
        let mut state = self.0.borrow_mut();
        state.up = state.reachable;
        state.up
    }

    fn is_connected(&self) -> bool {
        self.0.borrow().up
    }

    fn ip_address(&self) -> Option<String> {
        self.is_connected().then(|| "10.0.0.2".to_owned())
    }
}

#[derive(Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
    today: NaiveDate,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
            today: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        }
    }

    pub fn advance(&self, secs: u64) {
        self.now.set(self.now.get() + Duration::from_secs(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub shown: Vec<(Scene, StatusLight)>,
    pub fail: bool,
}

impl RecordingDisplay {
    pub fn last(&self) -> &Scene {
        &self.shown.last().expect("nothing shown yet").0
    }

    pub fn last_status(&self) -> StatusLight {
        self.shown.last().expect("nothing shown yet").1
    }
}

impl MatrixDisplay for RecordingDisplay {
    fn show(&mut self, scene: &Scene, status: StatusLight) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::other("panel unplugged"));
        }
        self.shown.push((scene.clone(), status));
        Ok(())
    }
}

pub fn nl_east() -> Value {
    let row = |abbr: &str, wins: u32, losses: u32| {
        json!({ "team": { "abbreviation": abbr }, "wins": wins, "losses": losses, "gamesBack": "-" })
    };
    json!({ "records": [ { "division": { "nameShort": "NL East" }, "teamRecords": [
        row("PHI", 80, 60), row("ATL", 89, 51), row("NYM", 70, 70)
    ] } ] })
}

/// A link serving one final ATL 5, NYM 3 game plus standings.
pub fn opening_day_link() -> FakeLink {
    let link = FakeLink::reachable();
    link.route("/schedule", schedule(vec![wire_game(745_001, "ATL", "NYM", 5, 3, "Final")]));
    link.route("/standings", nl_east());
    link
}
