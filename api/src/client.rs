use crate::cache::ResponseCache;
use crate::clock::{Clock, SystemClock};
use crate::fetch::Fetch;
use crate::statsapi::{
    LiveFeedResponse, ScheduleResponse, StandingsResponse, WireGame, WireLinescore, WirePerson,
    WireSplitRecord, WireTeam, WireTeamRecord,
};
use crate::{
    GameRecord, GameStatus, LiveState, ScheduleEntry, StandingsRow, StandingsTable, teams,
};
use chrono::{Datelike, Duration as Days};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const MLB_STATS_API: &str = "https://statsapi.mlb.com/api/v1";
pub const DEFAULT_SCHEDULE_LIMIT: usize = 5;

const SCHEDULE: &str = "/schedule";
const STANDINGS: &str = "/standings";
const GAME_HYDRATE: &str =
    "team,linescore,broadcasts(all),game(content(summary)),probablePitcher,flags,seriesStatus";
const TEAM_SCHEDULE_HYDRATE: &str = "team,probablePitcher";
const STANDINGS_HYDRATE: &str = "team,division,sport,league";
const AL_AND_NL: &str = "103,104";
const SCHEDULE_WINDOW_DAYS: i64 = 30;

#[derive(Debug)]
pub enum ApiError {
    Network(String, String),
    Api(u16, String),
    Parsing(serde_json::Error, String),
    NotFound(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(url, e) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(status, url) => write!(f, "HTTP {status} for {url}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::NotFound(msg) => write!(f, "Not found: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// MLB Stats API client: endpoint calls, response caching, and mapping into
/// the domain model.
///
/// Public operations never fail. Transport, status and parse errors are
/// logged and turned into empty/absent results; the message of the latest one
/// is kept in [`StatsClient::last_error`].
#[derive(Debug)]
pub struct StatsClient<F, C = SystemClock> {
    fetcher: F,
    clock: C,
    base_url: String,
    cache: ResponseCache,
    last_error: Option<String>,
}

impl<F: Fetch> StatsClient<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_clock(fetcher, SystemClock)
    }
}

impl<F: Fetch, C: Clock> StatsClient<F, C> {
    pub fn with_clock(fetcher: F, clock: C) -> Self {
        let mut client = Self {
            fetcher,
            clock,
            base_url: MLB_STATS_API.to_owned(),
            cache: ResponseCache::default(),
            last_error: None,
        };
        client.clear_cache();
        client
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.cache = ResponseCache::new(ttl);
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn fetcher_mut(&mut self) -> &mut F {
        &mut self.fetcher
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        debug!("cache cleared");
    }

    /// Message of the most recent failed request, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn take_last_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    /// All games scheduled on `date` (`YYYY-MM-DD`).
    pub async fn get_games(&mut self, date: &str) -> Vec<GameRecord> {
        let params = [
            ("sportId", "1".to_owned()),
            ("date", date.to_owned()),
            ("hydrate", GAME_HYDRATE.to_owned()),
        ];
        match self.schedule(&params).await {
            Some(raw) => parse_schedule_games(raw).map(map_game).collect(),
            None => {
                warn!("no games data available for {date}");
                Vec::new()
            }
        }
    }

    /// The game `team_code` plays on `date`; the first one on doubleheader days.
    pub async fn get_team_game(&mut self, team_code: &str, date: &str) -> Option<GameRecord> {
        let Some(team_id) = teams::team_id(team_code) else {
            warn!("unknown team abbreviation: {team_code}");
            return None;
        };
        let params = [
            ("sportId", "1".to_owned()),
            ("date", date.to_owned()),
            ("teamId", team_id.to_string()),
            ("hydrate", GAME_HYDRATE.to_owned()),
        ];
        let game = self
            .schedule(&params)
            .await
            .and_then(|raw| parse_schedule_games(raw).map(map_game).next());
        if game.is_none() {
            info!("no game for {team_code} on {date}");
        }
        game
    }

    /// Regular-season standings for the current season, both leagues.
    pub async fn get_standings(&mut self) -> Option<StandingsTable> {
        let season = self.clock.today().year();
        let params = [
            ("leagueId", AL_AND_NL.to_owned()),
            ("season", season.to_string()),
            ("standingsTypes", "regularSeason".to_owned()),
            ("hydrate", STANDINGS_HYDRATE.to_owned()),
        ];
        let value = match self.request(STANDINGS, &params).await {
            Ok(value) => value,
            Err(e) => {
                self.note_failure(e);
                return None;
            }
        };
        if value.get("records").is_none() {
            self.note_failure(ApiError::Other("standings response has no records".into()));
            return None;
        }
        match serde_json::from_value::<StandingsResponse>(value) {
            Ok(raw) => Some(map_standings(raw)),
            Err(e) => {
                self.note_failure(ApiError::Parsing(e, STANDINGS.to_owned()));
                None
            }
        }
    }

    /// Up to `limit` upcoming regular-season games for `team_code`, starting today.
    pub async fn get_team_schedule(
        &mut self,
        team_code: &str,
        limit: usize,
    ) -> Option<Vec<ScheduleEntry>> {
        let Some(team_id) = teams::team_id(team_code) else {
            warn!("unknown team abbreviation: {team_code}");
            return None;
        };
        let today = self.clock.today();
        let end = today + Days::days(SCHEDULE_WINDOW_DAYS);
        let params = [
            ("sportId", "1".to_owned()),
            ("teamId", team_id.to_string()),
            ("startDate", today.format("%Y-%m-%d").to_string()),
            ("endDate", end.format("%Y-%m-%d").to_string()),
            ("gameType", "R".to_owned()),
            ("hydrate", TEAM_SCHEDULE_HYDRATE.to_owned()),
        ];
        let Some(raw) = self.schedule(&params).await else {
            warn!("no schedule data available for {team_code}");
            return None;
        };
        Some(
            parse_schedule_games(raw)
                .take(limit)
                .map(map_schedule_entry)
                .collect(),
        )
    }

    /// Live feed for one game: everything the schedule carries, plus the
    /// current batter, the pitcher on the mound and the last play.
    pub async fn get_game_detail(&mut self, game_id: u64) -> Option<GameRecord> {
        let path = format!("/game/{game_id}/feed/live");
        let value = match self.request(&path, &[]).await {
            Ok(value) => value,
            Err(e) => {
                self.note_failure(e);
                return None;
            }
        };
        let raw = match serde_json::from_value::<LiveFeedResponse>(value) {
            Ok(raw) => raw,
            Err(e) => {
                self.note_failure(ApiError::Parsing(e, path));
                return None;
            }
        };
        if raw.live_data.is_none() {
            warn!("no detailed game data available for game {game_id}");
            return None;
        }
        Some(map_live_feed(game_id, raw))
    }

    /// Today's date on the local clock, `YYYY-MM-DD`.
    pub fn get_current_date_string(&self) -> String {
        self.clock.today().format("%Y-%m-%d").to_string()
    }

    /// Fetch a schedule response and check its top-level shape.
    async fn schedule(&mut self, params: &[(&str, String)]) -> Option<ScheduleResponse> {
        let value = match self.request(SCHEDULE, params).await {
            Ok(value) => value,
            Err(e) => {
                self.note_failure(e);
                return None;
            }
        };
        if value.get("dates").is_none() {
            self.note_failure(ApiError::Other("schedule response has no dates".into()));
            return None;
        }
        match serde_json::from_value::<ScheduleResponse>(value) {
            Ok(raw) => Some(raw),
            Err(e) => {
                self.note_failure(ApiError::Parsing(e, SCHEDULE.to_owned()));
                None
            }
        }
    }

    async fn request(&mut self, path: &str, params: &[(&str, String)]) -> ApiResult<Value> {
        let url = compose_url(&self.base_url, path, params);

        if let Some(cached) = self.cache.get(&url, self.clock.now()) {
            debug!("using cached response for {url}");
            return Ok(cached.clone());
        }

        info!("requesting {url}");
        let body = self.fetcher.fetch(&url).await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| ApiError::Parsing(e, url.clone()))?;

        self.cache.put(url, value.clone(), self.clock.now());
        Ok(value)
    }

    fn note_failure(&mut self, err: ApiError) {
        error!("request failed: {err}");
        self.last_error = Some(err.to_string());
    }
}

fn compose_url(base: &str, path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return format!("{base}{path}");
    }
    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}{path}?{query}")
}

// ---------------------------------------------------------------------------
// Mapping: Stats API wire types → clean domain types
// ---------------------------------------------------------------------------

/// Every well-formed game across all dates; malformed entries are logged and skipped.
fn parse_schedule_games(raw: ScheduleResponse) -> impl Iterator<Item = WireGame> {
    raw.dates
        .into_iter()
        .flat_map(|d| d.games)
        .filter_map(|value| match serde_json::from_value::<WireGame>(value) {
            Ok(game) => Some(game),
            Err(e) => {
                warn!("skipping malformed game entry: {e}");
                None
            }
        })
}

fn parse_status(abstract_state: &str, detailed_state: &str) -> GameStatus {
    match abstract_state {
        "Live" => return GameStatus::InProgress,
        "Final" => return GameStatus::Final,
        "Preview" => return GameStatus::Scheduled,
        _ => {}
    }
    let detailed = detailed_state.to_lowercase();
    if detailed.contains("progress") || detailed.contains("live") {
        GameStatus::InProgress
    } else if detailed.contains("final") || detailed.contains("game over") || detailed.contains("completed") {
        GameStatus::Final
    } else {
        GameStatus::Scheduled
    }
}

/// Abbreviation as sent, or looked up by id when the API left it out.
fn team_abbr(team: &WireTeam) -> String {
    if !team.abbreviation.is_empty() {
        return team.abbreviation.clone();
    }
    teams::team_code(team.id).map(str::to_owned).unwrap_or_default()
}

fn non_zero(id: u32) -> Option<u32> {
    (id != 0).then_some(id)
}

fn map_live_state(linescore: &WireLinescore) -> LiveState {
    LiveState {
        inning: linescore.current_inning,
        is_top: linescore.inning_state.eq_ignore_ascii_case("top"),
        outs: linescore.outs.min(3),
        balls: linescore.balls.min(3),
        strikes: linescore.strikes.min(2),
        on_first: linescore.offense.first.is_some(),
        on_second: linescore.offense.second.is_some(),
        on_third: linescore.offense.third.is_some(),
    }
}

fn map_game(g: WireGame) -> GameRecord {
    let status = parse_status(&g.status.abstract_game_state, &g.status.detailed_state);
    let live = if status == GameStatus::InProgress {
        map_live_state(&g.linescore)
    } else {
        LiveState::default()
    };
    let pitcher = |p: Option<WirePerson>| p.map(|p| p.full_name).unwrap_or_default();

    GameRecord {
        game_id: g.game_pk,
        date: g.official_date,
        home_team: team_abbr(&g.teams.home.team),
        away_team: team_abbr(&g.teams.away.team),
        home_team_id: non_zero(g.teams.home.team.id),
        away_team_id: non_zero(g.teams.away.team.id),
        status,
        detailed_status: g.status.detailed_state,
        home_score: g.teams.home.score,
        away_score: g.teams.away.score,
        live,
        start_time: g.game_date,
        series_summary: g.series_status.description,
        home_pitcher: pitcher(g.teams.home.probable_pitcher),
        away_pitcher: pitcher(g.teams.away.probable_pitcher),
        last_play: String::new(),
        batter: String::new(),
    }
}

fn map_schedule_entry(g: WireGame) -> ScheduleEntry {
    let pitcher = |p: Option<WirePerson>| {
        p.map(|p| p.full_name).filter(|name| !name.is_empty())
    };
    ScheduleEntry {
        date: g.official_date,
        home_team: team_abbr(&g.teams.home.team),
        away_team: team_abbr(&g.teams.away.team),
        status: g.status.detailed_state,
        time: g.game_date,
        home_pitcher: pitcher(g.teams.home.probable_pitcher),
        away_pitcher: pitcher(g.teams.away.probable_pitcher),
    }
}

fn map_standings(raw: StandingsResponse) -> StandingsTable {
    let mut table = StandingsTable::default();
    for record in raw.records {
        let division = &record.division;
        let name = if !division.name_short.is_empty() {
            division.name_short.clone()
        } else if !division.name.is_empty() {
            division.name.clone()
        } else {
            "Unknown".to_owned()
        };

        let rows = record
            .team_records
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<WireTeamRecord>(value) {
                Ok(tr) => Some(map_standings_row(tr)),
                Err(e) => {
                    warn!("skipping malformed team record in {name}: {e}");
                    None
                }
            })
            .collect::<Vec<_>>();
        table.divisions.entry(name).or_default().extend(rows);
    }

    // Stable: equal win totals keep their upstream order.
    for rows in table.divisions.values_mut() {
        rows.sort_by(|a, b| b.wins.cmp(&a.wins));
    }
    table
}

fn map_standings_row(tr: WireTeamRecord) -> StandingsRow {
    StandingsRow {
        team_abbr: team_abbr(&tr.team),
        wins: tr.wins,
        losses: tr.losses,
        win_pct: tr.winning_percentage,
        games_back: tr.games_back,
        streak: tr.streak.streak_code,
        last_ten: last_ten(&tr.records.split_records),
    }
}

fn last_ten(splits: &[WireSplitRecord]) -> String {
    splits
        .iter()
        .find(|s| s.record_type == "lastTen")
        .or_else(|| splits.get(3))
        .map(|s| format!("{}-{}", s.wins, s.losses))
        .unwrap_or_else(|| "0-0".to_owned())
}

fn map_live_feed(game_id: u64, raw: LiveFeedResponse) -> GameRecord {
    let game_data = raw.game_data;
    let live_data = raw.live_data.unwrap_or_default();
    let linescore = &live_data.linescore;

    let status = parse_status(
        &game_data.status.abstract_game_state,
        &game_data.status.detailed_state,
    );
    let is_top = linescore.inning_state.eq_ignore_ascii_case("top");
    let live = if status == GameStatus::InProgress {
        map_live_state(linescore)
    } else {
        LiveState::default()
    };

    let probable = |p: Option<WirePerson>| p.map(|p| p.full_name).unwrap_or_default();
    let mut detail = GameRecord {
        game_id,
        date: game_data.datetime.official_date,
        home_team: team_abbr(&game_data.teams.home),
        away_team: team_abbr(&game_data.teams.away),
        home_team_id: non_zero(game_data.teams.home.id),
        away_team_id: non_zero(game_data.teams.away.id),
        status,
        detailed_status: game_data.status.detailed_state,
        home_score: linescore.teams.home.runs,
        away_score: linescore.teams.away.runs,
        live,
        start_time: game_data.datetime.date_time,
        series_summary: String::new(),
        home_pitcher: probable(game_data.probable_pitchers.home),
        away_pitcher: probable(game_data.probable_pitchers.away),
        last_play: String::new(),
        batter: String::new(),
    };

    if let Some(play) = live_data.plays.current_play {
        if let Some(event) = play.play_events.last() {
            detail.last_play = event.details.description.clone();
        }
        // The home side pitches while the visitors bat in the top half.
        if let Some(pitcher) = play.matchup.pitcher {
            if is_top {
                detail.home_pitcher = pitcher.full_name;
            } else {
                detail.away_pitcher = pitcher.full_name;
            }
        }
        if let Some(batter) = play.matchup.batter {
            detail.batter = batter.full_name;
        }
    }

    detail
}
