use crate::components::colors::{Rgb, game_state_color, team_text_color};
use crate::components::scene::{Label, Scene};
use crate::components::status::StatusLight;
use crate::state::app_state::Snapshot;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use mlb_api::{GameRecord, GameStatus, LiveState};
use std::fmt::Display;

const MAX_ERROR_CHARS: usize = 100;
const MAX_ERROR_LINES: usize = 2;

/// Pages in the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Game,
    Standings,
    Schedule,
    Ticker,
}

/// A page that turns the current snapshot into a scene. Never mutates what it is given.
pub trait Screen {
    fn scene(&self, snapshot: &Snapshot) -> Scene;
}

pub struct GameScreen {
    pub team: String,
}

pub struct StandingsScreen {
    pub team: String,
}

pub struct ScheduleScreen {
    pub team: String,
}

pub struct TickerScreen;

/// The fixed, ordered set of rotation pages.
pub struct ScreenSet {
    game: GameScreen,
    standings: StandingsScreen,
    schedule: ScheduleScreen,
    with_ticker: bool,
}

impl ScreenSet {
    pub fn new(team: &str, with_ticker: bool) -> Self {
        Self {
            game: GameScreen { team: team.to_owned() },
            standings: StandingsScreen { team: team.to_owned() },
            schedule: ScheduleScreen { team: team.to_owned() },
            with_ticker,
        }
    }

    pub fn rotation(&self) -> Vec<ScreenKind> {
        let mut kinds = vec![ScreenKind::Game, ScreenKind::Standings, ScreenKind::Schedule];
        if self.with_ticker {
            kinds.push(ScreenKind::Ticker);
        }
        kinds
    }

    pub fn scene(&self, kind: ScreenKind, snapshot: &Snapshot) -> Scene {
        match kind {
            ScreenKind::Game => self.game.scene(snapshot),
            ScreenKind::Standings => self.standings.scene(snapshot),
            ScreenKind::Schedule => self.schedule.scene(snapshot),
            ScreenKind::Ticker => TickerScreen.scene(snapshot),
        }
    }
}

pub fn splash_scene(team: &str, status: StatusLight) -> Scene {
    Scene::new("MLB")
        .row(vec![Label::new("MLB", team_text_color("MLB")), Label::white(" Scoreboard")])
        .line(Label::new(team, team_text_color(team)))
        .line(Label::new(status.label(), status.color()))
}

pub fn error_scene(message: &str) -> Scene {
    error_text(message)
        .into_iter()
        .fold(Scene::new("Error").line(Label::new("ERROR", Rgb::RED)), |scene, line| {
            scene.line(Label::white(line))
        })
}

/// At most two lines, at most 100 characters in total (97 plus an ellipsis).
pub fn error_text(message: &str) -> Vec<String> {
    let kept = message
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(MAX_ERROR_LINES)
        .collect::<Vec<_>>()
        .join("\n");
    let kept = if kept.chars().count() > MAX_ERROR_CHARS {
        let cut: String = kept.chars().take(MAX_ERROR_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        kept
    };
    kept.lines().map(str::to_owned).collect()
}

impl Screen for GameScreen {
    fn scene(&self, snapshot: &Snapshot) -> Scene {
        // Any game of the day beats an empty page.
        let Some(game) = snapshot.favorite_game.as_ref().or(snapshot.games.first()) else {
            return Scene::new(&self.team)
                .line(Label::new(&self.team, team_text_color(&self.team)))
                .line(Label::white("No game today"))
                .line(Label::new(short_date(&snapshot.date), Rgb::GREY));
        };

        let state_color = game_state_color(&game.detailed_status);
        let title = format!("{} @ {}", game.away_team, game.home_team);
        let show_score = game.status != GameStatus::Scheduled;
        let team_row = |code: &str, score: u32| {
            let mut row = vec![Label::new(format!("{code:<4}"), team_text_color(code))];
            if show_score {
                row.push(Label::white(format!("{score:>2}")));
            }
            row
        };
        let scene = Scene::new(title)
            .row(team_row(&game.away_team, game.away_score))
            .row(team_row(&game.home_team, game.home_score));

        match game.status {
            GameStatus::InProgress => live_rows(scene, game, state_color),
            GameStatus::Final => {
                let scene = scene.line(Label::new(&game.detailed_status, state_color));
                if game.series_summary.is_empty() {
                    scene
                } else {
                    scene.line(Label::new(&game.series_summary, Rgb::GREY))
                }
            }
            GameStatus::Scheduled => {
                let when = if game.detailed_status.eq_ignore_ascii_case("scheduled")
                    || game.detailed_status.is_empty()
                {
                    local_time(&game.start_time)
                } else {
                    game.detailed_status.clone()
                };
                let scene = scene.line(Label::new(when, state_color));
                match pitching_matchup(&game.away_pitcher, &game.home_pitcher) {
                    Some(matchup) => scene.line(Label::new(matchup, Rgb::GREY)),
                    None => scene,
                }
            }
        }
    }
}

fn live_rows(scene: Scene, game: &GameRecord, state_color: Rgb) -> Scene {
    let live = &game.live;
    let scene = scene
        .row(vec![
            Label::new(inning_text(live), state_color),
            Label::white(" "),
            Label::new(bases_text(live), Rgb::YELLOW),
        ])
        .line(Label::white(count_text(live)));
    if !game.last_play.is_empty() {
        scene.line(Label::new(&game.last_play, Rgb::GREY))
    } else if !game.batter.is_empty() {
        scene.line(Label::new(format!("AB: {}", game.batter), Rgb::GREY))
    } else {
        scene
    }
}

impl Screen for StandingsScreen {
    fn scene(&self, snapshot: &Snapshot) -> Scene {
        let Some((division, rows)) = snapshot.standings.division_of(&self.team) else {
            return Scene::new("Standings").line(Label::white("No standings"));
        };
        rows.iter().fold(Scene::new(division), |scene, row| {
            let marker = if row.team_abbr.eq_ignore_ascii_case(&self.team) { "*" } else { " " };
            scene.row(vec![
                Label::new(format!("{:<4}", row.team_abbr), team_text_color(&row.team_abbr)),
                Label::white(format!("{:>3}-{:<3} {:>4}{marker}", row.wins, row.losses, row.games_back)),
            ])
        })
    }
}

impl Screen for ScheduleScreen {
    fn scene(&self, snapshot: &Snapshot) -> Scene {
        let title = format!("{} next {}", self.team, snapshot.schedule.len());
        if snapshot.schedule.is_empty() {
            return Scene::new(title).line(Label::white("No upcoming games"));
        }
        snapshot.schedule.iter().fold(Scene::new(title), |scene, entry| {
            let (opponent, at_home) = entry.opponent_of(&self.team);
            scene.row(vec![
                Label::new(short_date(&entry.date), Rgb::GREY),
                Label::white(if at_home { " vs " } else { " @ " }),
                Label::new(format!("{opponent:<4}"), team_text_color(opponent)),
                Label::new(local_time(&entry.time), game_state_color(&entry.status)),
            ])
        })
    }
}

impl Screen for TickerScreen {
    fn scene(&self, snapshot: &Snapshot) -> Scene {
        match &snapshot.ticker {
            Some(quote) => Scene::new(&quote.label)
                .line(Label::white(&quote.label))
                .line(Label::new(quote.text(), Rgb::YELLOW)),
            None => Scene::new("Ticker").line(Label::white("No quote")),
        }
    }
}

pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

pub fn inning_text(live: &LiveState) -> String {
    let half = if live.is_top { "Top" } else { "Bot" };
    format!("{half} {}", ordinal(live.inning.max(1)))
}

pub fn count_text(live: &LiveState) -> String {
    format!("B:{} S:{} O:{}", live.balls, live.strikes, live.outs)
}

/// Third, second, first, left to right as seen from home plate.
pub fn bases_text(live: &LiveState) -> String {
    let base = |on: bool| if on { '◆' } else { '◇' };
    [base(live.on_third), base(live.on_second), base(live.on_first)]
        .iter()
        .collect()
}

fn pitching_matchup(away: &str, home: &str) -> Option<String> {
    let last = |name: &str| name.rsplit(' ').next().unwrap_or(name).to_owned();
    match (away.is_empty(), home.is_empty()) {
        (true, true) => None,
        _ => Some(format!(
            "{} v {}",
            if away.is_empty() { "TBD".into() } else { last(away) },
            if home.is_empty() { "TBD".into() } else { last(home) },
        )),
    }
}

/// `YYYY-MM-DD` as `MM/DD`; passed through unchanged if it doesn't parse.
pub fn short_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%m/%d").to_string())
        .unwrap_or_else(|_| date.to_owned())
}

/// ISO-8601 start time as local `HH:MM`, or "TBD".
pub fn local_time(iso: &str) -> String {
    clock_time(iso, &Local)
}

fn clock_time<Tz>(iso: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    DateTime::parse_from_rfc3339(iso)
        .map(|t| t.with_timezone(tz).format("%H:%M").to_string())
        .unwrap_or_else(|_| "TBD".to_owned())
}
