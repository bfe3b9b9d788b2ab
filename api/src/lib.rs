pub mod cache;
pub mod client;
pub mod clock;
pub mod fetch;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
pub mod statsapi;
pub mod teams;

use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Domain types, independent of the Stats API wire format
// ---------------------------------------------------------------------------

/// Coarse game state, derived from the API's `abstractGameState`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameStatus {
    #[default]
    Scheduled,
    InProgress,
    Final,
}

/// In-game situation. Only meaningful while the game is in progress; every
/// other status carries the default (all zero / false).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveState {
    pub inning: u32,
    pub is_top: bool,
    pub outs: u8,    // 0..=3
    pub balls: u8,   // 0..=3
    pub strikes: u8, // 0..=2
    pub on_first: bool,
    pub on_second: bool,
    pub on_third: bool,
}

/// One game, rebuilt from scratch on every successful parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameRecord {
    pub game_id: u64,
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub home_team_id: Option<u32>,
    pub away_team_id: Option<u32>,
    pub status: GameStatus,
    pub detailed_status: String,
    pub home_score: u32,
    pub away_score: u32,
    pub live: LiveState,
    /// ISO-8601 first pitch, as sent by the API.
    pub start_time: String,
    pub series_summary: String,
    pub home_pitcher: String,
    pub away_pitcher: String,
    /// Populated from the live feed only.
    pub last_play: String,
    pub batter: String,
}

impl GameRecord {
    pub fn is_live(&self) -> bool {
        self.status == GameStatus::InProgress
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingsRow {
    pub team_abbr: String,
    pub wins: u32,
    pub losses: u32,
    pub win_pct: String,
    pub games_back: String,
    pub streak: String,
    pub last_ten: String,
}

/// Division name → rows ordered by wins, descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingsTable {
    pub divisions: BTreeMap<String, Vec<StandingsRow>>,
}

impl StandingsTable {
    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }

    pub fn division(&self, name: &str) -> Option<&[StandingsRow]> {
        self.divisions.get(name).map(Vec::as_slice)
    }

    /// Find the division a team plays in.
    pub fn division_of(&self, team_abbr: &str) -> Option<(&str, &[StandingsRow])> {
        self.divisions.iter().find_map(|(name, rows)| {
            rows.iter()
                .any(|r| r.team_abbr.eq_ignore_ascii_case(team_abbr))
                .then_some((name.as_str(), rows.as_slice()))
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub status: String,
    /// ISO-8601 first pitch.
    pub time: String,
    pub home_pitcher: Option<String>,
    pub away_pitcher: Option<String>,
}

impl ScheduleEntry {
    /// The other team, seen from `team_code`'s side, plus whether `team_code` is at home.
    pub fn opponent_of(&self, team_code: &str) -> (&str, bool) {
        if self.home_team.eq_ignore_ascii_case(team_code) {
            (&self.away_team, true)
        } else {
            (&self.home_team, false)
        }
    }
}
