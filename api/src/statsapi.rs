/// MLB Stats API wire types. Serde shapes for deserializing responses.
/// These map to the clean domain types via the mapping functions in client.rs.
///
/// Every field defaults when missing; a field that is present with the wrong
/// type fails the record it belongs to.
use serde::Deserialize;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Schedule  (/schedule)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ScheduleResponse {
    pub dates: Vec<ScheduleDate>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ScheduleDate {
    pub date: String,
    /// Kept raw so one bad game can be skipped without losing the rest.
    pub games: Vec<Value>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireGame {
    pub game_pk: u64,
    pub official_date: String,
    pub game_date: String, // ISO 8601
    pub status: WireStatus,
    pub teams: WireMatchup,
    pub linescore: WireLinescore,
    pub series_status: WireSeriesStatus,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireStatus {
    pub abstract_game_state: String, // "Preview" | "Live" | "Final"
    pub detailed_state: String,      // "Scheduled", "In Progress", "Game Over", ...
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WireMatchup {
    pub home: WireSide,
    pub away: WireSide,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireSide {
    pub team: WireTeam,
    pub score: u32,
    pub probable_pitcher: Option<WirePerson>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WireTeam {
    pub id: u32,
    pub abbreviation: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WirePerson {
    pub full_name: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireLinescore {
    pub current_inning: u32,
    pub inning_state: String, // "Top" | "Middle" | "Bottom" | "End"
    pub outs: u8,
    pub balls: u8,
    pub strikes: u8,
    pub offense: WireOffense,
    pub teams: WireLinescoreTeams,
}

/// Runners are reported by presence of the base key.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WireOffense {
    pub first: Option<Value>,
    pub second: Option<Value>,
    pub third: Option<Value>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WireLinescoreTeams {
    pub home: WireRuns,
    pub away: WireRuns,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WireRuns {
    pub runs: u32,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WireSeriesStatus {
    pub description: String,
}

// ---------------------------------------------------------------------------
// Standings  (/standings)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct StandingsResponse {
    pub records: Vec<WireDivisionRecord>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireDivisionRecord {
    pub division: WireDivision,
    /// Raw for the same skip-one reason as schedule games.
    pub team_records: Vec<Value>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireDivision {
    pub name: String,
    pub name_short: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireTeamRecord {
    pub team: WireTeam,
    pub wins: u32,
    pub losses: u32,
    pub winning_percentage: String,
    pub games_back: String,
    pub streak: WireStreak,
    pub records: WireSplitRecords,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireStreak {
    pub streak_code: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireSplitRecords {
    pub split_records: Vec<WireSplitRecord>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WireSplitRecord {
    pub wins: u32,
    pub losses: u32,
    #[serde(rename = "type")]
    pub record_type: String, // "home", "away", "lastTen", ...
}

// ---------------------------------------------------------------------------
// Live feed  (/game/{id}/feed/live)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct LiveFeedResponse {
    pub game_data: WireGameData,
    pub live_data: Option<WireLiveData>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireGameData {
    pub status: WireStatus,
    pub teams: WireGameDataTeams,
    pub datetime: WireDateTime,
    pub probable_pitchers: WireProbablePitchers,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WireGameDataTeams {
    pub home: WireTeam,
    pub away: WireTeam,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireDateTime {
    pub date_time: String,
    pub official_date: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WireProbablePitchers {
    pub home: Option<WirePerson>,
    pub away: Option<WirePerson>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WireLiveData {
    pub linescore: WireLinescore,
    pub plays: WirePlays,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WirePlays {
    pub current_play: Option<WireCurrentPlay>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct WireCurrentPlay {
    pub play_events: Vec<WirePlayEvent>,
    pub matchup: WirePlayMatchup,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WirePlayEvent {
    pub details: WirePlayDetails,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WirePlayDetails {
    pub description: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WirePlayMatchup {
    pub pitcher: Option<WirePerson>,
    pub batter: Option<WirePerson>,
}
