//! Stats API payload builders shared by the tests of this crate and its users.

use crate::teams;
use serde_json::{Value, json};

/// A schedule game as the API sends it; team ids come from the team table.
pub fn wire_game(pk: u64, home: &str, away: &str, home_score: u32, away_score: u32, state: &str) -> Value {
    json!({
        "gamePk": pk,
        "officialDate": "2024-04-01",
        "gameDate": "2024-04-01T23:20:00Z",
        "status": { "abstractGameState": state, "detailedState": state },
        "teams": {
            "home": { "team": { "id": teams::team_id(home).unwrap_or(0), "abbreviation": home }, "score": home_score },
            "away": { "team": { "id": teams::team_id(away).unwrap_or(0), "abbreviation": away }, "score": away_score }
        }
    })
}

/// A one-day schedule response for 2024-04-01.
pub fn schedule(games: Vec<Value>) -> Value {
    json!({ "dates": [ { "date": "2024-04-01", "games": games } ] })
}
