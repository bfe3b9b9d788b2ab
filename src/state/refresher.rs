use crate::state::app_settings::Settings;
use crate::state::app_state::Snapshot;
use crate::state::ticker::{TickerQuote, fetch_quote};
use log::{info, warn};
use mlb_api::GameRecord;
use mlb_api::client::StatsClient;
use mlb_api::clock::Clock;
use mlb_api::fetch::Fetch;

/// One data pull: games, the favorite team's game, standings and schedule.
///
/// Fails with the client's last error message if any of those requests failed,
/// in which case nothing from the pull should be used.
pub async fn pull<F: Fetch, C: Clock>(
    client: &mut StatsClient<F, C>,
    settings: &Settings,
) -> Result<Snapshot, String> {
    client.take_last_error();

    let date = settings
        .date
        .clone()
        .unwrap_or_else(|| client.get_current_date_string());
    let team = settings.favorite_team.as_str();

    let games = client.get_games(&date).await;
    let favorite_game = client.get_team_game(team, &date).await;
    let standings = client.get_standings().await;
    let schedule = client.get_team_schedule(team, settings.schedule_limit).await;

    if let Some(reason) = client.take_last_error() {
        return Err(reason);
    }

    let favorite_game = match favorite_game {
        Some(game) if game.is_live() => Some(with_live_detail(client, game).await),
        other => other,
    };

    info!(
        "pulled {} games for {date}, {} divisions, {} upcoming {team} games",
        games.len(),
        standings.as_ref().map_or(0, |s| s.divisions.len()),
        schedule.as_ref().map_or(0, Vec::len),
    );

    Ok(Snapshot {
        date,
        games,
        favorite_game,
        standings: standings.unwrap_or_default(),
        schedule: schedule.unwrap_or_default(),
        ticker: None,
    })
}

/// Overlay the live feed onto a schedule record. Missing detail is not a failed pull.
async fn with_live_detail<F: Fetch, C: Clock>(client: &mut StatsClient<F, C>, game: GameRecord) -> GameRecord {
    let detail = client.get_game_detail(game.game_id).await;
    if let Some(reason) = client.take_last_error() {
        warn!("live detail for game {} unavailable: {reason}", game.game_id);
    }
    match detail {
        Some(detail) => GameRecord {
            home_score: detail.home_score,
            away_score: detail.away_score,
            live: detail.live,
            home_pitcher: detail.home_pitcher,
            away_pitcher: detail.away_pitcher,
            last_play: detail.last_play,
            batter: detail.batter,
            ..game
        },
        None => game,
    }
}

/// A fresh quote, or the previous one if fetching failed.
pub async fn refresh_quote<F: Fetch, C: Clock>(
    client: &StatsClient<F, C>,
    settings: &Settings,
    previous: Option<TickerQuote>,
) -> Option<TickerQuote> {
    let ticker = settings.ticker.as_ref()?;
    match fetch_quote(client.fetcher(), ticker).await {
        Ok(quote) => Some(quote),
        Err(e) => {
            warn!("{} quote failed, keeping previous: {e:#}", ticker.label);
            previous
        }
    }
}
