use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{LudothekError, Result};
use crate::model::{PlayId, PlayInput, PlayResultInput, PlaySession};
use crate::projection::{sort_results, DayKey};
use crate::rest::query::{Nulls, Query};
use crate::rest::{auth, Service};

const SESSION_COLUMNS: &str =
    "id, game_id, played_at, location, notes, play_results(player_name, score, position)";

/// The most recent sessions across all games, with their game's title.
#[instrument(skip(service))]
pub(crate) async fn recent_sessions(service: &Service, limit: usize) -> Result<Vec<PlaySession>> {
    let query = Query::select(&format!("{SESSION_COLUMNS}, games(title)"))
        .order("played_at", false, None)
        .order("id", false, None)
        .limit(limit);
    service.select("plays", &query).await
}

/// All sessions of one game, newest first, results ranked.
#[instrument(skip(service))]
pub(crate) async fn sessions_for_game(
    service: &Service,
    game_id: &str,
) -> Result<Vec<PlaySession>> {
    let query = Query::select(SESSION_COLUMNS)
        .eq("game_id", game_id)
        .order("played_at", false, Some(Nulls::Last))
        .order("id", false, None);
    let mut sessions: Vec<PlaySession> = service.select("plays", &query).await?;
    for session in &mut sessions {
        sort_results(&mut session.play_results);
    }
    Ok(sessions)
}

/// Drop rows without a player name and number the rest: a missing position
/// becomes the row's 1-based index among the kept rows.
pub(crate) fn normalize_results(rows: Vec<PlayResultInput>) -> Vec<PlayResultInput> {
    rows.into_iter()
        .map(|row| PlayResultInput {
            player_name: row.player_name.trim().to_string(),
            ..row
        })
        .filter(|row| !row.player_name.is_empty())
        .enumerate()
        .map(|(i, row)| PlayResultInput {
            position: row.position.or(Some(i as i32 + 1)),
            ..row
        })
        .collect()
}

#[derive(Serialize)]
struct NewPlay<'a> {
    game_id: &'a str,
    played_at: DayKey,
    location: Option<&'a str>,
    notes: Option<&'a str>,
    created_by: &'a str,
}

#[derive(Serialize)]
struct NewResult {
    play_id: PlayId,
    #[serde(flatten)]
    result: PlayResultInput,
}

#[derive(Deserialize)]
struct Inserted {
    id: PlayId,
}

/// Record a session and its results.
#[instrument(skip(service, input), fields(played_at = %input.played_at))]
pub(crate) async fn add_play(service: &Service, game_id: &str, input: PlayInput) -> Result<PlayId> {
    let user = auth::current_user(service).await?;

    let play = NewPlay {
        game_id,
        played_at: input.played_at,
        location: non_blank(input.location.as_deref()),
        notes: non_blank(input.notes.as_deref()),
        created_by: &user.id,
    };
    let rows: Vec<Inserted> = service.insert("plays", &play).await?;
    let play_id = rows
        .into_iter()
        .next()
        .map(|row| row.id)
        .ok_or(LudothekError::NotFound { what: "inserted play" })?;

    let results = normalize_results(input.results)
        .into_iter()
        .map(|result| NewResult { play_id, result })
        .collect::<Vec<_>>();
    if !results.is_empty() {
        let _: Vec<serde::de::IgnoredAny> = service.insert("play_results", &results).await?;
    }

    debug!(play_id, results = results.len(), "recorded play");
    Ok(play_id)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, position: Option<i32>) -> PlayResultInput {
        PlayResultInput {
            player_name: name.into(),
            score: None,
            position,
        }
    }

    #[test]
    fn test_normalize_results() {
        let rows = vec![
            row(" Anna ", None),
            row("   ", Some(1)),
            row("Ben", Some(1)),
            row("Cleo", None),
        ];
        let normalized = normalize_results(rows);
        assert_eq!(
            normalized,
            vec![row("Anna", Some(1)), row("Ben", Some(1)), row("Cleo", Some(3))]
        );
    }

    #[test]
    fn test_result_payload_is_flat() {
        let body = serde_json::to_value(NewResult {
            play_id: 4,
            result: PlayResultInput {
                player_name: "Anna".into(),
                score: Some(31.0),
                position: Some(1),
            },
        })
        .unwrap();
        assert_eq!(body["play_id"], 4);
        assert_eq!(body["player_name"], "Anna");
        assert_eq!(body["position"], 1);
    }
}
