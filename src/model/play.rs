use serde::{Deserialize, Serialize};

use crate::model::common::{null_as_default, GameId, PlayId, Timestamp};
use crate::model::GameTitle;
use crate::projection::DayKey;

/// One recorded play session of a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaySession {
    pub id: PlayId,
    pub game_id: GameId,
    /// Date (or timestamp) the session took place.
    pub played_at: Timestamp,
    pub location: Option<String>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub play_results: Vec<PlayResult>,
    /// Parent game, present when the query embeds `games(title)`.
    #[serde(default, rename = "games", skip_serializing_if = "Option::is_none")]
    pub game: Option<GameTitle>,
}

/// A single player's outcome in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayResult {
    pub player_name: String,
    pub score: Option<f64>,
    /// Rank in the session, 1 being the winner. Not guaranteed unique.
    pub position: Option<i32>,
}

/// A new session as entered on the "add play" form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayInput {
    pub played_at: DayKey,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub results: Vec<PlayResultInput>,
}

/// One row of the results table on the "add play" form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayResultInput {
    pub player_name: String,
    pub score: Option<f64>,
    pub position: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_news_row() {
        let json = r#"{
            "id": 17,
            "game_id": "g1",
            "played_at": "2024-03-01",
            "location": "Vereinsheim",
            "notes": null,
            "play_results": [
                {"player_name": "Anna", "score": 42, "position": 1},
                {"player_name": "Ben", "score": null, "position": null}
            ],
            "games": {"title": "Azul"}
        }"#;
        let session: PlaySession = serde_json::from_str(json).unwrap();
        assert_eq!(session.play_results.len(), 2);
        assert_eq!(session.play_results[0].score, Some(42.0));
        assert_eq!(session.play_results[1].position, None);
        assert_eq!(
            session.game.and_then(|g| g.title).as_deref(),
            Some("Azul")
        );
    }

    #[test]
    fn test_null_results_become_empty() {
        let json = r#"{"id": 3, "game_id": "g1", "played_at": "2024-03-01", "play_results": null}"#;
        let session: PlaySession = serde_json::from_str(json).unwrap();
        assert!(session.play_results.is_empty());
        assert!(session.game.is_none());
    }
}
