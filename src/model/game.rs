use serde::{Deserialize, Serialize};

use crate::error::{LudothekError, Result};
use crate::model::common::{lenient_from_str, GameId, Timestamp};
use crate::model::{Comment, PlaySession};
use crate::projection::Gallery;

/// Shelf status of a game.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GameStatus {
    #[default]
    Active,
    Archived,
}

/// A game in the collection.
///
/// Only `id` and `title` are always selected; every other column is absent
/// from narrower queries such as the catalog listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub title: String,
    pub alt_title: Option<String>,
    pub min_players: Option<i32>,
    pub max_players: Option<i32>,
    pub play_minutes: Option<i32>,
    /// Free-text name of the member the copy belongs to.
    pub owner: Option<String>,
    /// Auth identity of the member who created the record.
    pub created_by: Option<String>,
    pub bgg_url: Option<String>,
    pub bgg_rating: Option<f64>,
    pub award: Option<String>,
    pub manual_url: Option<String>,
    pub more_info: Option<String>,
    pub notes: Option<String>,
    pub weight: Option<f64>,
    pub is_coop: Option<bool>,
    #[serde(default, deserialize_with = "lenient_from_str")]
    pub status: GameStatus,
    pub loaned_to: Option<String>,
    pub created_at: Option<Timestamp>,
}

/// Parent game title embedded in a session row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTitle {
    pub title: Option<String>,
}

/// Editable game metadata, used for both create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameInput {
    pub title: String,
    pub alt_title: Option<String>,
    pub bgg_url: Option<String>,
    pub bgg_rating: Option<f64>,
    pub owner: Option<String>,
    pub loaned_to: Option<String>,
    pub award: Option<String>,
    pub manual_url: Option<String>,
    pub more_info: Option<String>,
    pub notes: Option<String>,
    pub min_players: Option<i32>,
    pub max_players: Option<i32>,
    pub play_minutes: Option<i32>,
    pub weight: Option<f64>,
    pub is_coop: bool,
    pub status: GameStatus,
}

impl GameInput {
    /// Trim text fields, turn blank ones into `None`, then check the
    /// constraints a form would enforce.
    pub fn normalized(self) -> Result<Self> {
        let input = Self {
            title: self.title.trim().to_string(),
            alt_title: blank_to_none(self.alt_title),
            bgg_url: blank_to_none(self.bgg_url),
            owner: blank_to_none(self.owner),
            loaned_to: blank_to_none(self.loaned_to),
            award: blank_to_none(self.award),
            manual_url: blank_to_none(self.manual_url),
            more_info: blank_to_none(self.more_info),
            notes: blank_to_none(self.notes),
            ..self
        };

        if input.title.is_empty() {
            return Err(LudothekError::Validation("title must not be empty".into()));
        }
        if let (Some(min), Some(max)) = (input.min_players, input.max_players) {
            if min > max {
                return Err(LudothekError::Validation(format!(
                    "min_players ({min}) is greater than max_players ({max})"
                )));
            }
        }
        if let Some(weight) = input.weight {
            if !(1.0..=5.0).contains(&weight) {
                return Err(LudothekError::Validation(format!(
                    "weight {weight} is outside 1.0..=5.0"
                )));
            }
        }
        Ok(input)
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Everything shown on a game's detail page.
#[derive(Debug, Clone, Serialize)]
pub struct GameDetail {
    pub game: Game,
    pub cover_url: String,
    pub gallery: Gallery,
    pub plays: Vec<PlaySession>,
    pub comments: Vec<Comment>,
}
