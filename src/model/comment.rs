use serde::{Deserialize, Serialize};

use crate::model::common::{GameId, Timestamp};

/// A free-text comment on a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Option<i64>,
    pub game_id: Option<GameId>,
    pub body: String,
    pub created_at: Timestamp,
    pub created_by: Option<String>,
}

/// A comment on one news item, addressed by game and news day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsComment {
    pub id: Option<i64>,
    pub game_id: Option<GameId>,
    /// Day key of the news item the comment belongs to.
    pub news_date: Option<String>,
    pub body: String,
    pub created_at: Timestamp,
    pub created_by: Option<String>,
}
