use serde::Serialize;

use crate::model::common::GameId;
use crate::model::{GameImage, NewsComment, PlaySession};
use crate::projection::DayKey;

/// All sessions of one game on one day, with that day's photos and comments.
#[derive(Debug, Clone, Serialize)]
pub struct NewsItem {
    pub game_id: GameId,
    pub title: String,
    pub day: DayKey,
    pub sessions: Vec<PlaySession>,
    pub images: Vec<GameImage>,
    pub comments: Vec<NewsComment>,
}
