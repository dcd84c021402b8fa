use chrono::{DateTime, Utc};
use itertools::Itertools;
use tracing::warn;

use crate::model::{Comment, GameImage, NewsComment, NewsItem, Timestamp};
use crate::projection::day::{DayKey, DayRange};

/// Records carrying a creation timestamp.
pub trait Timestamped {
    fn timestamp(&self) -> &Timestamp;
}

impl Timestamped for GameImage {
    fn timestamp(&self) -> &Timestamp {
        &self.created_at
    }
}

impl Timestamped for Comment {
    fn timestamp(&self) -> &Timestamp {
        &self.created_at
    }
}

impl Timestamped for NewsComment {
    fn timestamp(&self) -> &Timestamp {
        &self.created_at
    }
}

/// Records inside `range`, oldest first. Unparseable timestamps are dropped.
pub fn within_range<T: Timestamped>(range: &DayRange, records: Vec<T>) -> Vec<T> {
    sorted_ascending(records)
        .into_iter()
        .filter(|(instant, _)| range.contains(instant))
        .map(|(_, record)| record)
        .collect()
}

/// Records created on the day `raw_day`, oldest first. An invalid key yields
/// nothing.
pub fn within_day<T: Timestamped>(raw_day: &str, records: Vec<T>) -> Vec<T> {
    match DayKey::parse(raw_day).and_then(|day| day.range()) {
        Ok(range) => within_range(&range, records),
        Err(e) => {
            warn!(error = %e, "no records for invalid day");
            Vec::new()
        }
    }
}

/// Attach a day's images and comments to its news item.
///
/// Images are matched by upload time, comments by the news day they were
/// written for. If the item's day has no valid interval both stay empty.
pub fn join_day(item: &mut NewsItem, images: Vec<GameImage>, comments: Vec<NewsComment>) {
    let range = match item.day.range() {
        Ok(range) => range,
        Err(e) => {
            warn!(game_id = %item.game_id, error = %e, "news item without day range");
            item.images.clear();
            item.comments.clear();
            return;
        }
    };
    let day = item.day.to_string();

    item.images = within_range(
        &range,
        images
            .into_iter()
            .filter(|image| image.game_id.is_empty() || image.game_id == item.game_id)
            .collect(),
    );
    item.comments = sorted_ascending(
        comments
            .into_iter()
            .filter(|c| c.news_date.as_deref().map(str::trim) == Some(day.as_str()))
            .collect(),
    )
    .into_iter()
    .map(|(_, comment)| comment)
    .collect();
}

fn sorted_ascending<T: Timestamped>(records: Vec<T>) -> Vec<(DateTime<Utc>, T)> {
    records
        .into_iter()
        .filter_map(|record| match record.timestamp().parse() {
            Ok(instant) => Some((instant, record)),
            Err(e) => {
                warn!(error = %e, "excluding record from day join");
                None
            }
        })
        .sorted_by_key(|(instant, _)| *instant)
        .collect()
}
