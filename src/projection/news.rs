use std::collections::HashMap;

use tracing::{debug, warn};

use crate::model::{GameId, NewsItem, PlayResult, PlaySession};
use crate::projection::day::{self, DayKey};

/// Title shown when a session arrives without its parent game.
pub const FALLBACK_TITLE: &str = "Spiel";

/// Rank used for results without a position.
pub const MISSING_POSITION: i32 = i32::MAX;

/// Sort results by position, unranked rows last. Ties keep input order.
pub fn sort_results(results: &mut [PlayResult]) {
    results.sort_by_key(|r| r.position.unwrap_or(MISSING_POSITION));
}

/// Group sessions into news items keyed by (game, day).
///
/// Groups appear in first-seen order and sessions keep their input order.
/// Truncation to `max_items` happens after grouping so one day's sessions
/// are never split. Sessions with an unparseable date are dropped.
pub fn group_sessions(sessions: Vec<PlaySession>, max_items: usize) -> Vec<NewsItem> {
    let total = sessions.len();
    let mut items: Vec<NewsItem> = Vec::new();
    let mut index: HashMap<(GameId, DayKey), usize> = HashMap::new();

    for mut session in sessions {
        let day = match day::day_key(session.played_at.as_str()) {
            Ok(day) => day,
            Err(e) => {
                warn!(play_id = session.id, error = %e, "excluding session from news");
                continue;
            }
        };
        sort_results(&mut session.play_results);

        let key = (session.game_id.clone(), day);
        let slot = *index.entry(key).or_insert_with(|| {
            items.push(NewsItem {
                game_id: session.game_id.clone(),
                title: session
                    .game
                    .as_ref()
                    .and_then(|g| g.title.clone())
                    .unwrap_or_else(|| FALLBACK_TITLE.to_string()),
                day,
                sessions: Vec::new(),
                images: Vec::new(),
                comments: Vec::new(),
            });
            items.len() - 1
        });
        items[slot].sessions.push(session);
    }

    let groups = items.len();
    items.truncate(max_items);
    debug!(sessions = total, groups, kept = items.len(), "grouped news");
    items
}
