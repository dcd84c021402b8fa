use tokio::task::JoinSet;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::model::{GameImage, NewsComment, NewsItem};
use crate::projection::{group_sessions, join_day, DayKey};
use crate::rest::{comments, images, plays, Service};

/// Build the news feed: recent sessions grouped by game and day, each with
/// that day's photos and comments.
///
/// Per-item reads run concurrently. A failing item keeps empty photos and
/// comments; it never fails the feed or cancels the other items.
#[instrument(skip(service))]
pub(crate) async fn get_news(service: &Service) -> Result<Vec<NewsItem>> {
    let sessions = plays::recent_sessions(service, service.config.news_window).await?;
    let mut items = group_sessions(sessions, service.config.news_max_items);

    let mut tasks = JoinSet::new();
    for (index, item) in items.iter().enumerate() {
        let service = service.clone();
        let game_id = item.game_id.clone();
        let day = item.day;
        tasks.spawn(async move { (index, fetch_day(&service, &game_id, day).await) });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, fetched)) => apply_day(&mut items, index, fetched),
            Err(e) => warn!(error = %e, "news item task failed"),
        }
    }

    debug!(count = items.len(), "built news feed");
    Ok(items)
}

/// Join one item's fetched day into the feed. A failed fetch leaves the item
/// with empty photos and comments.
fn apply_day(items: &mut [NewsItem], index: usize, fetched: Result<DayContent>) {
    let Some(item) = items.get_mut(index) else {
        return;
    };
    match fetched {
        Ok((images, comments)) => join_day(item, images, comments),
        Err(e) => {
            warn!(game_id = %item.game_id, day = %item.day, error = %e, "news item degraded");
        }
    }
}

type DayContent = (Vec<GameImage>, Vec<NewsComment>);

async fn fetch_day(
    service: &Service,
    game_id: &str,
    day: DayKey,
) -> Result<DayContent> {
    let range = day.range()?;
    tokio::try_join!(
        images::images_for_range(service, game_id, &range),
        comments::news_comments_for_day(service, game_id, day),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LudothekError;
    use crate::model::{PlaySession, Timestamp};

    fn session(id: i64, game_id: &str, played_at: &str) -> PlaySession {
        PlaySession {
            id,
            game_id: game_id.into(),
            played_at: Timestamp::new(played_at),
            location: None,
            notes: None,
            play_results: Vec::new(),
            game: None,
        }
    }

    fn image(id: i64, game_id: &str, created_at: &str) -> GameImage {
        GameImage {
            id,
            game_id: game_id.into(),
            storage_path: format!("{game_id}/{id}.jpg"),
            caption: None,
            is_cover: false,
            created_at: Timestamp::new(created_at),
        }
    }

    fn comment(game_id: &str, news_date: &str, body: &str) -> NewsComment {
        NewsComment {
            id: None,
            game_id: Some(game_id.into()),
            news_date: Some(news_date.into()),
            body: body.into(),
            created_at: Timestamp::new(format!("{news_date}T20:00:00Z")),
            created_by: None,
        }
    }

    #[test]
    fn test_failed_item_degrades_without_affecting_others() {
        let sessions = vec![
            session(1, "azul", "2024-03-02"),
            session(2, "catan", "2024-03-02"),
            session(3, "azul", "2024-03-01"),
        ];
        let mut items = group_sessions(sessions, 10);
        assert_eq!(items.len(), 3);

        apply_day(
            &mut items,
            2,
            Ok((
                vec![image(7, "azul", "2024-03-01T19:00:00Z")],
                vec![comment("azul", "2024-03-01", "Knapp!")],
            )),
        );
        apply_day(&mut items, 1, Err(LudothekError::NotFound { what: "game" }));
        apply_day(
            &mut items,
            0,
            Ok((
                vec![image(9, "azul", "2024-03-02T12:00:00Z")],
                vec![comment("azul", "2024-03-02", "Revanche!")],
            )),
        );

        assert_eq!(items[0].images.iter().map(|i| i.id).collect::<Vec<_>>(), vec![9]);
        assert_eq!(items[0].comments.len(), 1);
        assert!(items[1].images.is_empty());
        assert!(items[1].comments.is_empty());
        assert_eq!(items[2].images.iter().map(|i| i.id).collect::<Vec<_>>(), vec![7]);
        assert_eq!(items[2].comments[0].body, "Knapp!");
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let mut items = group_sessions(vec![session(1, "azul", "2024-03-02")], 10);
        apply_day(&mut items, 5, Ok((Vec::new(), Vec::new())));
        assert!(items[0].images.is_empty());
    }
}
