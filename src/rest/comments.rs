use serde::Serialize;
use tracing::instrument;

use crate::error::{LudothekError, Result};
use crate::model::{Comment, NewsComment};
use crate::projection::DayKey;
use crate::rest::query::Query;
use crate::rest::{auth, Service};

/// Comments on a game, newest first.
#[instrument(skip(service))]
pub(crate) async fn comments_for_game(service: &Service, game_id: &str) -> Result<Vec<Comment>> {
    let query = Query::select("id, game_id, body, created_at, created_by")
        .eq("game_id", game_id)
        .order("created_at", false, None);
    service.select("comments", &query).await
}

/// Comments on one news item, oldest first.
pub(crate) async fn news_comments_for_day(
    service: &Service,
    game_id: &str,
    day: DayKey,
) -> Result<Vec<NewsComment>> {
    let query = Query::select("id, game_id, news_date, body, created_at, created_by")
        .eq("game_id", game_id)
        .eq("news_date", day)
        .order("created_at", true, None);
    service.select("news_comments", &query).await
}

/// Trimmed comment body; blank bodies are rejected.
pub(crate) fn normalize_body(body: &str) -> Result<&str> {
    let body = body.trim();
    if body.is_empty() {
        return Err(LudothekError::Validation("comment must not be empty".into()));
    }
    Ok(body)
}

#[derive(Serialize)]
struct NewComment<'a> {
    game_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    news_date: Option<DayKey>,
    body: &'a str,
    created_by: &'a str,
}

#[instrument(skip(service, body))]
pub(crate) async fn add_comment(service: &Service, game_id: &str, body: &str) -> Result<()> {
    let body = normalize_body(body)?;
    let user = auth::current_user(service).await?;
    let row = NewComment {
        game_id,
        news_date: None,
        body,
        created_by: &user.id,
    };
    let _: Vec<Comment> = service.insert("comments", &row).await?;
    Ok(())
}

#[instrument(skip(service, body))]
pub(crate) async fn add_news_comment(
    service: &Service,
    game_id: &str,
    news_date: &str,
    body: &str,
) -> Result<()> {
    let day = DayKey::parse(news_date)?;
    let body = normalize_body(body)?;
    let user = auth::current_user(service).await?;
    let row = NewComment {
        game_id,
        news_date: Some(day),
        body,
        created_by: &user.id,
    };
    let _: Vec<NewsComment> = service.insert("news_comments", &row).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_body() {
        assert_eq!(normalize_body("  Tolle Runde!\n").unwrap(), "Tolle Runde!");
        assert!(matches!(
            normalize_body(" \t "),
            Err(LudothekError::Validation(_))
        ));
    }

    #[test]
    fn test_news_comment_payload() {
        let row = NewComment {
            game_id: "g1",
            news_date: Some(DayKey::parse("2024-03-01").unwrap()),
            body: "Revanche!",
            created_by: "user-1",
        };
        let body = serde_json::to_value(&row).unwrap();
        assert_eq!(body["news_date"], "2024-03-01");

        let row = NewComment {
            news_date: None,
            ..row
        };
        let body = serde_json::to_value(&row).unwrap();
        assert!(body.get("news_date").is_none());
    }
}
